//! Batch execution of checks over one session

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use hw_core::traits::ExecutionSession;
use hw_core::CheckResult;

use crate::registry::CheckKind;

/// Run the named checks in order and collect their results by name
///
/// Names that are not registered checks are skipped. A check whose command
/// could not be executed is recorded with status `error` and the transport
/// message; the remaining checks still run.
pub async fn run_checks(
    session: &mut dyn ExecutionSession,
    names: &[String],
) -> BTreeMap<String, CheckResult> {
    let mut results = BTreeMap::new();

    for name in names {
        let Some(check) = CheckKind::from_name(name) else {
            tracing::debug!("Skipping unknown check '{}'", name);
            continue;
        };

        tracing::debug!("Running check {}", check);
        let raw = session.run(check.command(), check.timeout()).await;

        let result = match &raw.error {
            Some(err) => {
                tracing::debug!("Check {} failed to execute: {}", check, err);
                CheckResult::error(err.clone())
            }
            None => guard_parse(check.name(), || check.parse(&raw)).with_success(raw.success),
        };
        results.insert(name.clone(), result);
    }

    results
}

/// Run a parser, converting a panic into an `error` result
pub fn guard_parse<F>(name: &str, parse: F) -> CheckResult
where
    F: FnOnce() -> CheckResult,
{
    match panic::catch_unwind(AssertUnwindSafe(parse)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!("Parser for {} panicked: {}", name, message);
            CheckResult::error(format!("Parser fault: {}", message))
        }
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSession;
    use hw_core::CheckStatus;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_runs_known_checks_in_order() {
        let mut session = FakeSession::new()
            .respond("ufw status", "Status: active\n")
            .respond("df -h", "/dev/sda1 50G 48G 2G 96% /\n");

        let results = run_checks(&mut session, &names(&["firewall", "disk_usage"])).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results["firewall"].status, CheckStatus::Pass);
        assert_eq!(results["disk_usage"].status, CheckStatus::Fail);
        assert!(results["firewall"].success);
        assert!(session.commands[0].starts_with("ufw status"));
        assert!(session.commands[1].starts_with("df -h"));
    }

    #[tokio::test]
    async fn test_unknown_names_are_skipped() {
        let mut session = FakeSession::new();
        let results = run_checks(&mut session, &names(&["bogus", "firewall", "nmap"])).await;

        assert_eq!(results.len(), 1);
        assert!(results.contains_key("firewall"));
        assert_eq!(session.commands.len(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_is_isolated() {
        let mut session = FakeSession::new()
            .fail("sshd -T", "Command timed out after 10s")
            .respond("ufw status", "Status: active\n");

        let results = run_checks(&mut session, &names(&["ssh_config", "firewall"])).await;

        let failed = &results["ssh_config"];
        assert_eq!(failed.status, CheckStatus::Error);
        assert_eq!(failed.message, "Command timed out after 10s");
        assert!(!failed.success);
        assert_eq!(results["firewall"].status, CheckStatus::Pass);
    }

    #[tokio::test]
    async fn test_success_mirrors_exit_status() {
        struct NonZero;

        #[async_trait::async_trait]
        impl ExecutionSession for NonZero {
            async fn connect(&mut self) -> Result<(), hw_core::ConnectError> {
                Ok(())
            }
            async fn run(
                &mut self,
                _command: &str,
                _timeout: std::time::Duration,
            ) -> hw_core::RawExecutionResult {
                hw_core::RawExecutionResult::completed("", "", 1)
            }
            async fn close(&mut self) {}
        }

        let results = run_checks(&mut NonZero, &names(&["disk_usage"])).await;
        assert_eq!(results["disk_usage"].status, CheckStatus::Pass);
        assert!(!results["disk_usage"].success);
    }

    #[test]
    fn test_guard_parse_converts_panic() {
        let result = guard_parse("custom", || panic!("index out of range"));
        assert_eq!(result.status, CheckStatus::Error);
        assert!(result.message.contains("index out of range"));

        let ok = guard_parse("custom", || CheckResult::new(CheckStatus::Info, "fine"));
        assert_eq!(ok.status, CheckStatus::Info);
    }
}
