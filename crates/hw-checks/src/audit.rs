//! Extended host audit (Lynis)

use std::time::Duration;

use hw_core::traits::ExecutionSession;
use hw_core::{CheckResult, CheckStatus, RawExecutionResult};
use serde_json::Value;

use crate::dispatch::guard_parse;

/// Name under which the extended audit is selected and reported
pub const EXTENDED_AUDIT_NAME: &str = "lynis";

const LYNIS_COMMAND: &str = "lynis audit system --quick 2>/dev/null || lynis audit system 2>/dev/null || echo 'LYNIS_NOT_INSTALLED'";
const LYNIS_TIMEOUT: Duration = Duration::from_secs(300);

const MAX_ENTRIES: usize = 10;
const MAX_ENTRY_CHARS: usize = 200;
const PREVIEW_CHARS: usize = 1500;

/// Run the extended audit on a connected session
pub async fn run_extended_audit(session: &mut dyn ExecutionSession) -> CheckResult {
    tracing::debug!("Running extended audit");
    let raw = session.run(LYNIS_COMMAND, LYNIS_TIMEOUT).await;
    guard_parse(EXTENDED_AUDIT_NAME, || parse_lynis(&raw))
}

/// Strip a case-insensitive `[tag]` marker from a report line
fn strip_tag(line: &str, tag: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with `line`
    let start = line.to_ascii_lowercase().find(tag)?;
    let mut text = String::with_capacity(line.len());
    text.push_str(&line[..start]);
    text.push_str(&line[start + tag.len()..]);
    Some(text.trim().chars().take(MAX_ENTRY_CHARS).collect())
}

/// Interpret `lynis audit system` output
pub fn parse_lynis(raw: &RawExecutionResult) -> CheckResult {
    if let Some(err) = &raw.error {
        return CheckResult::error(err.clone());
    }

    let out = raw.stdout.as_str();
    if out.contains("LYNIS_NOT_INSTALLED") || out.trim().is_empty() {
        return CheckResult::new(CheckStatus::NotApplicable, "Lynis not installed on server")
            .with_success(raw.success);
    }

    let mut hardening_index = None;
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    for line in out.lines().map(str::trim) {
        if line.contains("hardening_index=") {
            if let Some(value) = line.rsplit('=').next() {
                if let Ok(index) = value.trim().parse::<i64>() {
                    hardening_index = Some(index);
                }
            }
        } else if let Some(warning) = strip_tag(line, "[warning]") {
            warnings.push(warning);
        } else if let Some(suggestion) = strip_tag(line, "[suggestion]") {
            suggestions.push(suggestion);
        }
    }
    warnings.truncate(MAX_ENTRIES);
    suggestions.truncate(MAX_ENTRIES);

    let message = match hardening_index {
        Some(index) => format!("Hardening index {}", index),
        None => "Lynis audit completed".to_string(),
    };

    CheckResult::new(CheckStatus::Info, message)
        .with_findings(warnings)
        .with_fixes(suggestions)
        .with_detail("hardeningIndex", hardening_index.map_or(Value::Null, Value::from))
        .with_raw_preview(out, PREVIEW_CHARS)
        .with_success(raw.success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSession;

    #[test]
    fn test_parse_lynis_report() {
        let out = "\
            [+] Boot and services\n\
            hardening_index=67\n\
            [WARNING] Found one or more vulnerable packages [PKGS-7392]\n\
            [suggestion] Install a PAM module for password strength testing\n\
            [Suggestion] Harden compilers like restricting access to root user only\n";
        let raw = RawExecutionResult::completed(out, "", 0);
        let result = parse_lynis(&raw);

        assert_eq!(result.status, CheckStatus::Info);
        assert_eq!(result.details["hardeningIndex"], 67);
        assert_eq!(
            result.findings,
            vec!["Found one or more vulnerable packages [PKGS-7392]"]
        );
        assert_eq!(result.fixes.len(), 2);
        assert!(result.success);
    }

    #[test]
    fn test_parse_lynis_caps_entries() {
        let out: String = (0..25)
            .map(|i| format!("[warning] issue {} {}\n", i, "x".repeat(300)))
            .collect();
        let result = parse_lynis(&RawExecutionResult::completed(out.clone(), "", 0));

        assert_eq!(result.findings.len(), 10);
        assert!(result.findings.iter().all(|f| f.chars().count() <= 200));
        assert_eq!(result.raw_preview.chars().count(), 1500);
        assert!(result.details["hardeningIndex"].is_null());
    }

    #[test]
    fn test_parse_lynis_not_installed() {
        let raw = RawExecutionResult::completed("LYNIS_NOT_INSTALLED\n", "", 0);
        assert_eq!(parse_lynis(&raw).status, CheckStatus::NotApplicable);

        let empty = RawExecutionResult::completed("", "", 0);
        assert_eq!(parse_lynis(&empty).status, CheckStatus::NotApplicable);
    }

    #[test]
    fn test_parse_lynis_transport_error() {
        let raw = RawExecutionResult::failed("Command timed out after 300s");
        let result = parse_lynis(&raw);
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.message, "Command timed out after 300s");
    }

    #[tokio::test]
    async fn test_run_extended_audit_uses_session() {
        let mut session = FakeSession::new().respond("lynis", "hardening_index=80\n");
        let result = run_extended_audit(&mut session).await;

        assert_eq!(result.details["hardeningIndex"], 80);
        assert_eq!(session.commands.len(), 1);
        assert!(session.commands[0].starts_with("lynis audit system --quick"));
    }
}
