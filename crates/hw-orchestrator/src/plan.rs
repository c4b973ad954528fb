//! Scan plan derivation
//!
//! Turns a submission (targets plus options) into the concrete work of a
//! job: which host checks run on each target, whether the extended audit
//! runs, which network tools run, and the inputs those tools receive.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use hw_checks::{CheckKind, EXTENDED_AUDIT_NAME};
use hw_core::api::ScanOptions;
use hw_core::traits::{is_safe_operand, ToolInputs};
use hw_core::{Target, ToolKind};

/// The work of one job
#[derive(Debug, Clone)]
pub struct ScanPlan {
    /// Host check names, in caller order; unknown names are skipped at dispatch
    pub checks: Vec<String>,
    /// Run the extended audit on every reachable target
    pub extended_audit: bool,
    /// Network tools, in dispatch order
    pub tools: Vec<ToolKind>,
    /// Inputs shared by the network tools
    pub inputs: ToolInputs,
}

impl ScanPlan {
    /// Derive the plan for `targets`
    ///
    /// `targets` must already be filtered to complete ones. Explicit mode
    /// (auto off and a non-empty test list) takes the test list verbatim
    /// with whatever URLs and subnet the caller gave. Otherwise every check,
    /// the extended audit and every tool are selected, and URLs and subnet
    /// are derived from the targets unless the caller supplied them.
    pub fn derive(targets: &[Target], options: &ScanOptions) -> Self {
        let explicit = options
            .tests
            .as_ref()
            .filter(|tests| !options.auto_mode && !tests.is_empty());

        let caller_urls = options
            .urls
            .as_ref()
            .map(|urls| {
                urls.iter()
                    .map(|u| u.trim())
                    .filter(|u| is_safe_operand(u))
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|urls| !urls.is_empty());
        let caller_subnet = options
            .subnet
            .as_deref()
            .map(str::trim)
            .filter(|s| is_safe_operand(s))
            .map(str::to_string);

        let (checks, extended_audit, tools, urls, subnet) = match explicit {
            Some(tests) => {
                let checks = tests
                    .iter()
                    .filter(|t| t.as_str() != EXTENDED_AUDIT_NAME && ToolKind::from_name(t).is_none())
                    .cloned()
                    .collect();
                let audit = tests.iter().any(|t| t == EXTENDED_AUDIT_NAME);
                let tools = ToolKind::ALL
                    .into_iter()
                    .filter(|tool| tests.iter().any(|t| t == tool.name()))
                    .collect();
                (
                    checks,
                    audit,
                    tools,
                    caller_urls.unwrap_or_default(),
                    caller_subnet,
                )
            }
            None => (
                CheckKind::names(),
                true,
                ToolKind::ALL.to_vec(),
                caller_urls.unwrap_or_else(|| derive_urls(targets)),
                caller_subnet.or_else(|| targets.first().and_then(|t| derive_subnet(&t.host))),
            ),
        };

        let inputs = ToolInputs {
            urls,
            hosts: distinct_hosts(targets),
            subnet,
            credentialed_targets: targets.to_vec(),
            openvas: options.tool_config.as_ref().and_then(|c| c.openvas.clone()),
        };

        Self {
            checks,
            extended_audit,
            tools,
            inputs,
        }
    }

    /// Whether any selected check is a registered one
    pub fn has_checks(&self) -> bool {
        self.checks.iter().any(|name| CheckKind::from_name(name).is_some())
    }

    /// Progress steps one target contributes: its check batch and its audit
    pub fn steps_per_target(&self) -> usize {
        usize::from(self.has_checks()) + usize::from(self.extended_audit)
    }

    /// Selected tools whose inputs are present
    pub fn runnable_tools(&self) -> impl Iterator<Item = ToolKind> + '_ {
        self.tools.iter().copied().filter(|tool| self.inputs.satisfies(*tool))
    }

    /// Total progress steps for `target_count` eligible targets, at least 1
    pub fn total_steps(&self, target_count: usize) -> usize {
        let steps = target_count * self.steps_per_target() + self.runnable_tools().count();
        steps.max(1)
    }
}

/// Hosts of `targets` usable as tool operands, trimmed, first occurrence wins
fn distinct_hosts(targets: &[Target]) -> Vec<String> {
    let mut seen = HashSet::new();
    targets
        .iter()
        .map(|t| t.host.trim())
        .filter(|h| is_safe_operand(h) && seen.insert(*h))
        .map(str::to_string)
        .collect()
}

/// `http://host` and `https://host` for each distinct target host
pub fn derive_urls(targets: &[Target]) -> Vec<String> {
    distinct_hosts(targets)
        .into_iter()
        .flat_map(|host| [format!("http://{}", host), format!("https://{}", host)])
        .collect()
}

/// The /24 containing `host`, if it is an IPv4 address
pub fn derive_subnet(host: &str) -> Option<String> {
    let ip: Ipv4Addr = host.trim().parse().ok()?;
    let [a, b, c, _] = ip.octets();
    Some(format!("{}.{}.{}.0/24", a, b, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hw_core::api::{OpenVasConfig, ToolConfig};

    fn target(host: &str) -> Target {
        Target::new(host, "ubuntu", "a2V5")
    }

    fn explicit(tests: &[&str]) -> ScanOptions {
        ScanOptions {
            auto_mode: false,
            tests: Some(tests.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_auto_mode_derives_everything() {
        let plan = ScanPlan::derive(&[target("10.0.0.5")], &ScanOptions::default());

        assert_eq!(plan.checks.len(), 15);
        assert!(plan.extended_audit);
        assert_eq!(plan.tools, ToolKind::ALL.to_vec());
        assert_eq!(plan.inputs.urls, vec!["http://10.0.0.5", "https://10.0.0.5"]);
        assert_eq!(plan.inputs.subnet.as_deref(), Some("10.0.0.0/24"));
        assert_eq!(plan.inputs.hosts, vec!["10.0.0.5"]);
        assert_eq!(plan.inputs.credentialed_targets.len(), 1);
    }

    #[test]
    fn test_missing_tests_fall_back_to_auto() {
        let options = ScanOptions {
            auto_mode: false,
            tests: Some(vec![]),
            ..Default::default()
        };
        let plan = ScanPlan::derive(&[target("10.0.0.5")], &options);
        assert_eq!(plan.checks.len(), 15);
        assert!(plan.extended_audit);
    }

    #[test]
    fn test_caller_inputs_win_in_auto_mode() {
        let options = ScanOptions {
            urls: Some(vec!["https://portal.example.org".to_string()]),
            subnet: Some("192.168.1.0/24".to_string()),
            ..Default::default()
        };
        let plan = ScanPlan::derive(&[target("10.0.0.5")], &options);
        assert_eq!(plan.inputs.urls, vec!["https://portal.example.org"]);
        assert_eq!(plan.inputs.subnet.as_deref(), Some("192.168.1.0/24"));
    }

    #[test]
    fn test_explicit_mode_is_verbatim() {
        let plan = ScanPlan::derive(
            &[target("10.0.0.5")],
            &explicit(&["firewall", "bogus", "nikto", "lynis", "nmap"]),
        );

        assert_eq!(plan.checks, vec!["firewall", "bogus"]);
        assert!(plan.extended_audit);
        assert_eq!(plan.tools, vec![ToolKind::Nmap, ToolKind::Nikto]);
        // No caller URLs: nikto has nothing to scan
        assert!(plan.inputs.urls.is_empty());
        assert!(plan.inputs.subnet.is_none());
        assert_eq!(plan.runnable_tools().collect::<Vec<_>>(), vec![ToolKind::Nmap]);
    }

    #[test]
    fn test_urls_deduplicate_hosts() {
        let urls = derive_urls(&[target("a"), target(" a "), target("b")]);
        assert_eq!(urls, vec!["http://a", "https://a", "http://b", "https://b"]);
    }

    #[test]
    fn test_option_like_inputs_never_reach_tools() {
        let options = ScanOptions {
            urls: Some(vec!["-o/tmp/x".to_string(), "https://ok.example.org".to_string()]),
            subnet: Some("-iL/etc/passwd".to_string()),
            ..Default::default()
        };
        let targets = [target("-iL/etc/passwd"), target("10.0.0.5 -oN x"), target("10.0.0.5")];
        let plan = ScanPlan::derive(&targets, &options);

        assert_eq!(plan.inputs.hosts, vec!["10.0.0.5"]);
        assert_eq!(plan.inputs.urls, vec!["https://ok.example.org"]);
        // The rejected caller subnet falls back to the first target, which is unusable too
        assert!(plan.inputs.subnet.is_none());
        assert!(!plan.inputs.satisfies(ToolKind::Zmap));

        let urls = derive_urls(&targets);
        assert_eq!(urls, vec!["http://10.0.0.5", "https://10.0.0.5"]);
    }

    #[test]
    fn test_derive_subnet() {
        assert_eq!(derive_subnet("192.168.7.42").as_deref(), Some("192.168.7.0/24"));
        assert_eq!(derive_subnet("db.internal"), None);
        assert_eq!(derive_subnet("::1"), None);
        assert_eq!(derive_subnet(""), None);
    }

    #[test]
    fn test_subnet_uses_first_target_only() {
        let plan = ScanPlan::derive(
            &[target("web.internal"), target("10.0.0.5")],
            &ScanOptions::default(),
        );
        assert!(plan.inputs.subnet.is_none());
    }

    #[test]
    fn test_step_budget() {
        let targets = [target("10.0.0.5"), target("10.0.0.6")];
        let plan = ScanPlan::derive(&targets, &ScanOptions::default());
        // 2 targets x (checks + audit) + nmap, nikto, nuclei, zmap, vuls
        assert_eq!(plan.total_steps(2), 9);

        let options = ScanOptions {
            tool_config: Some(ToolConfig {
                openvas: Some(OpenVasConfig {
                    host: "gvm".to_string(),
                    port: 9390,
                    api_key: String::new(),
                    targets: vec![],
                }),
            }),
            ..Default::default()
        };
        let plan = ScanPlan::derive(&targets, &options);
        assert_eq!(plan.total_steps(2), 10);
    }

    #[test]
    fn test_step_budget_floor() {
        let plan = ScanPlan::derive(&[], &explicit(&["bogus"]));
        assert!(!plan.has_checks());
        assert_eq!(plan.steps_per_target(), 0);
        assert_eq!(plan.total_steps(0), 1);
    }
}
