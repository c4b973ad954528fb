//! Network tool runner traits

use async_trait::async_trait;

use crate::api::OpenVasConfig;
use crate::types::{NetworkScanResult, Target, ToolKind};

/// Inputs shared by every network tool in one job
#[derive(Debug, Clone, Default)]
pub struct ToolInputs {
    /// URLs for the web scanners
    pub urls: Vec<String>,
    /// Hosts for the port scanner
    pub hosts: Vec<String>,
    /// CIDR for subnet discovery
    pub subnet: Option<String>,
    /// Targets with usable credentials, for the CVE scanner
    pub credentialed_targets: Vec<Target>,
    /// Managed scanner connection settings
    pub openvas: Option<OpenVasConfig>,
}

impl ToolInputs {
    /// Whether `tool` has the inputs it needs to run
    pub fn satisfies(&self, tool: ToolKind) -> bool {
        match tool {
            ToolKind::Nmap => !self.hosts.is_empty(),
            ToolKind::Nikto | ToolKind::Nuclei => !self.urls.is_empty(),
            ToolKind::Zmap => self.subnet.as_deref().is_some_and(|s| !s.is_empty()),
            ToolKind::Vuls => !self.credentialed_targets.is_empty(),
            ToolKind::Openvas => self.openvas.is_some(),
        }
    }
}

/// Whether `value` can be placed in a tool's argv as a plain operand
///
/// Rejects empty values, anything that would parse as an option, and values
/// carrying whitespace or control characters.
pub fn is_safe_operand(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Runs network-wide tools
///
/// Implementations must convert every failure (missing binary, spawn error,
/// timeout) into a [`NetworkScanResult`] rather than propagating it.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, tool: ToolKind, inputs: &ToolInputs) -> NetworkScanResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs_satisfy_nothing() {
        let inputs = ToolInputs::default();
        for tool in ToolKind::ALL {
            assert!(!inputs.satisfies(tool), "{} should need inputs", tool);
        }
    }

    #[test]
    fn test_inputs_per_tool() {
        let inputs = ToolInputs {
            urls: vec!["http://10.0.0.5".to_string()],
            subnet: Some("10.0.0.0/24".to_string()),
            ..Default::default()
        };
        assert!(inputs.satisfies(ToolKind::Nikto));
        assert!(inputs.satisfies(ToolKind::Nuclei));
        assert!(inputs.satisfies(ToolKind::Zmap));
        assert!(!inputs.satisfies(ToolKind::Nmap));
        assert!(!inputs.satisfies(ToolKind::Vuls));
        assert!(!inputs.satisfies(ToolKind::Openvas));
    }

    #[test]
    fn test_safe_operand() {
        assert!(is_safe_operand("10.0.0.5"));
        assert!(is_safe_operand("db.internal"));
        assert!(is_safe_operand("10.0.0.0/24"));
        assert!(is_safe_operand("https://10.0.0.5:8443/login?x=1"));

        assert!(!is_safe_operand(""));
        assert!(!is_safe_operand("-iL/etc/passwd"));
        assert!(!is_safe_operand("--script=http-fetch"));
        assert!(!is_safe_operand("10.0.0.5 -oN /tmp/x"));
        assert!(!is_safe_operand("http://a\nhttp://b"));
        assert!(!is_safe_operand("10.0.0.5\t"));
    }
}
