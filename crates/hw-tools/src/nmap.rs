//! Nmap port and service scan

use hw_core::config::ToolsConfig;
use hw_core::traits::is_safe_operand;
use hw_core::types::preview;
use hw_core::{NetworkScanResult, ToolTargetResult};
use serde_json::json;

use crate::process::{probe, run_command};

/// Ports scanned when the configured list has no usable entry
const FALLBACK_PORTS: &str = "22,80,443";
const OUTPUT_CHARS: usize = 5000;

/// Keep only numeric entries of a comma-separated port list
pub fn sanitize_ports(ports: &str) -> String {
    let list: Vec<&str> = ports
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
        .collect();
    if list.is_empty() {
        FALLBACK_PORTS.to_string()
    } else {
        list.join(",")
    }
}

/// TCP connect scan with service detection, one invocation per host
pub async fn run(hosts: &[String], config: &ToolsConfig) -> NetworkScanResult {
    if !probe("nmap", &["--version"], config.probe_timeout).await {
        return NetworkScanResult::not_applicable("Nmap not installed");
    }

    let ports = sanitize_ports(&config.nmap_ports);
    let mut results = Vec::new();

    for host in hosts.iter().map(|h| h.trim()).filter(|h| !h.is_empty()) {
        if !is_safe_operand(host) {
            tracing::warn!("Skipping nmap target {:?}: not a plain host", host);
            results.push(ToolTargetResult::new(host, false, "Rejected target: not a plain host"));
            continue;
        }
        let args = ["-sT", "-sV", "-T4", "-p", ports.as_str(), host, "-oG", "-"];
        let entry = match run_command("nmap", &args, None, config.nmap_timeout).await {
            Ok(output) => ToolTargetResult::new(
                host,
                output.success(),
                preview(output.text(), OUTPUT_CHARS),
            ),
            Err(e) => {
                tracing::warn!("nmap against {} failed: {}", host, e);
                ToolTargetResult::new(host, false, e.to_string())
            }
        };
        results.push(entry);
    }

    NetworkScanResult::info(format!("Scanned {} host(s)", results.len()))
        .with_results(results)
        .with_data(json!({ "ports": ports }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hw_core::ToolStatus;

    #[test]
    fn test_sanitize_ports() {
        assert_eq!(sanitize_ports("22, 80,443 ,8080"), "22,80,443,8080");
        assert_eq!(sanitize_ports("22,http,443;rm -rf"), "22");
        assert_eq!(sanitize_ports("abc"), FALLBACK_PORTS);
        assert_eq!(sanitize_ports(""), FALLBACK_PORTS);
    }

    #[tokio::test]
    async fn test_option_like_host_is_not_scanned() {
        // Present or not, nmap must never see the host as an argument
        let config = ToolsConfig::default();
        let result = run(&["-iL/etc/passwd".to_string()], &config).await;
        if result.status == ToolStatus::NotApplicable {
            return;
        }
        assert_eq!(result.results.len(), 1);
        assert!(!result.results[0].success);
        assert_eq!(result.results[0].output, "Rejected target: not a plain host");
    }
}
