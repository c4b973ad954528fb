//! ZMap host discovery on the scan subnet

use hw_core::config::ToolsConfig;
use hw_core::traits::is_safe_operand;
use hw_core::{NetworkScanResult, ToolTargetResult};
use serde_json::json;

use crate::process::{probe, run_command};

/// Responsive addresses from zmap's one-per-line output
pub fn parse_addresses(stdout: &str, limit: usize) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Probe each configured port across `subnet`
pub async fn run(subnet: &str, config: &ToolsConfig) -> NetworkScanResult {
    let subnet = subnet.trim();
    if !is_safe_operand(subnet) {
        return NetworkScanResult::error(format!("Invalid subnet: {:?}", subnet));
    }
    if !probe("zmap", &["--version"], config.probe_timeout).await {
        return NetworkScanResult::not_applicable("ZMap not installed or insufficient privileges");
    }

    let ports = config
        .zmap_ports
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));

    let mut results = Vec::new();
    for port in ports {
        let args = ["-p", port, subnet, "-o", "-"];
        let entry = match run_command("zmap", &args, None, config.zmap_timeout).await {
            Ok(output) => {
                let addresses = parse_addresses(&output.stdout, config.zmap_max_addresses);
                ToolTargetResult::new(port, output.success(), format!("{} responsive", addresses.len()))
                    .with_items(addresses)
            }
            Err(e) => {
                tracing::warn!("zmap on port {} failed: {}", port, e);
                ToolTargetResult::new(port, false, e.to_string())
            }
        };
        results.push(entry);
    }

    NetworkScanResult::info(format!("Probed {} port(s) on {}", results.len(), subnet))
        .with_results(results)
        .with_data(json!({ "subnet": subnet }))
}
