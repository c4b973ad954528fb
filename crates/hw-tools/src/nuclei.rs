//! Nuclei template scan

use hw_core::config::ToolsConfig;
use hw_core::traits::is_safe_operand;
use hw_core::NetworkScanResult;
use serde_json::json;

use crate::nikto::is_web_url;
use crate::process::{probe, run_command, ToolError};

const MAX_FINDINGS: usize = 50;
const PREVIEW_FINDINGS: usize = 30;

/// Non-empty lines of combined stdout and stderr
pub fn collect_findings(stdout: &str, stderr: &str) -> Vec<String> {
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

async fn scan(urls: &[&str], config: &ToolsConfig) -> Result<Vec<String>, ToolError> {
    let list = tempfile::Builder::new()
        .prefix("hostwarden-nuclei-")
        .suffix(".txt")
        .tempfile()?;
    tokio::fs::write(list.path(), urls.join("\n")).await?;

    let path = list.path().to_string_lossy().into_owned();
    let args = [
        "-l",
        path.as_str(),
        "-severity",
        config.nuclei_severity.as_str(),
        "-silent",
        "-no-color",
    ];
    let output = run_command("nuclei", &args, None, config.nuclei_timeout).await?;
    Ok(collect_findings(&output.stdout, &output.stderr))
}

/// Scan every http(s) URL in one invocation
pub async fn run(urls: &[String], config: &ToolsConfig) -> NetworkScanResult {
    if !probe("nuclei", &["-version"], config.probe_timeout).await {
        return NetworkScanResult::not_applicable("Nuclei not installed");
    }

    let valid: Vec<&str> = urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| is_web_url(u) && is_safe_operand(u))
        .collect();
    if valid.is_empty() {
        return NetworkScanResult::info("No valid URLs to scan");
    }

    let mut findings = match scan(&valid, config).await {
        Ok(findings) => findings,
        Err(e) => {
            tracing::warn!("nuclei scan failed: {}", e);
            vec![e.to_string()]
        }
    };

    let message = if findings.is_empty() {
        "No findings".to_string()
    } else {
        format!("{} finding(s)", findings.len())
    };
    let preview = findings
        .iter()
        .take(PREVIEW_FINDINGS)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");
    findings.truncate(MAX_FINDINGS);

    NetworkScanResult::info(message)
        .with_findings(findings)
        .with_data(json!({ "rawPreview": preview, "urls": valid }))
}
