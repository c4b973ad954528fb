//! Nikto web server scan

use hw_core::config::ToolsConfig;
use hw_core::traits::is_safe_operand;
use hw_core::types::preview;
use hw_core::{NetworkScanResult, ToolTargetResult};

use crate::process::{probe, run_command};

const OUTPUT_CHARS: usize = 3000;

/// Whether `url` is an absolute http(s) URL
pub fn is_web_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Scan each http(s) URL in turn; other entries are ignored
pub async fn run(urls: &[String], config: &ToolsConfig) -> NetworkScanResult {
    if !probe("nikto", &["-Version"], config.probe_timeout).await {
        return NetworkScanResult::not_applicable("Nikto not installed");
    }

    let mut results = Vec::new();
    let safe = urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| is_web_url(u) && is_safe_operand(u));
    for url in safe {
        let args = ["-h", url, "-Format", "txt"];
        let entry = match run_command("nikto", &args, None, config.nikto_timeout).await {
            Ok(output) => {
                ToolTargetResult::new(url, output.success(), preview(&output.stdout, OUTPUT_CHARS))
            }
            Err(e) => {
                tracing::warn!("nikto against {} failed: {}", url, e);
                ToolTargetResult::new(url, false, e.to_string())
            }
        };
        results.push(entry);
    }

    NetworkScanResult::info(format!("Scanned {} URL(s)", results.len())).with_results(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_web_url() {
        assert!(is_web_url("http://10.0.0.5"));
        assert!(is_web_url("https://example.org/admin"));
        assert!(!is_web_url("ftp://10.0.0.5"));
        assert!(!is_web_url("10.0.0.5"));
    }
}
