//! Vuls CVE scan of the credentialed targets
//!
//! Vuls connects to the targets itself, so each run gets a private work
//! directory holding a generated `config.toml` and the private key, both
//! removed when the run ends.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hw_core::config::ToolsConfig;
use hw_core::types::preview;
use hw_core::{NetworkScanResult, Target, ToolTargetResult};
use serde::Serialize;

use crate::process::{probe, run_command, ToolError};

const KEY_FILE: &str = "id_scan";
const CONFIG_FILE: &str = "config.toml";
const RESULTS_DIR: &str = "results";
const OUTPUT_CHARS: usize = 500;

#[derive(Debug, Serialize)]
struct VulsConfig {
    default: VulsDefaults,
    servers: BTreeMap<String, VulsServer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VulsDefaults {
    scan_mode: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VulsServer {
    host: String,
    user: String,
    key_path: String,
}

/// Section name for a target: alphanumerics, `-` and `_` only
fn server_name(target: &Target, index: usize) -> String {
    let name: String = target
        .display_name()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        format!("server{}", index)
    } else {
        name
    }
}

/// Render the vuls configuration for `targets` using one shared key file
pub fn build_config(targets: &[Target], key_path: &Path) -> Result<String, toml::ser::Error> {
    let mut servers = BTreeMap::new();
    for (i, target) in targets.iter().enumerate() {
        let mut name = server_name(target, i);
        if servers.contains_key(&name) {
            name = format!("{}_{}", name, i);
        }
        servers.insert(
            name,
            VulsServer {
                host: target.host.trim().to_string(),
                user: target.user.clone(),
                key_path: key_path.to_string_lossy().into_owned(),
            },
        );
    }

    toml::to_string(&VulsConfig {
        default: VulsDefaults {
            scan_mode: vec!["fast".to_string()],
        },
        servers,
    })
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// First JSON report under `results/`, at most one directory level down
async fn find_report(dir: &Path) -> Option<PathBuf> {
    let mut entries = tokio::fs::read_dir(dir).await.ok()?;
    let mut subdirs = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        match entry.file_type().await {
            Ok(kind) if kind.is_dir() => subdirs.push(path),
            Ok(_) if is_json(&path) => return Some(path),
            _ => {}
        }
    }

    subdirs.sort();
    for sub in subdirs {
        let Ok(mut entries) = tokio::fs::read_dir(&sub).await else {
            continue;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if is_json(&path) {
                return Some(path);
            }
        }
    }
    None
}

async fn write_key(path: &Path, key: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(path, key).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    }
    Ok(())
}

async fn scan(targets: &[Target], key: &[u8], config: &ToolsConfig) -> Result<NetworkScanResult, ToolError> {
    let work_dir = tempfile::Builder::new().prefix("hostwarden-vuls-").tempdir()?;
    let key_path = work_dir.path().join(KEY_FILE);
    write_key(&key_path, key).await?;

    let rendered = build_config(targets, &key_path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let config_path = work_dir.path().join(CONFIG_FILE);
    tokio::fs::write(&config_path, rendered).await?;

    let config_arg = config_path.to_string_lossy().into_owned();
    let output = run_command(
        "vuls",
        &["scan", "-config", config_arg.as_str()],
        Some(work_dir.path()),
        config.vuls_timeout,
    )
    .await?;

    if let Some(report) = find_report(&work_dir.path().join(RESULTS_DIR)).await {
        let content = tokio::fs::read_to_string(&report).await?;
        let data: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        return Ok(NetworkScanResult::info("Vuls scan completed").with_data(data));
    }

    Ok(NetworkScanResult::info("Vuls scan completed").with_results(vec![
        ToolTargetResult::new("vuls", output.success(), preview(output.text(), OUTPUT_CHARS)),
    ]))
}

/// Scan `targets` with the key of the first one
pub async fn run(targets: &[Target], config: &ToolsConfig) -> NetworkScanResult {
    if !probe("vuls", &["version"], config.probe_timeout).await {
        return NetworkScanResult::not_applicable("Vuls not installed or CVE DB not initialized");
    }

    let Some(first) = targets.first() else {
        return NetworkScanResult::info("No credentialed targets");
    };
    let encoded: String = first.credential.split_whitespace().collect();
    let key = match STANDARD.decode(encoded) {
        Ok(key) => key,
        Err(e) => return NetworkScanResult::error(format!("Invalid key format: {}", e)),
    };

    match scan(targets, &key, config).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("vuls scan failed: {}", e);
            NetworkScanResult::error(e.to_string())
        }
    }
}
