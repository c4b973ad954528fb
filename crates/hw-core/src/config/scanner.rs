//! Scanner configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::serde_utils::duration_secs;

/// Configuration for the scan server and its collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Address to bind the HTTP API to
    pub bind_address: String,

    /// Directory generated reports are written to (created on demand)
    pub reports_dir: PathBuf,

    /// How many targets of one job are scanned at the same time
    pub max_concurrent_targets: usize,

    /// SSH execution channel settings
    pub ssh: SshConfig,

    /// Local network tool settings
    pub tools: ToolsConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        let reports_dir = dirs::data_dir()
            .map(|dir| dir.join("hostwarden").join("reports"))
            .unwrap_or_else(|| PathBuf::from("reports"));

        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            reports_dir,
            max_concurrent_targets: 1,
            ssh: SshConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl ScannerConfig {
    /// Base URL clients use to reach the API
    pub fn server_url(&self) -> String {
        format!("http://{}", self.bind_address)
    }
}

/// SSH connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// Remote SSH port
    pub port: u16,

    /// Upper bound on connect + authenticate
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,

    /// Connection attempts before a target is declared unreachable
    pub connect_attempts: u32,

    /// Delay between connection attempts
    pub backoff: BackoffConfig,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            port: 22,
            connect_timeout: Duration::from_secs(30),
            connect_attempts: 1,
            backoff: BackoffConfig::default(),
        }
    }
}

/// Exponential backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Initial delay
    #[serde(with = "duration_secs")]
    pub initial: Duration,

    /// Maximum delay
    #[serde(with = "duration_secs")]
    pub max: Duration,

    /// Multiplier for each retry
    pub multiplier: f64,

    /// Jitter factor (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: 0.25,
        }
    }
}

/// Settings for the local scanning binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Timeout for the availability probe of each binary
    #[serde(with = "duration_secs")]
    pub probe_timeout: Duration,

    /// Ports nmap checks on every host
    pub nmap_ports: String,

    /// nmap timeout per host
    #[serde(with = "duration_secs")]
    pub nmap_timeout: Duration,

    /// nikto timeout per URL
    #[serde(with = "duration_secs")]
    pub nikto_timeout: Duration,

    /// Severities nuclei reports
    pub nuclei_severity: String,

    /// nuclei timeout for the whole URL list
    #[serde(with = "duration_secs")]
    pub nuclei_timeout: Duration,

    /// Ports zmap probes across the subnet
    pub zmap_ports: String,

    /// zmap timeout per port
    #[serde(with = "duration_secs")]
    pub zmap_timeout: Duration,

    /// Responsive addresses kept per zmap port
    pub zmap_max_addresses: usize,

    /// vuls timeout for the whole scan
    #[serde(with = "duration_secs")]
    pub vuls_timeout: Duration,

    /// Request timeout for the openvasd API
    #[serde(with = "duration_secs")]
    pub openvas_timeout: Duration,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            nmap_ports: "22,80,443,8080".to_string(),
            nmap_timeout: Duration::from_secs(300),
            nikto_timeout: Duration::from_secs(300),
            nuclei_severity: "critical,high,medium".to_string(),
            nuclei_timeout: Duration::from_secs(600),
            zmap_ports: "22,80,443".to_string(),
            zmap_timeout: Duration::from_secs(120),
            zmap_max_addresses: 100,
            vuls_timeout: Duration::from_secs(600),
            openvas_timeout: Duration::from_secs(30),
        }
    }
}
