//! HTTP wire types shared by the server and the CLI client
//!
//! All bodies are JSON with camelCase field names.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{JobId, Target};

fn default_true() -> bool {
    true
}

fn default_openvas_port() -> u16 {
    9390
}

/// Body of `POST /api/scan`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    #[serde(default)]
    pub servers: Vec<Target>,
    #[serde(flatten)]
    pub options: ScanOptions,
}

/// Everything about a submission except the targets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOptions {
    /// Derive the full plan and network inputs from the targets
    #[serde(default = "default_true")]
    pub auto_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            auto_mode: true,
            tests: None,
            urls: None,
            subnet: None,
            tool_config: None,
        }
    }
}

/// Per-tool settings supplied with a submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openvas: Option<OpenVasConfig>,
}

/// Connection settings for a managed OpenVAS/openvasd scanner
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenVasConfig {
    pub host: String,
    #[serde(default = "default_openvas_port")]
    pub port: u16,
    #[serde(default)]
    pub api_key: String,
    /// Subnets or hosts the scanner should cover
    #[serde(default)]
    pub targets: Vec<String>,
}

impl fmt::Debug for OpenVasConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenVasConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &"<redacted>")
            .field("targets", &self.targets)
            .finish()
    }
}

/// Response to a scan submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanAccepted {
    pub job_id: JobId,
}

/// Body of `POST /api/report/generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub job_id: JobId,
}

/// Response to report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCreated {
    pub filename: String,
}

/// Error body returned with every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
