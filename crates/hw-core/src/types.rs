//! Core domain types

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Remote user assumed when a target does not name one
pub const DEFAULT_USER: &str = "ubuntu";

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

/// Truncate `text` to at most `limit` characters
pub fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Unique identifier for a scan job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create a job ID from an existing string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Allocate a fresh random job ID
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, for file names and log lines
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One remote host to assess
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Hostname or IP address
    #[serde(default)]
    pub host: String,
    /// Display name used as the report key (defaults to host)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Remote login user
    #[serde(default = "default_user")]
    pub user: String,
    /// Base64-encoded private key
    #[serde(default, rename = "keyBase64")]
    pub credential: String,
}

impl Target {
    /// Create a new target with the given host, user and credential
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            name: None,
            user: user.into(),
            credential: credential.into(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name under which this target is reported
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.host,
        }
    }

    /// Whether both host and credential are present
    pub fn is_complete(&self) -> bool {
        !self.host.trim().is_empty() && !self.credential.trim().is_empty()
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("host", &self.host)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Outcome classification of a host-local check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckStatus {
    #[serde(rename = "pass")]
    Pass,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "fail")]
    Fail,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "n/a")]
    NotApplicable,
    #[serde(rename = "error")]
    Error,
}

impl CheckStatus {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Info => "info",
            CheckStatus::NotApplicable => "n/a",
            CheckStatus::Error => "error",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw outcome of running one command on a target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExecutionResult {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, -1 if the command never ran to completion
    pub exit_code: i32,
    pub success: bool,
    /// Transport, connection or timeout failure
    pub error: Option<String>,
}

impl RawExecutionResult {
    /// A command that ran and exited with `exit_code`
    pub fn completed(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
            success: exit_code == 0,
            error: None,
        }
    }

    /// A command that could not be executed
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: -1,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Outcome of one check against one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixes: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_preview: String,
    #[serde(default)]
    pub success: bool,
    /// Check-specific structured extras
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub details: serde_json::Map<String, Value>,
}

impl CheckResult {
    pub fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            findings: Vec::new(),
            fixes: Vec::new(),
            raw_preview: String::new(),
            success: false,
            details: serde_json::Map::new(),
        }
    }

    /// Result for a check whose execution itself failed
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Error, message)
    }

    pub fn with_finding(mut self, finding: impl Into<String>) -> Self {
        self.findings.push(finding.into());
        self
    }

    pub fn with_findings<I, S>(mut self, findings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.findings.extend(findings.into_iter().map(Into::into));
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fixes.push(fix.into());
        self
    }

    pub fn with_fixes<I, S>(mut self, fixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixes.extend(fixes.into_iter().map(Into::into));
        self
    }

    /// Attach the first `limit` characters of raw output
    pub fn with_raw_preview(mut self, raw: &str, limit: usize) -> Self {
        self.raw_preview = preview(raw, limit);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }
}

/// Status of a network-wide tool run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolStatus {
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "n/a")]
    NotApplicable,
    #[serde(rename = "error")]
    Error,
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolStatus::Info => write!(f, "info"),
            ToolStatus::NotApplicable => write!(f, "n/a"),
            ToolStatus::Error => write!(f, "error"),
        }
    }
}

/// Per-target sub-result of a network tool (one URL, host or port)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolTargetResult {
    pub target: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
}

impl ToolTargetResult {
    pub fn new(target: impl Into<String>, success: bool, output: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            success,
            output: output.into(),
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<String>) -> Self {
        self.items = items;
        self
    }
}

/// Outcome of one network-wide tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkScanResult {
    pub status: ToolStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<ToolTargetResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl NetworkScanResult {
    fn with_status(status: ToolStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            results: Vec::new(),
            findings: Vec::new(),
            data: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_status(ToolStatus::Info, message)
    }

    /// The tool is not installed or cannot run here
    pub fn not_applicable(message: impl Into<String>) -> Self {
        Self::with_status(ToolStatus::NotApplicable, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_status(ToolStatus::Error, message)
    }

    pub fn with_results(mut self, results: Vec<ToolTargetResult>) -> Self {
        self.results = results;
        self
    }

    pub fn with_findings(mut self, findings: Vec<String>) -> Self {
        self.findings = findings;
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Network-wide tools run once per job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// CVE scan of the credentialed targets
    Vuls,
    /// Port and service scan of the target hosts
    Nmap,
    /// Web server vulnerability scan of the URLs
    Nikto,
    /// Template-based vulnerability scan of the URLs
    Nuclei,
    /// Host discovery on the scan subnet
    Zmap,
    /// Managed vulnerability scanner integration
    Openvas,
}

impl ToolKind {
    /// Every tool, in dispatch order
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Vuls,
        ToolKind::Nmap,
        ToolKind::Nikto,
        ToolKind::Nuclei,
        ToolKind::Zmap,
        ToolKind::Openvas,
    ];

    /// Name used in test lists and report keys
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Vuls => "vuls",
            ToolKind::Nmap => "nmap",
            ToolKind::Nikto => "nikto",
            ToolKind::Nuclei => "nuclei",
            ToolKind::Zmap => "zmap",
            ToolKind::Openvas => "openvas",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Results for one target within a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerReport {
    pub host: String,
    pub user: String,
    pub reachable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub checks: BTreeMap<String, CheckResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_audit: Option<CheckResult>,
}

impl ServerReport {
    /// A connected target, checks still to be filled in
    pub fn reachable(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            reachable: true,
            error: None,
            checks: BTreeMap::new(),
            extended_audit: None,
        }
    }

    /// A target that could not be connected to
    pub fn unreachable(
        host: impl Into<String>,
        user: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            reachable: false,
            error: Some(error.into()),
            checks: BTreeMap::new(),
            extended_audit: None,
        }
    }
}

/// Final aggregate for one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub servers: BTreeMap<String, ServerReport>,
    #[serde(default)]
    pub network_scans: BTreeMap<String, NetworkScanResult>,
}

impl ScanReport {
    /// Empty report stamped with the current time
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            servers: BTreeMap::new(),
            network_scans: BTreeMap::new(),
        }
    }

    /// Iterate over every host-local check result
    pub fn check_results(&self) -> impl Iterator<Item = &CheckResult> {
        self.servers.values().flat_map(|s| s.checks.values())
    }
}

impl Default for ScanReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Job lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Running,
    Completed,
    Errored,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Running)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Running => write!(f, "running"),
            JobState::Completed => write!(f, "completed"),
            JobState::Errored => write!(f, "errored"),
        }
    }
}

/// One assessment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub state: JobState,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Aggregated results, present once terminal (partial on `Errored`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ScanReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// A freshly submitted job: running, no progress
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            state: JobState::Running,
            progress: 0,
            created_at: Utc::now(),
            finished_at: None,
            report: None,
            error: None,
        }
    }

    /// Raise progress to `percent` (capped at 100).
    ///
    /// Returns false if the job is terminal or the value would not raise
    /// progress.
    pub fn set_progress(&mut self, percent: u8) -> bool {
        let percent = percent.min(100);
        if self.state.is_terminal() || percent <= self.progress {
            return false;
        }
        self.progress = percent;
        true
    }

    /// Move to `Completed` with the final report
    pub fn complete(&mut self, report: ScanReport) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = JobState::Completed;
        self.progress = 100;
        self.report = Some(report);
        self.finished_at = Some(Utc::now());
        true
    }

    /// Move to `Errored`, keeping progress where it was
    pub fn fail(&mut self, error: impl Into<String>, partial: Option<ScanReport>) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = JobState::Errored;
        self.error = Some(error.into());
        self.report = partial;
        self.finished_at = Some(Utc::now());
        true
    }
}
