//! Report rendering and artifact storage
//!
//! A terminal job's report is rendered to a self-contained HTML file in the
//! reports directory. Artifacts are addressed by bare file name; names that
//! could escape the directory are rejected before touching the filesystem.

use std::fmt::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use hw_core::{
    CheckResult, CheckStatus, Job, JobId, NetworkScanResult, ScanReport, ServerReport,
    ValidationError,
};
use thiserror::Error;

use crate::jobs::JobStore;

/// Report generation and download errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// No job with the requested id
    #[error("Job not found")]
    JobNotFound,

    /// The job has not reached a terminal state
    #[error("Scan not yet completed")]
    JobRunning,

    /// The requested name is not a plain file name
    #[error(transparent)]
    InvalidFilename(#[from] ValidationError),

    /// No artifact with the requested name
    #[error("Report not found")]
    NotFound,

    /// HTML rendering failed
    #[error("Report rendering failed")]
    Render(#[from] fmt::Error),

    /// Reading or writing the artifact failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pass/warn/fail counts over every host check in a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub pass: usize,
    pub warn: usize,
    pub fail: usize,
}

impl Summary {
    pub fn from_report(report: &ScanReport) -> Self {
        report.check_results().fold(Self::default(), |mut summary, check| {
            match check.status {
                CheckStatus::Pass => summary.pass += 1,
                CheckStatus::Warn => summary.warn += 1,
                CheckStatus::Fail => summary.fail += 1,
                _ => {}
            }
            summary
        })
    }
}

/// Reject names that are empty or contain path components
pub fn validate_filename(filename: &str) -> Result<(), ReportError> {
    let invalid = filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0');
    if invalid {
        return Err(ValidationError::InvalidFilename(filename.to_string()).into());
    }
    Ok(())
}

/// Renders terminal jobs and serves the resulting artifacts
pub struct ReportService {
    store: Arc<dyn JobStore>,
    reports_dir: PathBuf,
}

impl ReportService {
    pub fn new(store: Arc<dyn JobStore>, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            reports_dir: reports_dir.into(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Render the report of a terminal job; returns the artifact name
    pub async fn generate(&self, id: &JobId) -> Result<String, ReportError> {
        let job = self.store.get(id).ok_or(ReportError::JobNotFound)?;
        if !job.state.is_terminal() {
            return Err(ReportError::JobRunning);
        }

        let html = render_html(&job)?;
        let filename = format!(
            "security_report_{}_{}.html",
            Utc::now().format("%Y%m%d_%H%M%S"),
            id.short()
        );

        tokio::fs::create_dir_all(&self.reports_dir).await?;
        tokio::fs::write(self.reports_dir.join(&filename), html).await?;
        tracing::info!("Generated report {} for job {}", filename, id.short());
        Ok(filename)
    }

    /// Path of an existing artifact
    pub async fn resolve(&self, filename: &str) -> Result<PathBuf, ReportError> {
        validate_filename(filename)?;
        let path = self.reports_dir.join(filename);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(ReportError::NotFound),
        }
    }

    /// Contents of an existing artifact
    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, ReportError> {
        let path = self.resolve(filename).await?;
        Ok(tokio::fs::read(path).await?)
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;width:100%;margin-bottom:1.5em}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left;vertical-align:top}\
pre{background:#f5f5f5;padding:8px;white-space:pre-wrap}\
.pass{color:#1a7f37}.warn{color:#9a6700}.fail,.error{color:#cf222e}\
.info,.n-a{color:#57606a}";

fn status_class(status: &str) -> &'static str {
    match status {
        "pass" => "pass",
        "warn" => "warn",
        "fail" => "fail",
        "error" => "error",
        "n/a" => "n-a",
        _ => "info",
    }
}

fn write_list(html: &mut String, title: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    write!(html, "<strong>{}</strong><ul>", title)?;
    for item in items {
        write!(html, "<li>{}</li>", escape(item))?;
    }
    write!(html, "</ul>")
}

fn write_check_row(html: &mut String, name: &str, check: &CheckResult) -> fmt::Result {
    let status = check.status.as_str();
    write!(
        html,
        "<tr><td>{}</td><td class=\"{}\">{}</td><td>{}",
        escape(name),
        status_class(status),
        status,
        escape(&check.message)
    )?;
    write_list(html, "Findings", &check.findings)?;
    write_list(html, "Fixes", &check.fixes)?;
    writeln!(html, "</td></tr>")
}

fn write_server(html: &mut String, name: &str, server: &ServerReport) -> fmt::Result {
    writeln!(
        html,
        "<h3>{} <small>({}@{})</small></h3>",
        escape(name),
        escape(&server.user),
        escape(&server.host)
    )?;
    if !server.reachable {
        let error = server.error.as_deref().unwrap_or("unreachable");
        return writeln!(html, "<p class=\"fail\">Unreachable: {}</p>", escape(error));
    }

    writeln!(html, "<table><tr><th>Check</th><th>Status</th><th>Details</th></tr>")?;
    for (check_name, check) in &server.checks {
        write_check_row(html, check_name, check)?;
    }
    if let Some(audit) = &server.extended_audit {
        write_check_row(html, "lynis", audit)?;
    }
    writeln!(html, "</table>")
}

fn write_network_scan(html: &mut String, tool: &str, scan: &NetworkScanResult) -> fmt::Result {
    let status = scan.status.to_string();
    writeln!(
        html,
        "<h3>{} <span class=\"{}\">[{}]</span></h3><p>{}</p>",
        escape(tool),
        status_class(&status),
        status,
        escape(&scan.message)
    )?;
    for result in &scan.results {
        write!(
            html,
            "<p><strong>{}</strong> {}</p>",
            escape(&result.target),
            if result.success { "ok" } else { "failed" }
        )?;
        if !result.output.is_empty() {
            write!(html, "<pre>{}</pre>", escape(&result.output))?;
        }
        write_list(html, "Items", &result.items)?;
    }
    write_list(html, "Findings", &scan.findings)?;
    if let Some(data) = &scan.data {
        let pretty = serde_json::to_string_pretty(data).unwrap_or_default();
        writeln!(html, "<pre>{}</pre>", escape(&pretty))?;
    }
    Ok(())
}

/// Self-contained HTML document for a terminal job
pub fn render_html(job: &Job) -> Result<String, fmt::Error> {
    let empty = ScanReport::default();
    let report = job.report.as_ref().unwrap_or(&empty);
    let summary = Summary::from_report(report);

    let mut html = String::new();
    writeln!(html, "<!DOCTYPE html><html><head><meta charset=\"utf-8\">")?;
    writeln!(html, "<title>Security Report {}</title>", escape(job.id.short()))?;
    writeln!(html, "<style>{}</style></head><body>", STYLE)?;
    writeln!(html, "<h1>Security Report</h1>")?;
    writeln!(
        html,
        "<p>Job {} &middot; scanned {} &middot; {} server(s)</p>",
        escape(job.id.as_str()),
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        report.servers.len()
    )?;
    if let Some(error) = &job.error {
        writeln!(html, "<p class=\"error\">Scan failed: {}</p>", escape(error))?;
    }

    writeln!(
        html,
        "<h2>Summary</h2><table><tr><th class=\"pass\">Pass</th><th class=\"warn\">Warn</th>\
         <th class=\"fail\">Fail</th></tr><tr><td>{}</td><td>{}</td><td>{}</td></tr></table>",
        summary.pass, summary.warn, summary.fail
    )?;

    if !report.servers.is_empty() {
        writeln!(html, "<h2>Servers</h2>")?;
        for (name, server) in &report.servers {
            write_server(&mut html, name, server)?;
        }
    }

    if !report.network_scans.is_empty() {
        writeln!(html, "<h2>Network Scans</h2>")?;
        for (tool, scan) in &report.network_scans {
            write_network_scan(&mut html, tool, scan)?;
        }
    }

    writeln!(html, "</body></html>")?;
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::InMemoryJobStore;

    fn report_with_checks() -> ScanReport {
        let mut server = ServerReport::reachable("10.0.0.5", "ubuntu");
        server.checks.insert(
            "firewall".to_string(),
            CheckResult::new(CheckStatus::Pass, "Firewall active"),
        );
        server.checks.insert(
            "disk_usage".to_string(),
            CheckResult::new(CheckStatus::Fail, "Disk nearly full").with_finding("/: 95% full"),
        );
        server.checks.insert(
            "updates".to_string(),
            CheckResult::new(CheckStatus::Warn, "3 updates pending"),
        );
        server.checks.insert(
            "sudo_users".to_string(),
            CheckResult::new(CheckStatus::Info, "<script>alert(1)</script>"),
        );

        let mut report = ScanReport::new();
        report.servers.insert("web".to_string(), server);
        report.servers.insert(
            "db".to_string(),
            ServerReport::unreachable("10.0.0.6", "ubuntu", "Connection refused"),
        );
        report
            .network_scans
            .insert("nmap".to_string(), NetworkScanResult::not_applicable("Nmap not installed"));
        report
    }

    fn service_with_job(complete: bool) -> (ReportService, JobId, tempfile::TempDir) {
        let store = Arc::new(InMemoryJobStore::new());
        let id = JobId::generate();
        store.insert(Job::new(id.clone()));
        if complete {
            store.complete(&id, report_with_checks());
        }
        let dir = tempfile::tempdir().unwrap();
        let service = ReportService::new(store, dir.path().join("reports"));
        (service, id, dir)
    }

    #[test]
    fn test_summary_counts() {
        let summary = Summary::from_report(&report_with_checks());
        assert_eq!(
            summary,
            Summary {
                pass: 1,
                warn: 1,
                fail: 1
            }
        );
    }

    #[test]
    fn test_render_escapes_and_lists_everything() {
        let mut job = Job::new(JobId::new("0123456789"));
        job.complete(report_with_checks());
        let html = render_html(&job).unwrap();

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Unreachable: Connection refused"));
        assert!(html.contains("/: 95% full"));
        assert!(html.contains("Nmap not installed"));
        assert!(html.contains("Security Report 01234567"));
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("security_report_20260101_000000_abcd1234.html").is_ok());
        for bad in ["", "../etc/passwd", "..", "a/b.html", "a\\b.html"] {
            assert!(
                matches!(validate_filename(bad), Err(ReportError::InvalidFilename(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_generate_and_read() {
        let (service, id, _dir) = service_with_job(true);

        let filename = service.generate(&id).await.unwrap();
        assert!(filename.starts_with("security_report_"));
        assert!(filename.ends_with(&format!("_{}.html", id.short())));

        let bytes = service.read(&filename).await.unwrap();
        let html = String::from_utf8(bytes).unwrap();
        assert!(html.contains("Firewall active"));
    }

    #[tokio::test]
    async fn test_generate_rejects_running_and_unknown_jobs() {
        let (service, id, _dir) = service_with_job(false);

        assert!(matches!(service.generate(&id).await, Err(ReportError::JobRunning)));
        assert!(matches!(
            service.generate(&JobId::new("nope")).await,
            Err(ReportError::JobNotFound)
        ));
        assert!(!service.reports_dir().exists());
    }

    #[tokio::test]
    async fn test_read_missing_and_traversal() {
        let (service, _id, _dir) = service_with_job(true);

        assert!(matches!(service.read("missing.html").await, Err(ReportError::NotFound)));
        assert!(matches!(
            service.read("../etc/passwd").await,
            Err(ReportError::InvalidFilename(_))
        ));
    }

    #[tokio::test]
    async fn test_errored_job_renders_partial_report() {
        let store = Arc::new(InMemoryJobStore::new());
        let id = JobId::generate();
        store.insert(Job::new(id.clone()));
        store.fail(&id, "worker panicked".to_string(), Some(report_with_checks()));

        let dir = tempfile::tempdir().unwrap();
        let service = ReportService::new(store, dir.path());
        let filename = service.generate(&id).await.unwrap();
        let html = String::from_utf8(service.read(&filename).await.unwrap()).unwrap();

        assert!(html.contains("Scan failed: worker panicked"));
        assert!(html.contains("Firewall active"));
    }
}
