//! Output formatting utilities for the CLI
//!
//! Tables for job reports and colored status lines.

use tabled::{
    settings::{Style, Width},
    Table, Tabled,
};

use hw_core::{CheckStatus, Job, JobState, ScanReport};

/// One-line description of a job's state
pub fn format_job_line(job: &Job) -> String {
    let mut line = format!("Job {}: {} ({}%)", job.id, job.state, job.progress);
    if let Some(error) = &job.error {
        line.push_str(&format!(" - {}", error));
    }
    line
}

/// Per-server summary table
pub fn format_servers(report: &ScanReport) -> String {
    if report.servers.is_empty() {
        return "No servers scanned".to_string();
    }

    #[derive(Tabled)]
    struct ServerRow {
        #[tabled(rename = "SERVER")]
        name: String,
        #[tabled(rename = "HOST")]
        host: String,
        #[tabled(rename = "REACHABLE")]
        reachable: String,
        #[tabled(rename = "PASS")]
        pass: usize,
        #[tabled(rename = "WARN")]
        warn: usize,
        #[tabled(rename = "FAIL")]
        fail: usize,
        #[tabled(rename = "NOTE")]
        note: String,
    }

    let rows: Vec<ServerRow> = report
        .servers
        .iter()
        .map(|(name, server)| {
            let count = |status: CheckStatus| {
                server.checks.values().filter(|c| c.status == status).count()
            };
            let note = match (&server.error, &server.extended_audit) {
                (Some(error), _) => error.clone(),
                (None, Some(audit)) => audit.message.clone(),
                (None, None) => "-".to_string(),
            };
            ServerRow {
                name: name.clone(),
                host: format!("{}@{}", server.user, server.host),
                reachable: if server.reachable { "yes" } else { "no" }.to_string(),
                pass: count(CheckStatus::Pass),
                warn: count(CheckStatus::Warn),
                fail: count(CheckStatus::Fail),
                note,
            }
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Width::wrap(120))
        .to_string()
}

/// Findings that need attention: every warn/fail/error check
pub fn format_findings(report: &ScanReport) -> String {
    #[derive(Tabled)]
    struct FindingRow {
        #[tabled(rename = "SERVER")]
        server: String,
        #[tabled(rename = "CHECK")]
        check: String,
        #[tabled(rename = "STATUS")]
        status: String,
        #[tabled(rename = "MESSAGE")]
        message: String,
    }

    let rows: Vec<FindingRow> = report
        .servers
        .iter()
        .flat_map(|(name, server)| {
            server.checks.iter().filter_map(move |(check, result)| {
                matches!(
                    result.status,
                    CheckStatus::Warn | CheckStatus::Fail | CheckStatus::Error
                )
                .then(|| FindingRow {
                    server: name.clone(),
                    check: check.clone(),
                    status: result.status.to_string(),
                    message: result.message.clone(),
                })
            })
        })
        .collect();

    if rows.is_empty() {
        return "No issues found".to_string();
    }

    Table::new(rows)
        .with(Style::rounded())
        .with(Width::wrap(120))
        .to_string()
}

/// Network tool results table
pub fn format_network_scans(report: &ScanReport) -> String {
    if report.network_scans.is_empty() {
        return "No network scans".to_string();
    }

    #[derive(Tabled)]
    struct ScanRow {
        #[tabled(rename = "TOOL")]
        tool: String,
        #[tabled(rename = "STATUS")]
        status: String,
        #[tabled(rename = "TARGETS")]
        targets: usize,
        #[tabled(rename = "FINDINGS")]
        findings: usize,
        #[tabled(rename = "MESSAGE")]
        message: String,
    }

    let rows: Vec<ScanRow> = report
        .network_scans
        .iter()
        .map(|(tool, scan)| ScanRow {
            tool: tool.clone(),
            status: scan.status.to_string(),
            targets: scan.results.len(),
            findings: scan.findings.len(),
            message: truncate(&scan.message, 60),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Full textual rendering of a job
pub fn format_job(job: &Job) -> String {
    let mut out = format_job_line(job);
    if let Some(report) = &job.report {
        out.push_str("\n\n");
        out.push_str(&format_servers(report));
        out.push_str("\n\n");
        out.push_str(&format_findings(report));
        out.push_str("\n\n");
        out.push_str(&format_network_scans(report));
    } else if job.state == JobState::Running {
        out.push_str("\nScan in progress");
    }
    out
}

/// Truncate a string to max length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix to stderr
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow to stderr
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use hw_core::{CheckResult, JobId, NetworkScanResult, ServerReport};

    fn report() -> ScanReport {
        let mut web = ServerReport::reachable("10.0.0.5", "ubuntu");
        web.checks.insert(
            "firewall".to_string(),
            CheckResult::new(CheckStatus::Pass, "Firewall active"),
        );
        web.checks.insert(
            "disk_usage".to_string(),
            CheckResult::new(CheckStatus::Fail, "Disk nearly full"),
        );

        let mut report = ScanReport::new();
        report.servers.insert("web".to_string(), web);
        report.servers.insert(
            "db".to_string(),
            ServerReport::unreachable("10.0.0.6", "admin", "Connection refused"),
        );
        report
            .network_scans
            .insert("nmap".to_string(), NetworkScanResult::not_applicable("Nmap not installed"));
        report
    }

    #[test]
    fn test_format_servers() {
        let table = format_servers(&report());
        assert!(table.contains("ubuntu@10.0.0.5"));
        assert!(table.contains("Connection refused"));
        assert!(table.contains("REACHABLE"));
    }

    #[test]
    fn test_format_findings_only_lists_problems() {
        let table = format_findings(&report());
        assert!(table.contains("Disk nearly full"));
        assert!(!table.contains("Firewall active"));
        assert_eq!(format_findings(&ScanReport::new()), "No issues found");
    }

    #[test]
    fn test_format_job() {
        let mut job = Job::new(JobId::new("abc"));
        assert!(format_job(&job).contains("Scan in progress"));

        job.fail("worker panicked", Some(report()));
        let text = format_job(&job);
        assert!(text.starts_with("Job abc: errored (0%) - worker panicked"));
        assert!(text.contains("Nmap not installed"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer message", 10), "a much ...");
    }
}
