//! Scan command: submit a targets file and follow the job

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::client::ApiClient;
use crate::commands::wait_for_job;
use crate::output::{format_job, print_info, print_success};
use crate::targets::{load_targets, TargetList};
use hw_core::api::{ScanOptions, ScanRequest};
use hw_core::JobState;

/// Arguments of `hostwarden scan`
#[derive(Debug, Clone, Default)]
pub struct ScanArgs {
    pub targets: PathBuf,
    /// Explicit check/tool names; only honoured with `no_auto`
    pub tests: Vec<String>,
    /// Web endpoints, overriding the targets file's
    pub urls: Vec<String>,
    pub subnet: Option<String>,
    pub no_auto: bool,
    pub no_wait: bool,
}

/// Merge a targets file with command-line options
pub fn build_request(list: TargetList, args: &ScanArgs) -> ScanRequest {
    let urls = if args.urls.is_empty() { list.urls } else { args.urls.clone() };

    ScanRequest {
        servers: list.servers,
        options: ScanOptions {
            auto_mode: !args.no_auto,
            tests: (!args.tests.is_empty()).then(|| args.tests.clone()),
            urls: (!urls.is_empty()).then_some(urls),
            subnet: args.subnet.clone().or(list.subnet),
            tool_config: None,
        },
    }
}

/// Execute the scan command
pub async fn scan_command(
    client: &ApiClient,
    args: ScanArgs,
    poll_interval: Duration,
    quiet: bool,
) -> Result<()> {
    let list = load_targets(&args.targets)
        .with_context(|| format!("Failed to load targets from {:?}", args.targets))?;
    let request = build_request(list, &args);
    let count = request.servers.len();

    let job_id = client.submit(&request).await.context("Scan submission failed")?;
    print_success(&format!("Submitted scan of {} server(s): job {}", count, job_id));

    if args.no_wait {
        print_info(&format!("Check progress with: hostwarden status {}", job_id));
        return Ok(());
    }

    let job = wait_for_job(client, &job_id, poll_interval, quiet).await?;
    println!("{}", format_job(&job));

    if job.state == JobState::Errored {
        bail!("Scan {} failed", job_id);
    }
    print_info(&format!("Generate a report with: hostwarden report {}", job_id));
    Ok(())
}
