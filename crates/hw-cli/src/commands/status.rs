//! Status command implementation

use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;

use crate::client::ApiClient;
use crate::output::{format_job, print_error, print_info};
use hw_core::{Job, JobId};

/// Execute the status command
pub async fn status_command(client: &ApiClient, job_id: &str) -> Result<()> {
    let job = match client.status(&JobId::new(job_id)).await {
        Ok(job) => job,
        Err(e) => {
            if e.status() == Some(StatusCode::NOT_FOUND) {
                print_error(&format!("Unknown job: {}", job_id));
            } else {
                print_error(&format!("Failed to get job status: {}", e));
                print_error("Is the server running? Try: hostwarden serve");
            }
            return Err(e.into());
        }
    };

    println!("{}", format_job(&job));
    Ok(())
}

/// Poll a job until it reaches a terminal state
///
/// Prints each progress change unless `quiet`.
pub async fn wait_for_job(
    client: &ApiClient,
    job_id: &JobId,
    interval: Duration,
    quiet: bool,
) -> Result<Job> {
    let mut last = None;
    loop {
        let job = client.status(job_id).await?;
        if !quiet && last != Some(job.progress) {
            print_info(&format!("Progress: {}%", job.progress));
            last = Some(job.progress);
        }
        if job.state.is_terminal() {
            return Ok(job);
        }
        tokio::time::sleep(interval).await;
    }
}
