//! Report command: render a finished job and download the artifact

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::client::ApiClient;
use crate::output::print_success;
use hw_core::JobId;

/// Generate the report for `job_id` and save it under `output_dir`
pub async fn report_command(client: &ApiClient, job_id: &str, output_dir: &Path) -> Result<PathBuf> {
    let filename = client
        .generate_report(&JobId::new(job_id))
        .await
        .with_context(|| format!("Failed to generate report for job {}", job_id))?;
    let body = client
        .download_report(&filename)
        .await
        .with_context(|| format!("Failed to download {}", filename))?;

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {:?}", output_dir))?;
    let path = output_dir.join(&filename);
    tokio::fs::write(&path, body)
        .await
        .with_context(|| format!("Failed to write {:?}", path))?;

    print_success(&format!("Report saved to {}", path.display()));
    Ok(path)
}
