use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use hw_core::api::{ReportCreated, ReportRequest, ScanAccepted, ScanRequest};
use hw_core::{Job, JobId};

use super::error::ApiError;
use crate::state::ServerState;

#[derive(serde::Serialize)]
pub struct Health {
    status: &'static str,
}

pub async fn submit_scan(
    State(state): State<ServerState>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanAccepted>, ApiError> {
    let job_id = state.jobs.submit(request.servers, request.options)?;
    Ok(Json(ScanAccepted { job_id }))
}

pub async fn scan_status(
    State(state): State<ServerState>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    state
        .jobs
        .status(&JobId::new(job_id))
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))
}

pub async fn generate_report(
    State(state): State<ServerState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ReportCreated>, ApiError> {
    let filename = state.reports.generate(&request.job_id).await?;
    Ok(Json(ReportCreated { filename }))
}

pub async fn download_report(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let body = state.reports.read(&filename).await?;
    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}
