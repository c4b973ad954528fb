//! HTTP API

mod error;
mod handlers;

use axum::routing::{get, post};
use axum::Router;

use crate::state::ServerState;

pub use error::ApiError;

/// All API routes over `state`
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/scan", post(handlers::submit_scan))
        .route("/api/scan/:job_id/status", get(handlers::scan_status))
        .route("/api/report/generate", post(handlers::generate_report))
        .route("/api/report/download/:filename", get(handlers::download_report))
        .route("/api/health", get(handlers::health))
        .with_state(state)
}
