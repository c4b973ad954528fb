use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hw_core::api::ErrorBody;
use hw_core::ValidationError;

use crate::report::ReportError;

/// Failure of an API call, rendered as `{error}` with a matching status
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::BadRequest(value.to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(value: ReportError) -> Self {
        match value {
            ReportError::JobRunning | ReportError::InvalidFilename(_) => {
                ApiError::BadRequest(value.to_string())
            }
            ReportError::JobNotFound | ReportError::NotFound => ApiError::NotFound(value.to_string()),
            ReportError::Render(_) | ReportError::Io(_) => ApiError::Internal(value.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                tracing::error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}
