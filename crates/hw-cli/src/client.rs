//! HTTP client for the scan server API

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use hw_core::api::{ErrorBody, ReportCreated, ReportRequest, ScanAccepted, ScanRequest};
use hw_core::{Job, JobId};

/// Errors talking to the scan server
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server could not be reached or the response was unreadable
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status
    #[error("Server returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl ClientError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport { .. } => None,
        }
    }
}

/// Client for one scan server
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(url: &str, response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        tracing::debug!("{} answered {}: {}", url, status, message);
        Err(ClientError::Api { status, message })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        let transport = |source| ClientError::Transport {
            url: url.clone(),
            source,
        };
        let response = self.http.get(&url).send().await.map_err(transport)?;
        Self::check(&url, response)
            .await?
            .json()
            .await
            .map_err(transport)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let transport = |source| ClientError::Transport {
            url: url.clone(),
            source,
        };
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        Self::check(&url, response)
            .await?
            .json()
            .await
            .map_err(transport)
    }

    /// Whether the server answers its health endpoint
    pub async fn health(&self) -> Result<(), ClientError> {
        let _: serde_json::Value = self.get("/api/health").await?;
        Ok(())
    }

    /// Submit a scan
    pub async fn submit(&self, request: &ScanRequest) -> Result<JobId, ClientError> {
        let accepted: ScanAccepted = self.post("/api/scan", request).await?;
        Ok(accepted.job_id)
    }

    /// Current record of a job
    pub async fn status(&self, job_id: &JobId) -> Result<Job, ClientError> {
        self.get(&format!("/api/scan/{}/status", job_id)).await
    }

    /// Render a terminal job's report; returns the artifact name
    pub async fn generate_report(&self, job_id: &JobId) -> Result<String, ClientError> {
        let request = ReportRequest {
            job_id: job_id.clone(),
        };
        let created: ReportCreated = self.post("/api/report/generate", &request).await?;
        Ok(created.filename)
    }

    /// Contents of a report artifact
    pub async fn download_report(&self, filename: &str) -> Result<Vec<u8>, ClientError> {
        let url = self.url(&format!("/api/report/download/{}", filename));
        let transport = |source| ClientError::Transport {
            url: url.clone(),
            source,
        };
        let response = self.http.get(&url).send().await.map_err(transport)?;
        let bytes = Self::check(&url, response)
            .await?
            .bytes()
            .await
            .map_err(transport)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/api/health", get(|| async { Json(json!({"status": "ok"})) }))
            .route(
                "/api/scan",
                post(|Json(body): Json<serde_json::Value>| async move {
                    if body["servers"].as_array().map_or(true, |s| s.is_empty()) {
                        return Err((
                            AxumStatus::BAD_REQUEST,
                            Json(json!({"error": "At least one server required"})),
                        ));
                    }
                    Ok(Json(json!({"jobId": "job-1"})))
                }),
            )
            .route(
                "/api/scan/:id/status",
                get(|Path(id): Path<String>| async move {
                    Json(json!({
                        "id": id,
                        "state": "running",
                        "progress": 40,
                        "createdAt": "2026-01-01T00:00:00Z"
                    }))
                }),
            )
            .route(
                "/api/report/download/:name",
                get(|| async { (AxumStatus::NOT_FOUND, Json(json!({"error": "Report not found"}))) }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_health_and_status() {
        let client = ApiClient::new(&spawn_server().await);
        assert!(!client.base_url().ends_with('/'));
        client.health().await.unwrap();

        let job = client.status(&JobId::new("job-1")).await.unwrap();
        assert_eq!(job.progress, 40);
        assert!(!job.state.is_terminal());
    }

    #[tokio::test]
    async fn test_api_error_carries_message() {
        let client = ApiClient::new(&spawn_server().await);
        let request: ScanRequest = serde_json::from_value(json!({"servers": []})).unwrap();

        let err = client.submit(&request).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            err.to_string(),
            "Server returned 400 Bad Request: At least one server required"
        );

        let err = client.download_report("missing.html").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let client = ApiClient::new("http://127.0.0.1:1");
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
        assert_eq!(err.status(), None);
    }
}
