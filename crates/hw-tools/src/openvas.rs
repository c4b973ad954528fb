//! OpenVAS (openvasd) API integration
//!
//! Scans on a managed scanner are created out of band; a job only verifies
//! that the configured openvasd endpoint is up and accepts the API key.

use std::time::Duration;

use hw_core::api::OpenVasConfig;
use hw_core::NetworkScanResult;
use reqwest::Client;
use serde_json::json;

const API_KEY_HEADER: &str = "X-API-KEY";
const HEALTH_PATH: &str = "/health/ready";

/// Base URL of the openvasd API
pub fn base_url(config: &OpenVasConfig) -> String {
    let host = config.host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}:{}", host, config.port)
    }
}

/// Probe the scanner's health endpoint
pub async fn run(client: &Client, config: &OpenVasConfig, timeout: Duration) -> NetworkScanResult {
    let base = base_url(config);
    let url = format!("{}{}", base, HEALTH_PATH);
    tracing::debug!("Probing openvasd at {}", url);

    let response = client
        .get(&url)
        .header(API_KEY_HEADER, config.api_key.as_str())
        .timeout(timeout)
        .send()
        .await;

    match response {
        Ok(resp) if resp.status().is_success() => NetworkScanResult::info(
            "openvasd reachable; scan creation requires manual setup",
        )
        .with_data(json!({ "endpoint": base, "targets": config.targets })),
        Ok(resp) => NetworkScanResult::error(format!("openvasd returned {}", resp.status())),
        Err(e) => {
            tracing::warn!("openvasd at {} unreachable: {}", base, e);
            NetworkScanResult::error(format!("openvasd unreachable: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use hw_core::ToolStatus;

    async fn health(headers: HeaderMap) -> StatusCode {
        match headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
            Some("secret") => StatusCode::OK,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    async fn spawn_scanner() -> u16 {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let app = Router::new().route(HEALTH_PATH, get(health));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        port
    }

    fn config(port: u16, api_key: &str) -> OpenVasConfig {
        OpenVasConfig {
            host: "127.0.0.1".to_string(),
            port,
            api_key: api_key.to_string(),
            targets: vec!["10.0.0.0/24".to_string()],
        }
    }

    #[test]
    fn test_base_url() {
        assert_eq!(base_url(&config(9390, "")), "http://127.0.0.1:9390");

        let explicit = OpenVasConfig {
            host: "https://gvm.example.org/".to_string(),
            ..config(9390, "")
        };
        assert_eq!(base_url(&explicit), "https://gvm.example.org");
    }

    #[tokio::test]
    async fn test_healthy_scanner() {
        let port = spawn_scanner().await;
        let result = run(&Client::new(), &config(port, "secret"), Duration::from_secs(5)).await;

        assert_eq!(result.status, ToolStatus::Info);
        assert_eq!(result.data.unwrap()["targets"][0], "10.0.0.0/24");
    }

    #[tokio::test]
    async fn test_rejected_key() {
        let port = spawn_scanner().await;
        let result = run(&Client::new(), &config(port, "wrong"), Duration::from_secs(5)).await;

        assert_eq!(result.status, ToolStatus::Error);
        assert!(result.message.contains("401"));
    }

    #[tokio::test]
    async fn test_unreachable_scanner() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = run(&Client::new(), &config(port, "secret"), Duration::from_secs(5)).await;
        assert_eq!(result.status, ToolStatus::Error);
        assert!(result.message.starts_with("openvasd unreachable"));
    }
}
