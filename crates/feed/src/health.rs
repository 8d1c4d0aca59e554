use async_trait::async_trait;
use serde::Deserialize;
use std::time::Instant;

use crate::client::{HEALTH_PATH, HttpFeed, transport};
use dispatch_core::{Error, Result};

/// Health check result
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub latency_ms: u64,
    pub error: Option<String>,
    /// Message the backend attached to its answer
    pub message: Option<String>,
}

impl HealthCheckResult {
    pub fn healthy(latency_ms: u64) -> Self {
        Self { healthy: true, latency_ms, error: None, message: None }
    }

    pub fn unhealthy(error: String) -> Self {
        Self { healthy: false, latency_ms: 0, error: Some(error), message: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Body of the backend's health endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Health check trait for call feeds
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check_health(&self) -> Result<HealthCheckResult>;
}

#[async_trait]
impl HealthCheck for HttpFeed {
    /// Probe the health endpoint. Connection failures are reported as an
    /// unhealthy result rather than an error.
    async fn check_health(&self) -> Result<HealthCheckResult> {
        let start = Instant::now();

        let probe = async {
            let response = self
                .client()
                .get(self.url(HEALTH_PATH))
                .timeout(self.timeout())
                .send()
                .await
                .map_err(|e| transport("health check", e))?;

            if !response.status().is_success() {
                return Err(Error::Transport(format!("health check returned {}", response.status())));
            }

            response
                .json::<HealthStatus>()
                .await
                .map_err(|e| Error::Parse(format!("health response: {}", e)))
        };

        let outcome = probe.await;
        let latency = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(status) if status.is_ok() => {
                let result = HealthCheckResult::healthy(latency);
                Ok(match status.message {
                    Some(message) => result.with_message(message),
                    None => result,
                })
            }
            Ok(status) => Ok(HealthCheckResult::unhealthy(format!("backend reported status {:?}", status.status))),
            Err(e) => Ok(HealthCheckResult::unhealthy(format!("Health check failed: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_health_check_result_healthy() {
        let result = HealthCheckResult::healthy(100).with_message("Backend connected");
        assert!(result.healthy);
        assert_eq!(result.latency_ms, 100);
        assert!(result.error.is_none());
        assert_eq!(result.message.as_deref(), Some("Backend connected"));
    }

    #[test]
    fn test_health_check_result_unhealthy() {
        let result = HealthCheckResult::unhealthy("Connection failed".to_string());
        assert!(!result.healthy);
        assert_eq!(result.error, Some("Connection failed".to_string()));
    }

    #[test]
    fn test_health_status_parsing() {
        let status: HealthStatus = serde_json::from_str(r#"{"status": "ok", "message": "Backend connected"}"#).unwrap();
        assert!(status.is_ok());
        assert_eq!(status.message.as_deref(), Some("Backend connected"));

        let status: HealthStatus = serde_json::from_str(r#"{"status": "degraded"}"#).unwrap();
        assert!(!status.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_unhealthy() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let feed = HttpFeed::new(format!("http://{}", addr), Duration::from_secs(2));
        let result = feed.check_health().await.unwrap();
        assert!(!result.healthy);
        assert!(result.error.unwrap().contains("Health check failed"));
    }
}
