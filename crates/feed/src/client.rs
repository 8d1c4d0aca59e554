use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::source::{CallFeed, FeedStream};
use crate::sse::decode_events;
use dispatch_core::{Call, Error, FeedConfig, Result};

/// Calls endpoint, relative to the base URL
pub const CALLS_PATH: &str = "/api/calls";
/// Push-event endpoint
pub const EVENTS_PATH: &str = "/api/events";
/// Connectivity probe
pub const HEALTH_PATH: &str = "/api/health";

/// Dispatch backend reached over HTTP
///
/// `fetch_all` reads the call list with a bounded timeout. `subscribe` holds a
/// long-lived `text/event-stream` response open, so it carries no timeout of
/// its own and ends only on cancel, server close or a read error.
pub struct HttpFeed {
    client: HttpClient,
    base_url: String,
    timeout: Duration,
}

impl HttpFeed {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self { client: HttpClient::new(), base_url, timeout }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(&config.base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub(crate) fn transport(context: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Transport(format!("{} timed out", context))
    } else {
        Error::Transport(format!("{} failed: {}", context, err))
    }
}

#[async_trait]
impl CallFeed for HttpFeed {
    async fn fetch_all(&self) -> Result<Vec<Call>> {
        let url = self.url(CALLS_PATH);
        tracing::debug!(url = %url, "fetching calls");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport("call fetch", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("call fetch returned {} - {}", status, body.trim())));
        }

        let body = response.text().await.map_err(|e| transport("call fetch", e))?;
        let calls = Call::decode_list(&body)?;
        tracing::info!(count = calls.len(), "fetched calls");
        Ok(calls)
    }

    async fn subscribe(&self, cancel: CancellationToken) -> Result<FeedStream> {
        let url = self.url(EVENTS_PATH);
        tracing::debug!(url = %url, "opening event stream");

        let request = self.client.get(&url).header("Accept", "text/event-stream").send();
        let response = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(Error::Transport("event stream cancelled before connecting".to_string()));
            }
            response = request => response.map_err(|e| transport("event stream", e))?,
        };

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Transport(format!("event stream returned {}", status)));
        }

        tracing::info!(url = %url, "event stream connected");
        Ok(decode_events(response.bytes_stream(), cancel))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
