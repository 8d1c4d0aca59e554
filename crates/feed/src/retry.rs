use std::time::Duration;

use crate::source::CallFeed;
use dispatch_core::{Call, Error, FeedConfig, Result};

/// Retry configuration for the initial fetch
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, initial_delay_ms: 500, max_delay_ms: 8000, backoff_multiplier: 2.0 }
    }
}

impl RetryConfig {
    /// Create from the `[feed]` section
    pub fn from_config(config: &FeedConfig) -> Self {
        Self {
            max_attempts: config.retry_count.max(1),
            initial_delay_ms: config.retry_delay_ms,
            max_delay_ms: config.request_timeout_ms.max(config.retry_delay_ms),
            backoff_multiplier: 2.0,
        }
    }

    /// A single attempt and no waiting
    pub fn none() -> Self {
        Self { max_attempts: 1, ..Default::default() }
    }

    /// Calculate delay for the given attempt (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = if attempt == 0 {
            0
        } else {
            let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32 - 1);
            delay.min(self.max_delay_ms as f64) as u64
        };

        Duration::from_millis(delay_ms)
    }

    /// Check if we should retry given the attempt number
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Check if an error is retryable
///
/// Only connection trouble is retried. Invalid call data fails the load
/// immediately; asking again would return the same records.
pub fn is_retryable_error(error: &Error) -> bool {
    error.is_transient()
}

/// Run the full fetch, retrying transport failures with backoff
pub async fn fetch_with_retry<F: CallFeed + ?Sized>(feed: &F, retry: &RetryConfig) -> Result<Vec<Call>> {
    let mut attempt = 0;
    loop {
        let delay = retry.delay_for_attempt(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match feed.fetch_all().await {
            Ok(calls) => return Ok(calls),
            Err(e) => {
                attempt += 1;
                if !is_retryable_error(&e) || !retry.should_retry(attempt) {
                    tracing::warn!(source = %feed.describe(), attempt, error = %e, "initial fetch failed");
                    return Err(e);
                }
                tracing::warn!(
                    source = %feed.describe(),
                    attempt,
                    next_delay_ms = retry.delay_for_attempt(attempt).as_millis() as u64,
                    error = %e,
                    "initial fetch failed, retrying"
                );
            }
        }
    }
}
