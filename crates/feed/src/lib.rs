//! Call sources for the dispatch console.
//!
//! A [`CallFeed`] supplies the one-shot list of calls and the live event
//! subscription. [`HttpFeed`] talks to the dispatch backend; [`ScriptedFeed`]
//! replays a TOML script.

mod client;
mod health;
mod retry;
mod scripted;
mod source;
mod sse;

pub use client::{CALLS_PATH, EVENTS_PATH, HEALTH_PATH, HttpFeed};
pub use health::{HealthCheck, HealthCheckResult, HealthStatus};
pub use retry::{RetryConfig, fetch_with_retry, is_retryable_error};
pub use scripted::{Script, ScriptStep, ScriptedFeed};
pub use source::{CallFeed, FeedStream};
pub use sse::decode_events;

use std::path::Path;
use std::sync::Arc;

use dispatch_core::{FeedConfig, Result};

/// A feed that can also report its health
pub trait ConsoleFeed: CallFeed + HealthCheck {}

impl<T: CallFeed + HealthCheck> ConsoleFeed for T {}

/// Pick the feed for a run: a script when one is given, the backend otherwise
pub fn open_feed(config: &FeedConfig, script: Option<&Path>) -> Result<Arc<dyn ConsoleFeed>> {
    match script {
        Some(path) => {
            tracing::info!(path = %path.display(), "using scripted feed");
            Ok(Arc::new(ScriptedFeed::from_file(path)?))
        }
        None => {
            tracing::info!(base_url = %config.base_url, "using dispatch backend");
            Ok(Arc::new(HttpFeed::from_config(config)))
        }
    }
}
