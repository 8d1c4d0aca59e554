use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::health::{HealthCheck, HealthCheckResult};
use crate::source::{CallFeed, FeedStream};
use dispatch_core::{Call, Error, FeedEvent, Result};

const DEMO_SCRIPT: &str = include_str!("../scripts/demo.toml");

/// One pushed event and the pause before it
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    #[serde(default)]
    pub delay_ms: u64,
    pub event: FeedEvent,
}

impl ScriptStep {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Script file layout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// What the full fetch returns
    #[serde(default)]
    pub calls: Vec<Call>,

    /// Events pushed, in order, after subscribing
    #[serde(default)]
    pub steps: Vec<ScriptStep>,

    /// Number of leading fetches that fail with a transport error
    #[serde(default)]
    pub fetch_failures: u32,

    /// Transport error reported after the last step instead of a clean close
    #[serde(default)]
    pub stream_error: Option<String>,
}

/// Call feed replayed from a TOML script, for demos and offline runs
///
/// ```
/// use dispatch_feed::ScriptedFeed;
///
/// let feed = ScriptedFeed::from_toml_str(r#"
/// [[calls]]
/// id = "CA1"
/// priority = "P3"
/// status = "AI handling"
/// transcript = []
/// "#)?;
/// assert_eq!(feed.script().calls.len(), 1);
/// # Ok::<(), dispatch_core::Error>(())
/// ```
pub struct ScriptedFeed {
    name: String,
    script: Script,
    fetches: AtomicU32,
}

impl ScriptedFeed {
    pub fn new(name: impl Into<String>, script: Script) -> Self {
        Self { name: name.into(), script, fetches: AtomicU32::new(0) }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(Self::new("inline script", parse_script(content)?))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let script = parse_script(&content)
            .map_err(|e| Error::Parse(format!("feed script {}: {}", path.display(), e)))?;
        Ok(Self::new(path.display().to_string(), script))
    }

    /// The bundled car-accident walkthrough
    pub fn demo() -> Result<Self> {
        Ok(Self::new("demo script", parse_script(DEMO_SCRIPT)?))
    }

    pub fn script(&self) -> &Script {
        &self.script
    }
}

fn parse_script(content: &str) -> Result<Script> {
    toml::from_str(content).map_err(|e| Error::Parse(format!("invalid feed script: {}", e)))
}

#[async_trait]
impl CallFeed for ScriptedFeed {
    async fn fetch_all(&self) -> Result<Vec<Call>> {
        let attempt = self.fetches.fetch_add(1, Ordering::SeqCst);
        if attempt < self.script.fetch_failures {
            return Err(Error::Transport(format!("scripted fetch failure {}", attempt + 1)));
        }

        for (position, call) in self.script.calls.iter().enumerate() {
            call.validate(position)?;
        }
        Ok(self.script.calls.clone())
    }

    async fn subscribe(&self, cancel: CancellationToken) -> Result<FeedStream> {
        let steps = self.script.steps.clone();
        let stream_error = self.script.stream_error.clone();

        let stream = async_stream::stream! {
            for step in steps {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(step.delay()) => {}
                }
                tracing::trace!(kind = step.event.kind(), call_id = step.event.call_id(), "scripted event");
                yield Ok(step.event);
            }

            if let Some(message) = stream_error {
                yield Err(Error::Transport(message));
            }
        };

        Ok(Box::pin(stream))
    }

    fn describe(&self) -> String {
        format!("script: {}", self.name)
    }
}

#[async_trait]
impl HealthCheck for ScriptedFeed {
    async fn check_health(&self) -> Result<HealthCheckResult> {
        Ok(HealthCheckResult::healthy(0).with_message(format!("{} ({} steps)", self.describe(), self.script.steps.len())))
    }
}
