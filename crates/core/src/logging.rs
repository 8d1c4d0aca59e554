//! Logging setup for the dispatch binaries.
//!
//! Built on the tracing ecosystem: an [`EnvFilter`], a formatted stderr layer
//! and an optional daily-rolling JSON file layer.
//!
//! # Environment Variables
//!
//! - `DISPATCH_LOG`: Filter directive (like `RUST_LOG`), e.g., `dispatch_core=debug`
//! - `DISPATCH_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `DISPATCH_LOG_DIR`: Directory for file logs (default `~/.dispatch/logs`)
//!
//! The interactive console owns the terminal, so it turns stderr output off
//! and always logs to file:
//!
//! ```no_run
//! use dispatch_core::logging::{self, LoggingConfig};
//!
//! let _guard = logging::init_logging(Some(LoggingConfig::default().without_stderr().with_file_logging()))?;
//! # Ok::<(), dispatch_core::Error>(())
//! ```

use crate::Error;
use crate::config::LoggingConfig as ConfigLoggingConfig;
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors (default for TTY)
    #[default]
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    Compact,
}

impl LogFormat {
    /// All available log formats.
    pub const VALUES: &[LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    /// Parse a log format from a string.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    /// Get the string representation of this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter for all output.
    pub level: String,
    /// Output format for stderr.
    pub format: LogFormat,
    /// Whether events are written to stderr at all.
    pub stderr: bool,
    /// Filter for the file layer, when file logging is on.
    pub file_level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: LogFormat::default(), stderr: true, file_level: None }
    }
}

impl From<ConfigLoggingConfig> for LoggingConfig {
    fn from(config: ConfigLoggingConfig) -> Self {
        let format = LogFormat::parse_str(&config.format).unwrap_or_default();

        Self {
            level: config.level,
            format,
            stderr: true,
            file_level: if config.file.enabled { Some(config.file.level) } else { None },
        }
    }
}

impl LoggingConfig {
    /// Create a new logging config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable file logging, keeping a configured file level if there is one.
    pub fn with_file_logging(mut self) -> Self {
        if self.file_level.is_none() {
            self.file_level = Some("debug".to_string());
        }
        self
    }

    /// Silence stderr output.
    pub fn without_stderr(mut self) -> Self {
        self.stderr = false;
        self
    }

    /// Build an EnvFilter from environment variables, falling back to `level`.
    fn build_env_filter(level: &str) -> EnvFilter {
        let filter = env::var("DISPATCH_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| level.to_string());

        EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(level))
    }

    /// Detect if stderr is a TTY for pretty formatting.
    fn is_tty() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    /// Determine the appropriate format for stderr output.
    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("DISPATCH_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        if self.format == LogFormat::Pretty && !Self::is_tty() { LogFormat::Compact } else { self.format }
    }

    /// Get the log directory path.
    pub fn log_dir() -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("DISPATCH_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;

        Ok(PathBuf::from(home).join(".dispatch").join("logs"))
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the global tracing subscriber.
///
/// Returns the file writer's guard when file logging is enabled; keep it alive
/// for as long as the process logs, dropping it flushes and stops the writer.
pub fn init_logging(config: Option<LoggingConfig>) -> Result<Option<WorkerGuard>, Error> {
    let config = config.unwrap_or_default();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.stderr {
        let filter = LoggingConfig::build_env_filter(&config.level);
        let layer: BoxedLayer = match config.detect_format() {
            LogFormat::Pretty => fmt::layer()
                .pretty()
                .with_writer(io::stderr)
                .with_ansi(true)
                .with_filter(filter)
                .boxed(),
            LogFormat::Json => fmt::layer().json().with_writer(io::stderr).with_filter(filter).boxed(),
            LogFormat::Compact => fmt::layer().compact().with_writer(io::stderr).with_filter(filter).boxed(),
        };
        layers.push(layer);
    }

    let mut guard = None;
    if let Some(file_level) = &config.file_level {
        let log_dir = LoggingConfig::log_dir()?;
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "dispatch.log");
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        layers.push(
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(LoggingConfig::build_env_filter(file_level))
                .boxed(),
        );
        guard = Some(worker_guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(guard)
}

/// Shorten long payloads before they reach a log line.
pub fn truncate_for_log(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }

    let mut truncated = content.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated.push_str(&format!(" ({} total chars)", content.chars().count()));
    truncated
}
