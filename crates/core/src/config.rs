use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    /// Base URL of the dispatch API (without the `/api` suffix)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for one-shot requests (full fetch, health)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Attempts for the initial fetch before reporting a load failure
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Delay before the second attempt; later attempts back off exponentially
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5001".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl FeedConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Console behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Pause between two revealed transcript messages
    #[serde(default = "default_reveal_interval_ms")]
    pub reveal_interval_ms: u64,

    /// How often the terminal is polled for key presses
    #[serde(default = "default_input_poll_ms")]
    pub input_poll_ms: u64,
}

fn default_reveal_interval_ms() -> u64 {
    320
}

fn default_input_poll_ms() -> u64 {
    100
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self { reveal_interval_ms: default_reveal_interval_ms(), input_poll_ms: default_input_poll_ms() }
    }
}

impl ConsoleConfig {
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }

    pub fn input_poll(&self) -> Duration {
        Duration::from_millis(self.input_poll_ms)
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter for stderr output
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty`, `json` or `compact`
    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default)]
    pub file: FileLoggingConfig,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format(), file: FileLoggingConfig::default() }
    }
}

/// `[logging.file]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_file_log_level")]
    pub level: String,
}

fn default_file_log_level() -> String {
    "debug".to_string()
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: default_file_log_level() }
    }
}

/// Root configuration structure for dispatch.toml
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub console: ConsoleConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).map_err(|e| crate::Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        use crate::Error;

        let base_url = self.feed.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::Config(ConfigError::InvalidBaseUrl(self.feed.base_url.clone()).to_string()));
        }
        if self.feed.request_timeout_ms == 0 {
            return Err(Error::Config(ConfigError::ZeroDuration("feed.request_timeout_ms").to_string()));
        }
        if self.console.reveal_interval_ms == 0 {
            return Err(Error::Config(ConfigError::ZeroDuration("console.reveal_interval_ms").to_string()));
        }
        if self.console.input_poll_ms == 0 {
            return Err(Error::Config(ConfigError::ZeroDuration("console.input_poll_ms").to_string()));
        }

        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# Dispatch console configuration

[feed]
# Dispatch API root; the console reads /api/calls and /api/events below it
base_url = "http://127.0.0.1:5001"
# Timeout for the initial fetch and health checks
request_timeout_ms = 10000
# Attempts for the initial fetch before showing a load failure
retry_count = 3
retry_delay_ms = 500

[console]
# Pause between two revealed transcript messages
reveal_interval_ms = 320
input_poll_ms = 100

[logging]
# Filter for stderr output (overridden by DISPATCH_LOG)
level = "warn"
# "pretty", "json" or "compact"
format = "pretty"

[logging.file]
# Daily-rolling JSON logs under ~/.dispatch/logs (always on for the console)
enabled = false
level = "debug"
"#
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Feed URL is not an http(s) URL
    #[error("invalid feed base_url: {0}")]
    InvalidBaseUrl(String),

    /// Interval or timeout set to zero
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.feed.base_url, "http://127.0.0.1:5001");
        assert_eq!(config.console.reveal_interval(), Duration::from_millis(320));
        assert_eq!(config.logging.level, "warn");
        assert!(!config.logging.file.enabled);
    }

    #[test]
    fn test_example_parses_to_defaults() {
        let config = Config::from_toml_str(Config::example()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
[feed]
base_url = "https://dispatch.example.org"

[console]
reveal_interval_ms = 150
"#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.feed.base_url, "https://dispatch.example.org");
        assert_eq!(config.feed.retry_count, 3);
        assert_eq!(config.console.reveal_interval_ms, 150);
        assert_eq!(config.console.input_poll_ms, 100);
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = Config::from_toml_str("[feed]\nbase_url = \"ftp://x\"\n").unwrap_err();
        assert!(err.to_string().contains("invalid feed base_url"));
    }

    #[test]
    fn test_rejects_zero_reveal_interval() {
        let err = Config::from_toml_str("[console]\nreveal_interval_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("console.reveal_interval_ms"));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = Config::from_toml_str("[feed]\nurl = \"http://x\"\n").unwrap_err();
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"\nformat = \"json\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/dispatch.toml")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
