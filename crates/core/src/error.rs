use thiserror::Error;

/// Result type alias for dispatch-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the dispatch console
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Structurally invalid call data (fatal to the load that produced it)
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Push-event or fetch connection failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed payload
    #[error("parse error: {0}")]
    Parse(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether a failed operation is worth attempting again
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Io(_))
    }
}

/// Reasons a call record is rejected at initialization
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Record could not be decoded (missing required field, wrong type)
    #[error("malformed call record: {0}")]
    Malformed(String),

    /// Record has an empty identifier
    #[error("call at position {position} has an empty id")]
    EmptyId { position: usize },
}

impl ValidationError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Malformed(err.to_string())
    }
}
