//! Error types for pixel aggregation

use thiserror::Error;

/// Result type alias for aggregation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while computing a document total
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The host could not materialize a page
    #[error("Failed to load page '{page}': {reason}")]
    LoadFailure { page: String, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The host document could not be decoded
    #[error("Invalid document: {0}")]
    Document(String),

    /// The session worker has stopped
    #[error("Session is closed")]
    SessionClosed,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Document(err.to_string())
    }
}
