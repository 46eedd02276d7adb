//! Error types for the sync layer.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while talking to a remote collection.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote rejected the call; `message` is its human-readable reason.
    #[error("{message}")]
    Remote { message: String },

    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote returned a record Folio cannot use.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Timeout.
    #[error("operation timed out")]
    Timeout,
}

impl SyncError {
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }
}

impl From<folio_model::ModelError> for SyncError {
    fn from(err: folio_model::ModelError) -> Self {
        Self::InvalidRecord(err.to_string())
    }
}
