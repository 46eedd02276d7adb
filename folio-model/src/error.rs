//! Error types for the content model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by constructors and validators.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Block type name outside the fixed enumeration.
    #[error("unknown block type: {0}")]
    UnknownBlockType(String),

    /// A block payload holds a value outside its allowed range.
    #[error("invalid {block_type} payload: {reason}")]
    InvalidPayload {
        block_type: &'static str,
        reason: String,
    },

    /// The block tree breaks a structural rule (nesting, depth).
    #[error("invalid block tree: {0}")]
    InvalidTree(String),

    /// Malformed identifier.
    #[error(transparent)]
    InvalidId(#[from] folio_types::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
