//! Core identifier types for Folio.
//!
//! Two populations of ids flow through the editor and the sync layer:
//! - persisted ids, opaque strings assigned by the remote store
//! - temporary ids (`temp_...`), generated locally for records that have not
//!   been created remotely yet
//!
//! Block ids (`block-...`) are generated locally and are persisted verbatim
//! inside the owning document.

mod ids;

pub use ids::{
    generate_block_id, is_temp_id, validate_id, IdGenerator, IdKind, SequentialIdGenerator,
    SessionIdGenerator, BLOCK_ID_PREFIX, TEMP_ID_PREFIX,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in id handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid id: {0:?}")]
    InvalidId(String),
}
