//! Error types for editor operations.

use folio_model::{BlockType, ModelError};
use thiserror::Error;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Policy violations raised by the editor.
///
/// Unknown ids and out-of-range slots are not errors: those operations are
/// no-ops.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A layout container was about to be placed inside another container.
    #[error("Cannot nest layout containers. Containers can only contain regular blocks.")]
    NestedContainer(BlockType),

    /// The resulting document would break a model rule.
    #[error(transparent)]
    Model(#[from] ModelError),
}
