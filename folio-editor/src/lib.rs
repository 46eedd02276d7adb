//! Client-side editing of Folio block documents.
//!
//! [`BlockTreeEditor`] owns a document's top-level block list, keeps it
//! contiguously ordered and records a bounded undo history. Layout
//! containers are edited through the pure functions in [`container`], which
//! the editor also exposes so container edits join the history. A
//! [`Propagator`] debounces changed documents towards whoever persists them.

pub mod container;
pub mod drag;
mod editor;
mod error;
pub mod history;
mod propagate;
pub mod rows;

pub use drag::{ContainerKind, SlotDrag, SlotRef};
pub use editor::{BlockTreeEditor, EditorConfig};
pub use error::{EditorError, EditorResult};
pub use history::{History, DEFAULT_HISTORY_LIMIT};
pub use propagate::{DocumentSink, Propagator, DEFAULT_PROPAGATION_DELAY};
