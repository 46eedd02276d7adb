//! Saving edited collections back to the Folio admin API.
//!
//! A [`Reconciler`] keeps the last remote-equal snapshot of a collection
//! next to its locally edited copy ([`DirtyState`]). Saving diffs the two
//! into a [`SyncPlan`] and replays it against a [`RemoteCollection`] in a
//! fixed order: deletes, creates, updates, reorders. [`HttpCollection`]
//! speaks the admin REST API; [`InMemoryCollection`] behaves like it and
//! records every call.

mod diff;
mod dirty;
mod error;
mod http;
mod memory;
mod reconciler;
mod remote;

pub use diff::{count_changes, deep_equal, fields_equal, SyncPlan};
pub use dirty::DirtyState;
pub use error::{SyncError, SyncResult};
pub use http::{HttpCollection, HttpConfig};
pub use memory::{InMemoryCollection, RemoteCall, RemoteOp};
pub use reconciler::{synchronize, synchronize_with, IdMapping, Reconciler, SyncConfig, SyncReport};
pub use remote::{Envelope, Fields, RemoteCollection, ReorderRequest};
