//! In-memory remote collection.
//!
//! Behaves like the admin API: assigns ids, appends creations at the end,
//! compacts positions on delete and shifts neighbours on reorder. Every call
//! is recorded, and failures can be scheduled per operation.

use crate::error::{SyncError, SyncResult};
use crate::remote::{Fields, RemoteCollection};
use async_trait::async_trait;
use folio_model::{move_item, position_of, reindex, remove_by_id, Entity};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// The five remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    List,
    Create,
    Update,
    Delete,
    Reorder,
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    List,
    Create { fields: Fields },
    Update { id: String, fields: Fields },
    Delete { id: String },
    Reorder { id: String, order: u32 },
}

impl RemoteCall {
    pub fn op(&self) -> RemoteOp {
        match self {
            Self::List => RemoteOp::List,
            Self::Create { .. } => RemoteOp::Create,
            Self::Update { .. } => RemoteOp::Update,
            Self::Delete { .. } => RemoteOp::Delete,
            Self::Reorder { .. } => RemoteOp::Reorder,
        }
    }

    /// True for calls that change the collection.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::List)
    }
}

#[derive(Debug, Default)]
struct Inner {
    items: Vec<Entity>,
    next_id: u64,
    calls: Vec<RemoteCall>,
    failures: Vec<(RemoteOp, String)>,
}

/// A [`RemoteCollection`] backed by a vector.
#[derive(Debug)]
pub struct InMemoryCollection {
    id_prefix: String,
    inner: Mutex<Inner>,
}

impl Default for InMemoryCollection {
    fn default() -> Self {
        Self::new("P")
    }
}

impl InMemoryCollection {
    /// Empty collection assigning ids `{id_prefix}1`, `{id_prefix}2`, ...
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Collection pre-filled with `items`, kept in their given sequence.
    pub fn with_items(id_prefix: impl Into<String>, mut items: Vec<Entity>) -> Self {
        reindex(&mut items);
        let collection = Self::new(id_prefix);
        {
            let mut inner = collection.lock();
            inner.next_id = items.len() as u64;
            inner.items = items;
        }
        collection
    }

    /// Current records, bypassing call recording.
    pub fn items(&self) -> Vec<Entity> {
        self.lock().items.clone()
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.lock().calls.clone()
    }

    /// Calls that changed the collection.
    pub fn writes(&self) -> Vec<RemoteCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.is_write())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Makes the next `op` call fail with `message`.
    pub fn fail_next(&self, op: RemoteOp, message: impl Into<String>) {
        self.lock().failures.push((op, message.into()));
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `call` and returns the state, or the scheduled failure.
    fn begin(&self, call: RemoteCall) -> SyncResult<MutexGuard<'_, Inner>> {
        let mut inner = self.lock();
        let op = call.op();
        inner.calls.push(call);
        if let Some(idx) = inner.failures.iter().position(|(failing, _)| *failing == op) {
            let (_, message) = inner.failures.remove(idx);
            debug!(?op, %message, "injected failure");
            return Err(SyncError::remote(message));
        }
        Ok(inner)
    }
}

fn not_found(id: &str) -> SyncError {
    SyncError::remote(format!("Item not found: {id}"))
}

#[async_trait]
impl RemoteCollection for InMemoryCollection {
    async fn list(&self) -> SyncResult<Vec<Entity>> {
        let inner = self.begin(RemoteCall::List)?;
        Ok(inner.items.clone())
    }

    async fn create(&self, fields: Fields) -> SyncResult<Entity> {
        let mut inner = self.begin(RemoteCall::Create {
            fields: fields.clone(),
        })?;
        inner.next_id += 1;
        let entity = Entity {
            id: format!("{}{}", self.id_prefix, inner.next_id),
            order: inner.items.len() as u32,
            fields,
        };
        inner.items.push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: &str, fields: Fields) -> SyncResult<Entity> {
        let mut inner = self.begin(RemoteCall::Update {
            id: id.to_string(),
            fields: fields.clone(),
        })?;
        let idx = position_of(&inner.items, id).ok_or_else(|| not_found(id))?;
        let item = &mut inner.items[idx];
        item.fields.extend(fields);
        Ok(item.clone())
    }

    async fn delete(&self, id: &str) -> SyncResult<()> {
        let mut inner = self.begin(RemoteCall::Delete { id: id.to_string() })?;
        remove_by_id(&mut inner.items, id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    async fn reorder(&self, id: &str, order: u32) -> SyncResult<()> {
        let mut inner = self.begin(RemoteCall::Reorder {
            id: id.to_string(),
            order,
        })?;
        if move_item(&mut inner.items, id, order as usize) {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}
