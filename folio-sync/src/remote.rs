//! The remote collection contract.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use folio_model::Entity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Record fields without `id` and `order`.
pub type Fields = Map<String, Value>;

/// A remote, persisted, ordered collection of entities.
///
/// Every call is awaited to completion before the next one is issued; no
/// implementation needs to handle concurrent calls from one reconciler.
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// All records, in remote order.
    async fn list(&self) -> SyncResult<Vec<Entity>>;

    /// Creates a record. The remote assigns `id` and `order`.
    async fn create(&self, fields: Fields) -> SyncResult<Entity>;

    async fn update(&self, id: &str, fields: Fields) -> SyncResult<Entity>;

    async fn delete(&self, id: &str) -> SyncResult<()>;

    /// Moves a record to position `order`.
    async fn reorder(&self, id: &str, order: u32) -> SyncResult<()>;
}

#[async_trait]
impl<'a, R: RemoteCollection + ?Sized> RemoteCollection for &'a R {
    async fn list(&self) -> SyncResult<Vec<Entity>> {
        (**self).list().await
    }

    async fn create(&self, fields: Fields) -> SyncResult<Entity> {
        (**self).create(fields).await
    }

    async fn update(&self, id: &str, fields: Fields) -> SyncResult<Entity> {
        (**self).update(id, fields).await
    }

    async fn delete(&self, id: &str) -> SyncResult<()> {
        (**self).delete(id).await
    }

    async fn reorder(&self, id: &str, order: u32) -> SyncResult<()> {
        (**self).reorder(id, order).await
    }
}

/// Uniform response body of the admin API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            code: None,
        }
    }

    /// A successful response without payload.
    pub fn done() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            code: None,
        }
    }

    pub fn error(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            code: Some(code.into()),
        }
    }

    /// The payload of a successful response, or the remote's message.
    pub fn into_result(self) -> SyncResult<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            Err(SyncError::remote(
                self.message
                    .unwrap_or_else(|| "request failed".to_string()),
            ))
        }
    }
}

/// Body of a reorder call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub id: String,
    pub new_order: u32,
}
