//! HTTP remote collection.
//!
//! Talks to the admin REST API: one collection per [`CollectionSchema`],
//! every response wrapped in an [`Envelope`].

use crate::error::{SyncError, SyncResult};
use crate::remote::{Envelope, Fields, RemoteCollection, ReorderRequest};
use async_trait::async_trait;
use folio_model::{CollectionSchema, Entity};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Where the admin API lives and how to reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Origin of the API, e.g. `https://cms.example.ac.kr`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Sent as `Authorization: Bearer ...` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
            bearer_token: None,
        }
    }
}

/// A [`RemoteCollection`] reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCollection {
    config: HttpConfig,
    schema: CollectionSchema,
    client: Client,
}

impl HttpCollection {
    pub fn new(schema: CollectionSchema, config: HttpConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SyncError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            config,
            schema,
            client,
        })
    }

    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }

    fn collection_url(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            self.schema.path
        )
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), urlencoding::encode(id))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> SyncResult<Option<T>> {
        let request = match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SyncError::Timeout
            } else {
                SyncError::Network(e.to_string())
            }
        })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Network(format!("failed to read response: {e}")))?;

        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) if status.is_success() => envelope.into_result(),
            Ok(envelope) => {
                warn!(collection = %self.schema.name, %status, "remote call failed");
                Err(SyncError::remote(
                    envelope.message.unwrap_or_else(|| format!("HTTP {status}")),
                ))
            }
            Err(_) if !status.is_success() => Err(SyncError::remote(format!("HTTP {status}"))),
            Err(e) => Err(SyncError::Serialization(e)),
        }
    }

    fn payload(&self, fields: &Fields) -> Fields {
        self.schema.filter_fields(fields)
    }
}

fn require<T>(data: Option<T>, what: &str) -> SyncResult<T> {
    data.ok_or_else(|| SyncError::InvalidRecord(format!("{what} response carried no data")))
}

#[async_trait]
impl RemoteCollection for HttpCollection {
    async fn list(&self) -> SyncResult<Vec<Entity>> {
        let url = self.collection_url();
        debug!(%url, "listing");
        let items: Vec<Entity> = require(self.send(self.client.get(&url)).await?, "list")?;
        Ok(items)
    }

    async fn create(&self, fields: Fields) -> SyncResult<Entity> {
        let request = self
            .client
            .post(self.collection_url())
            .json(&self.payload(&fields));
        require(self.send(request).await?, "create")
    }

    async fn update(&self, id: &str, fields: Fields) -> SyncResult<Entity> {
        let request = self
            .client
            .put(self.item_url(id))
            .json(&self.payload(&fields));
        require(self.send(request).await?, "update")
    }

    async fn delete(&self, id: &str) -> SyncResult<()> {
        self.send::<serde_json::Value>(self.client.delete(self.item_url(id)))
            .await?;
        Ok(())
    }

    async fn reorder(&self, id: &str, order: u32) -> SyncResult<()> {
        let body = ReorderRequest {
            id: id.to_string(),
            new_order: order,
        };
        let request = self
            .client
            .put(format!("{}/reorder", self.collection_url()))
            .json(&body);
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }
}
