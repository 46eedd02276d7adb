//! HTTP API of the Folio development server.
//!
//! Every collection lives in memory and is served at
//! `/api/collections/{name}` with the verbs and response envelope of the
//! admin API, so `HttpCollection` and the reconciler can run against it.

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use folio_model::{CollectionSchema, Entity};
use folio_sync::{Envelope, InMemoryCollection, RemoteCollection, ReorderRequest, SyncError, SyncResult};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path as FsPath;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Route prefix of every collection.
pub const API_PREFIX: &str = "/api/collections";

/// The schema of `name` as served here: preset fields, if `name` is a preset,
/// under [`API_PREFIX`].
pub fn collection_schema(name: &str) -> CollectionSchema {
    let fields = CollectionSchema::preset(name)
        .map(|preset| preset.fields)
        .unwrap_or_default();
    CollectionSchema {
        name: name.to_string(),
        path: format!("{API_PREFIX}/{name}"),
        fields,
    }
}

struct Collection {
    schema: CollectionSchema,
    store: InMemoryCollection,
}

impl Collection {
    fn new(name: &str, items: Vec<Entity>) -> Self {
        Self {
            schema: collection_schema(name),
            store: InMemoryCollection::with_items(format!("{name}-"), items),
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.store.items().iter().any(|item| item.id == id)
    }
}

/// Collections served by one router.
#[derive(Default)]
pub struct AppState {
    collections: BTreeMap<String, Collection>,
}

impl AppState {
    /// Every preset collection, empty.
    pub fn with_presets() -> Self {
        let mut state = Self::default();
        for schema in CollectionSchema::presets() {
            state.insert(&schema.name, Vec::new());
        }
        state
    }

    /// Presets plus the records of `seed`, an object mapping collection
    /// names to arrays of records. Unknown names become schemaless
    /// collections.
    pub fn from_seed(seed: &Value) -> SyncResult<Self> {
        let Some(collections) = seed.as_object() else {
            return Err(SyncError::InvalidRecord(
                "seed must map collection names to arrays of records".into(),
            ));
        };
        let mut state = Self::with_presets();
        for (name, records) in collections {
            let Some(records) = records.as_array() else {
                return Err(SyncError::InvalidRecord(format!(
                    "seed collection {name} is not an array"
                )));
            };
            let items = records
                .iter()
                .cloned()
                .map(Entity::from_record)
                .collect::<Result<Vec<_>, _>>()?;
            debug!(collection = %name, count = items.len(), "seeded");
            state.insert(name, items);
        }
        Ok(state)
    }

    /// Reads a seed file, see [`AppState::from_seed`].
    pub fn from_seed_file(path: &FsPath) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        let seed: Value = serde_json::from_str(&raw).context("Seed file is not valid JSON")?;
        Ok(Self::from_seed(&seed)?)
    }

    /// Adds or replaces collection `name`.
    pub fn insert(&mut self, name: &str, items: Vec<Entity>) {
        self.collections
            .insert(name.to_string(), Collection::new(name, items));
    }

    pub fn names(&self) -> Vec<&str> {
        self.collections.keys().map(String::as_str).collect()
    }

    /// Current records of `name`, in order.
    pub fn items(&self, name: &str) -> Option<Vec<Entity>> {
        self.collections.get(name).map(|c| c.store.items())
    }

    fn collection(&self, name: &str) -> Result<&Collection, ApiError> {
        self.collections
            .get(name)
            .ok_or_else(|| ApiError::not_found(format!("Unknown collection: {name}")))
    }
}

// ── Responses ───────────────────────────────────────────────────

type Reply = (StatusCode, Json<Envelope<Value>>);

/// An error rendered as a failed envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: &'static str,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            code: "NOT_FOUND",
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            code: "BAD_REQUEST",
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Remote { message } => Self::bad_request(message),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: other.to_string(),
                code: "INTERNAL",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, message = %self.message, "request failed");
        let body = Envelope::<Value>::error(self.message, self.code);
        (self.status, Json(body)).into_response()
    }
}

fn reply<T: Serialize>(status: StatusCode, data: T) -> Result<Reply, ApiError> {
    let value = serde_json::to_value(data).map_err(SyncError::from)?;
    Ok((status, Json(Envelope::ok(value))))
}

fn done() -> Result<Reply, ApiError> {
    Ok((StatusCode::OK, Json(Envelope::done())))
}

// ── Handlers ────────────────────────────────────────────────────

async fn health(State(state): State<Arc<AppState>>) -> Result<Reply, ApiError> {
    reply(
        StatusCode::OK,
        json!({ "status": "ok", "collections": state.names() }),
    )
}

async fn list_items(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Reply, ApiError> {
    let collection = state.collection(&name)?;
    reply(StatusCode::OK, collection.store.list().await?)
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<Reply, ApiError> {
    let collection = state.collection(&name)?;
    let fields = body
        .as_object()
        .ok_or_else(|| ApiError::bad_request("Request body must be a JSON object"))?;
    let created = collection
        .store
        .create(collection.schema.filter_fields(fields))
        .await?;
    info!(collection = %name, id = %created.id, "created");
    reply(StatusCode::CREATED, created)
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    Path((name, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Reply, ApiError> {
    let collection = state.collection(&name)?;
    if !collection.contains(&id) {
        return Err(ApiError::not_found(format!("Item not found: {id}")));
    }
    let fields = body
        .as_object()
        .ok_or_else(|| ApiError::bad_request("Request body must be a JSON object"))?;
    let updated = collection
        .store
        .update(&id, collection.schema.filter_fields(fields))
        .await?;
    info!(collection = %name, %id, "updated");
    reply(StatusCode::OK, updated)
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Reply, ApiError> {
    let collection = state.collection(&name)?;
    if !collection.contains(&id) {
        return Err(ApiError::not_found(format!("Item not found: {id}")));
    }
    collection.store.delete(&id).await?;
    info!(collection = %name, %id, "deleted");
    done()
}

async fn reorder_item(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<ReorderRequest>,
) -> Result<Reply, ApiError> {
    let collection = state.collection(&name)?;
    if !collection.contains(&request.id) {
        return Err(ApiError::not_found(format!("Item not found: {}", request.id)));
    }
    collection
        .store
        .reorder(&request.id, request.new_order)
        .await?;
    info!(collection = %name, id = %request.id, order = request.new_order, "reordered");
    done()
}

/// Build the HTTP API router over `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/collections/{name}", get(list_items).post(create_item))
        .route("/api/collections/{name}/reorder", put(reorder_item))
        .route(
            "/api/collections/{name}/{id}",
            put(update_item).delete(delete_item),
        )
        .with_state(state)
}
