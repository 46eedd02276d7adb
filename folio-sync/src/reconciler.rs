//! Saving a locally edited collection back to its remote.

use crate::diff::SyncPlan;
use crate::dirty::DirtyState;
use crate::error::{SyncError, SyncResult};
use crate::remote::{Fields, RemoteCollection};
use folio_model::{move_item, position_of, remove_by_id, reindex, Entity};
use folio_types::{IdGenerator, SessionIdGenerator};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for a reconciler.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Collection name, used in logs.
    pub collection: String,
    /// Timeout for each remote call (ms).
    pub call_timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            collection: "items".to_string(),
            call_timeout_ms: 30_000,
        }
    }
}

/// A temporary id and the id the remote assigned in its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdMapping {
    pub local_id: String,
    pub remote_id: String,
}

/// What one synchronization did, in call order per step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub deleted: Vec<String>,
    pub created: Vec<IdMapping>,
    pub updated: Vec<String>,
    /// Persisted ids moved, with their new position.
    pub reordered: Vec<(String, u32)>,
}

impl SyncReport {
    /// Number of remote write calls issued.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.deleted.len() + self.created.len() + self.updated.len() + self.reordered.len()
    }

    /// The persisted id that replaced `local_id`, if it was created.
    #[must_use]
    pub fn remote_id(&self, local_id: &str) -> Option<&str> {
        self.created
            .iter()
            .find(|m| m.local_id == local_id)
            .map(|m| m.remote_id.as_str())
    }
}

/// Pushes the difference between `snapshot` and `local` to `remote`.
///
/// Runs four steps in a fixed order, each call awaited before the next:
/// deletes, creates, updates, reorders. The first failure aborts the rest
/// and is returned; calls already made are not rolled back.
pub async fn synchronize<R: RemoteCollection + ?Sized>(
    remote: &R,
    snapshot: &[Entity],
    local: &[Entity],
) -> SyncResult<SyncReport> {
    synchronize_with(remote, snapshot, local, &SyncConfig::default()).await
}

/// [`synchronize`] with an explicit configuration.
pub async fn synchronize_with<R: RemoteCollection + ?Sized>(
    remote: &R,
    snapshot: &[Entity],
    local: &[Entity],
    config: &SyncConfig,
) -> SyncResult<SyncReport> {
    let mut progress = Progress::default();
    run(remote, snapshot, local, config, &mut progress).await?;
    Ok(progress.report)
}

/// Calls that succeeded so far, kept when a later one fails.
#[derive(Debug, Default)]
struct Progress {
    report: SyncReport,
    /// Records returned by the remote, parallel to `report.created`.
    created: Vec<Entity>,
}

async fn run<R: RemoteCollection + ?Sized>(
    remote: &R,
    snapshot: &[Entity],
    local: &[Entity],
    config: &SyncConfig,
    progress: &mut Progress,
) -> SyncResult<()> {
    let plan = SyncPlan::between(snapshot, local);
    let timeout = Duration::from_millis(config.call_timeout_ms);
    let collection = config.collection.as_str();

    for id in &plan.deletes {
        debug!(collection, %id, "delete");
        call(timeout, remote.delete(id)).await?;
        progress.report.deleted.push(id.clone());
    }

    let mut assigned: HashMap<&str, Entity> = HashMap::new();
    for item in &plan.creates {
        debug!(collection, id = %item.id, "create");
        let created = call(timeout, remote.create(item.fields.clone())).await?;
        progress.report.created.push(IdMapping {
            local_id: item.id.clone(),
            remote_id: created.id.clone(),
        });
        progress.created.push(created.clone());
        assigned.insert(item.id.as_str(), created);
    }

    for item in &plan.updates {
        debug!(collection, id = %item.id, "update");
        call(timeout, remote.update(&item.id, item.fields.clone())).await?;
        progress.report.updated.push(item.id.clone());
    }

    let planned: HashMap<&str, u32> = plan
        .reorders
        .iter()
        .map(|(id, order)| (id.as_str(), *order))
        .collect();
    for item in local {
        let target = match assigned.get(item.id.as_str()) {
            Some(created) if created.order != item.order => Some(created.id.as_str()),
            Some(_) => None,
            None => planned.get(item.id.as_str()).map(|_| item.id.as_str()),
        };
        if let Some(id) = target {
            debug!(collection, id, order = item.order, "reorder");
            call(timeout, remote.reorder(id, item.order)).await?;
            progress.report.reordered.push((id.to_string(), item.order));
        }
    }

    let report = &progress.report;
    info!(
        collection,
        deleted = report.deleted.len(),
        created = report.created.len(),
        updated = report.updated.len(),
        reordered = report.reordered.len(),
        "synchronized"
    );
    Ok(())
}

async fn call<T>(
    timeout: Duration,
    future: impl Future<Output = SyncResult<T>>,
) -> SyncResult<T> {
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result.inspect_err(|e| warn!(error = %e, "remote call failed")),
        Err(_) => {
            warn!(?timeout, "remote call timed out");
            Err(SyncError::Timeout)
        }
    }
}

/// Owns the snapshot/local pair of one collection and saves it.
pub struct Reconciler<R> {
    remote: R,
    state: DirtyState<Vec<Entity>>,
    ids: Box<dyn IdGenerator>,
    config: SyncConfig,
    saving: Arc<AtomicBool>,
}

/// Clears the saving flag when dropped, including when a save future is
/// dropped before it completes.
struct SavingGuard(Arc<AtomicBool>);

impl SavingGuard {
    fn start(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Release);
        Self(Arc::clone(flag))
    }
}

impl Drop for SavingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<R: RemoteCollection> Reconciler<R> {
    /// Creates a reconciler with an empty, clean state.
    pub fn new(remote: R, config: SyncConfig) -> Self {
        Self {
            remote,
            state: DirtyState::new(Vec::new()),
            ids: Box::new(SessionIdGenerator::new()),
            config,
            saving: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replaces the temporary id source.
    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    // ── State ────────────────────────────────────────────────────

    /// Fetches the remote collection and makes it both snapshot and local
    /// state. Returns the number of records.
    pub async fn load(&mut self) -> SyncResult<usize> {
        let timeout = Duration::from_millis(self.config.call_timeout_ms);
        let items = call(timeout, self.remote.list()).await?;
        let count = items.len();
        self.reset_snapshot(items);
        debug!(collection = %self.config.collection, count, "loaded");
        Ok(count)
    }

    /// Accepts `items` as remote-equal. They are sorted by `order` and
    /// reindexed so positions and `order` agree.
    pub fn reset_snapshot(&mut self, mut items: Vec<Entity>) {
        items.sort_by_key(|item| item.order);
        reindex(&mut items);
        self.state.reset_snapshot(items);
    }

    pub fn local(&self) -> &[Entity] {
        self.state.local()
    }

    pub fn snapshot(&self) -> &[Entity] {
        self.state.snapshot()
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.local().iter().find(|item| item.id == id)
    }

    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    pub fn change_count(&self) -> usize {
        self.state.change_count()
    }

    /// True while a save is in flight.
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Discards local edits.
    pub fn revert(&mut self) {
        self.state.revert();
    }

    // ── Local edits ──────────────────────────────────────────────

    /// A fresh temporary id.
    pub fn next_temp_id(&mut self) -> String {
        self.ids.temp_id()
    }

    /// Appends a new local record with a temporary id and returns the id.
    pub fn add(&mut self, fields: Fields) -> String {
        let id = self.next_temp_id();
        let items = self.state.local_mut();
        items.push(Entity {
            id: id.clone(),
            order: 0,
            fields,
        });
        reindex(items);
        id
    }

    /// Appends `item` as is (its id decides whether it is created).
    pub fn add_entity(&mut self, item: Entity) {
        let items = self.state.local_mut();
        items.push(item);
        reindex(items);
    }

    /// Edits a local record. Changes to `id` and `order` are discarded.
    pub fn update(&mut self, id: &str, edit: impl FnOnce(&mut Entity)) -> bool {
        let Some(idx) = position_of(self.local(), id) else {
            return false;
        };
        let item = &mut self.state.local_mut()[idx];
        let (id, order) = (item.id.clone(), item.order);
        edit(item);
        item.id = id;
        item.order = order;
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        if position_of(self.local(), id).is_none() {
            return false;
        }
        remove_by_id(self.state.local_mut(), id).is_some()
    }

    /// Moves a local record to `destination`; past the end appends.
    pub fn reorder(&mut self, id: &str, destination: usize) -> bool {
        if position_of(self.local(), id).is_none() {
            return false;
        }
        move_item(self.state.local_mut(), id, destination)
    }

    // ── Saving ───────────────────────────────────────────────────

    /// Synchronizes local edits, then refetches and resets the snapshot.
    ///
    /// A clean state returns an empty report without calling the remote. On
    /// failure the calls that did succeed are folded into the snapshot and
    /// created records take their remote ids locally, so a retry only sends
    /// what is still missing. The remaining edits stay dirty.
    pub async fn save(&mut self) -> SyncResult<SyncReport> {
        if !self.is_dirty() {
            debug!(collection = %self.config.collection, "nothing to save");
            return Ok(SyncReport::default());
        }
        let _saving = SavingGuard::start(&self.saving);
        self.save_inner().await
    }

    async fn save_inner(&mut self) -> SyncResult<SyncReport> {
        let mut progress = Progress::default();
        let snapshot: &[Entity] = self.state.snapshot();
        let local: &[Entity] = self.state.local();
        let synced = run(&self.remote, snapshot, local, &self.config, &mut progress).await;
        let result = match synced {
            Ok(()) => self.load().await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            self.apply_partial(&progress);
            return Err(e);
        }
        Ok(progress.report)
    }

    /// Replays the successful calls of an interrupted save onto the snapshot.
    fn apply_partial(&mut self, progress: &Progress) {
        let report = &progress.report;
        if report.operation_count() == 0 {
            return;
        }
        let mut snapshot = self.state.snapshot().clone();
        for id in &report.deleted {
            remove_by_id(&mut snapshot, id);
        }
        snapshot.extend(progress.created.iter().cloned());
        reindex(&mut snapshot);
        for id in &report.updated {
            let fields = self.get(id).map(|item| item.fields.clone());
            if let (Some(fields), Some(idx)) = (fields, position_of(&snapshot, id)) {
                snapshot[idx].fields = fields;
            }
        }
        for (id, order) in &report.reordered {
            move_item(&mut snapshot, id, *order as usize);
        }

        if !report.created.is_empty() {
            for item in self.state.local_mut() {
                if let Some(remote_id) = report.remote_id(&item.id) {
                    item.id = remote_id.to_string();
                }
            }
        }
        self.state.set_snapshot(snapshot);
        debug!(
            collection = %self.config.collection,
            applied = report.operation_count(),
            "kept partial save"
        );
    }
}

impl<R> std::fmt::Debug for Reconciler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("saving", &self.saving.load(Ordering::Acquire))
            .finish()
    }
}
