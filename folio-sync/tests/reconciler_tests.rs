use folio_model::Entity;
use folio_sync::{
    synchronize, synchronize_with, Fields, InMemoryCollection, Reconciler, RemoteCall,
    RemoteCollection, RemoteOp, SyncConfig, SyncError, SyncResult,
};
use folio_types::SequentialIdGenerator;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

fn project(id: &str, order: u32, title: &str) -> Entity {
    Entity::new(id, order).with_field("title", title)
}

fn seeded() -> InMemoryCollection {
    InMemoryCollection::with_items(
        "P",
        vec![
            project("P1", 0, "Atlas"),
            project("P2", 1, "Birch"),
            project("P3", 2, "Cinder"),
        ],
    )
}

fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

async fn loaded(remote: &InMemoryCollection) -> Reconciler<&InMemoryCollection> {
    let mut reconciler = Reconciler::new(remote, SyncConfig::default())
        .with_id_generator(SequentialIdGenerator::default());
    reconciler.load().await.unwrap();
    remote.clear_calls();
    reconciler
}

/// Shows per-call logs with `RUST_LOG=folio_sync=debug`.
fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ids(items: &[Entity]) -> Vec<&str> {
    items.iter().map(|item| item.id.as_str()).collect()
}

// ── synchronize ──────────────────────────────────────────────────

#[tokio::test]
async fn new_text_block_is_created_once() {
    let remote = InMemoryCollection::new("P");
    let local = vec![Entity::new("b1", 0)
        .with_field("type", "text")
        .with_field("content", "")];

    let report = synchronize(&remote, &[], &local).await.unwrap();

    assert_eq!(report.created.len(), 1);
    assert_eq!(report.remote_id("b1"), Some("P1"));
    assert_eq!(
        remote.writes(),
        vec![RemoteCall::Create {
            fields: fields(json!({"type": "text", "content": ""}))
        }]
    );
}

#[tokio::test]
async fn moving_last_item_first_reorders_every_shifted_item() {
    let remote = seeded();
    let snapshot = remote.items();
    let mut local = snapshot.clone();
    folio_model::move_item(&mut local, "P3", 0);

    let report = synchronize(&remote, &snapshot, &local).await.unwrap();

    assert_eq!(
        remote.writes(),
        vec![
            RemoteCall::Reorder { id: "P3".into(), order: 0 },
            RemoteCall::Reorder { id: "P1".into(), order: 1 },
            RemoteCall::Reorder { id: "P2".into(), order: 2 },
        ]
    );
    assert_eq!(report.operation_count(), 3);
    assert_eq!(ids(&remote.items()), vec!["P3", "P1", "P2"]);
}

#[tokio::test]
async fn steps_run_in_fixed_order() {
    let remote = seeded();
    let snapshot = remote.items();
    let mut local = snapshot.clone();
    local.retain(|item| item.id != "P2");
    local[1].fields.insert("title".into(), json!("Cinder II"));
    local.push(Entity::new("temp_1", 0).with_field("title", "Dune"));
    folio_model::reindex(&mut local);

    let report = synchronize(&remote, &snapshot, &local).await.unwrap();

    let ops: Vec<RemoteOp> = remote.writes().iter().map(RemoteCall::op).collect();
    assert_eq!(
        ops,
        vec![RemoteOp::Delete, RemoteOp::Create, RemoteOp::Update, RemoteOp::Reorder]
    );
    assert_eq!(report.deleted, vec!["P2".to_string()]);
    assert_eq!(report.updated, vec!["P3".to_string()]);
    // P3 moved from index 2 to 1; the creation landed where it belongs.
    assert_eq!(report.reordered, vec![("P3".to_string(), 1)]);
}

#[tokio::test]
async fn identical_collections_issue_no_calls() {
    let remote = seeded();
    let snapshot = remote.items();

    let report = synchronize(&remote, &snapshot, &snapshot.clone()).await.unwrap();

    assert_eq!(report.operation_count(), 0);
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn numeric_representation_does_not_count_as_update() {
    let remote =
        InMemoryCollection::with_items("P", vec![project("P1", 0, "Atlas").with_field("year", 2024)]);
    let snapshot = remote.items();
    let mut local = snapshot.clone();
    local[0].fields.insert("year".into(), json!(2024.0));

    let report = synchronize(&remote, &snapshot, &local).await.unwrap();
    assert_eq!(report.operation_count(), 0);
}

#[tokio::test]
async fn created_item_out_of_place_is_reordered_under_its_new_id() {
    let remote = seeded();
    let snapshot = remote.items();
    let mut local = snapshot.clone();
    local.insert(0, Entity::new("temp_1", 0).with_field("title", "Aardvark"));
    folio_model::reindex(&mut local);

    let report = synchronize(&remote, &snapshot, &local).await.unwrap();

    assert_eq!(report.remote_id("temp_1"), Some("P4"));
    assert_eq!(report.reordered[0], ("P4".to_string(), 0));
    assert_eq!(ids(&remote.items()), vec!["P4", "P1", "P2", "P3"]);
}

#[tokio::test]
async fn first_failure_aborts_remaining_steps() {
    init_logs();
    let remote = seeded();
    let snapshot = remote.items();
    let mut local = snapshot.clone();
    local[0].fields.insert("title".into(), json!("Atlas II"));
    local.push(Entity::new("temp_1", 3).with_field("title", "Dune"));
    remote.fail_next(RemoteOp::Create, "Invalid payload");

    let err = synchronize(&remote, &snapshot, &local).await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid payload");
    assert!(!remote
        .calls()
        .iter()
        .any(|call| call.op() == RemoteOp::Update));
}

struct Stalled;

#[async_trait::async_trait]
impl RemoteCollection for Stalled {
    async fn list(&self) -> SyncResult<Vec<Entity>> {
        Ok(Vec::new())
    }

    async fn create(&self, _fields: Fields) -> SyncResult<Entity> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Entity::new("P1", 0))
    }

    async fn update(&self, id: &str, _fields: Fields) -> SyncResult<Entity> {
        Ok(Entity::new(id, 0))
    }

    async fn delete(&self, _id: &str) -> SyncResult<()> {
        Ok(())
    }

    async fn reorder(&self, _id: &str, _order: u32) -> SyncResult<()> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_call_times_out() {
    let config = SyncConfig {
        collection: "projects".into(),
        call_timeout_ms: 500,
    };
    let local = vec![Entity::new("temp_1", 0)];

    let err = synchronize_with(&Stalled, &[], &local, &config)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Timeout));
}

// ── Reconciler ───────────────────────────────────────────────────

#[tokio::test]
async fn load_makes_snapshot_and_local_equal() {
    let remote = seeded();
    let reconciler = loaded(&remote).await;

    assert_eq!(ids(reconciler.local()), vec!["P1", "P2", "P3"]);
    assert_eq!(reconciler.local(), reconciler.snapshot());
    assert!(!reconciler.is_dirty());
    assert_eq!(reconciler.change_count(), 0);
}

#[tokio::test]
async fn save_creates_then_refetches_clean_snapshot() {
    let remote = InMemoryCollection::new("P");
    let mut reconciler = loaded(&remote).await;

    let temp = reconciler.add(fields(json!({"type": "text", "content": ""})));
    assert_eq!(temp, "temp_1");
    assert!(reconciler.is_dirty());

    let report = reconciler.save().await.unwrap();

    assert_eq!(report.created.len(), 1);
    assert_eq!(reconciler.snapshot().len(), 1);
    assert_eq!(reconciler.snapshot()[0].id, "P1");
    assert!(!reconciler.snapshot()[0].is_temporary());
    assert!(!reconciler.is_dirty());
    assert!(!reconciler.is_saving());
}

#[tokio::test]
async fn clean_save_makes_no_remote_calls() {
    let remote = seeded();
    let mut reconciler = loaded(&remote).await;

    let report = reconciler.save().await.unwrap();

    assert_eq!(report.operation_count(), 0);
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn second_save_is_a_no_op() {
    let remote = seeded();
    let mut reconciler = loaded(&remote).await;
    reconciler.update("P2", |item| {
        item.fields.insert("title".into(), json!("Birch II"));
    });

    reconciler.save().await.unwrap();
    remote.clear_calls();
    let report = reconciler.save().await.unwrap();

    assert_eq!(report.operation_count(), 0);
    assert!(remote.calls().is_empty());
    assert_eq!(remote.items()[1].get_str("/title"), Some("Birch II"));
}

#[tokio::test]
async fn failed_save_keeps_local_edits() {
    init_logs();
    let remote = seeded();
    let mut reconciler = loaded(&remote).await;
    reconciler.remove("P1");
    let before = reconciler.local().to_vec();
    remote.fail_next(RemoteOp::Delete, "Item is locked");

    let err = reconciler.save().await.unwrap_err();

    assert_eq!(err.to_string(), "Item is locked");
    assert_eq!(reconciler.local(), before.as_slice());
    assert!(reconciler.is_dirty());
    assert!(!reconciler.is_saving());

    let report = reconciler.save().await.unwrap();
    assert_eq!(report.deleted, vec!["P1".to_string()]);
    assert!(!reconciler.is_dirty());
}

#[tokio::test]
async fn retry_after_partial_delete_does_not_delete_again() {
    init_logs();
    let remote = InMemoryCollection::with_items(
        "P",
        vec![project("P1", 0, "Atlas"), project("P2", 1, "Birch")],
    );
    let mut reconciler = loaded(&remote).await;
    reconciler.remove("P1");
    reconciler.update("P2", |item| {
        item.fields.insert("title".into(), json!("Birch II"));
    });
    remote.fail_next(RemoteOp::Update, "Item is locked");

    let err = reconciler.save().await.unwrap_err();

    assert_eq!(err.to_string(), "Item is locked");
    assert_eq!(ids(reconciler.snapshot()), vec!["P2"]);
    assert_eq!(reconciler.change_count(), 1);
    assert!(!reconciler.is_saving());

    remote.clear_calls();
    let report = reconciler.save().await.unwrap();

    assert!(report.deleted.is_empty());
    assert_eq!(report.updated, vec!["P2".to_string()]);
    assert!(!remote.writes().iter().any(|call| call.op() == RemoteOp::Delete));
    assert_eq!(ids(&remote.items()), vec!["P2"]);
    assert_eq!(remote.items()[0].get_str("/title"), Some("Birch II"));
    assert!(!reconciler.is_dirty());
}

#[tokio::test]
async fn retry_after_partial_create_does_not_duplicate() {
    init_logs();
    let remote = InMemoryCollection::with_items("P", vec![project("P1", 0, "Atlas")]);
    let mut reconciler = loaded(&remote).await;
    let temp = reconciler.add(fields(json!({"title": "Cedar"})));
    reconciler.update("P1", |item| {
        item.fields.insert("title".into(), json!("Atlas II"));
    });
    remote.fail_next(RemoteOp::Update, "Item is locked");

    reconciler.save().await.unwrap_err();

    assert!(reconciler.get(&temp).is_none());
    assert_eq!(ids(reconciler.local()), vec!["P1", "P2"]);
    assert_eq!(ids(reconciler.snapshot()), vec!["P1", "P2"]);
    assert!(reconciler.is_dirty());

    remote.clear_calls();
    let report = reconciler.save().await.unwrap();

    assert!(report.created.is_empty());
    assert_eq!(report.updated, vec!["P1".to_string()]);
    assert!(!remote.writes().iter().any(|call| call.op() == RemoteOp::Create));
    let cedars = remote
        .items()
        .iter()
        .filter(|item| item.get_str("/title") == Some("Cedar"))
        .count();
    assert_eq!(cedars, 1);
    assert_eq!(ids(reconciler.local()), vec!["P1", "P2"]);
}

#[tokio::test(start_paused = true)]
async fn dropped_save_clears_saving_flag() {
    let mut reconciler = Reconciler::new(Stalled, SyncConfig::default());
    reconciler.add_entity(Entity::new("temp_1", 0));

    let outcome = tokio::time::timeout(Duration::from_millis(10), reconciler.save()).await;

    assert!(outcome.is_err());
    assert!(!reconciler.is_saving());
    assert!(reconciler.is_dirty());
    assert_eq!(ids(reconciler.local()), vec!["temp_1"]);
}

#[tokio::test]
async fn update_cannot_change_identity() {
    let remote = seeded();
    let mut reconciler = loaded(&remote).await;

    assert!(reconciler.update("P1", |item| {
        item.id = "P9".into();
        item.order = 7;
        item.fields.insert("title".into(), json!("Renamed"));
    }));

    let item = reconciler.get("P1").unwrap();
    assert_eq!(item.order, 0);
    assert_eq!(item.get_str("/title"), Some("Renamed"));
    assert!(!reconciler.update("missing", |_| {}));
}

#[tokio::test]
async fn reorder_and_revert() {
    let remote = seeded();
    let mut reconciler = loaded(&remote).await;

    assert!(reconciler.reorder("P3", 0));
    assert_eq!(ids(reconciler.local()), vec!["P3", "P1", "P2"]);
    assert_eq!(reconciler.change_count(), 3);

    reconciler.revert();
    assert!(!reconciler.is_dirty());
    assert_eq!(ids(reconciler.local()), vec!["P1", "P2", "P3"]);
    assert!(!reconciler.reorder("missing", 0));
}

#[tokio::test]
async fn remove_compacts_local_order() {
    let remote = seeded();
    let mut reconciler = loaded(&remote).await;

    assert!(reconciler.remove("P1"));
    assert!(!reconciler.remove("P1"));

    let orders: Vec<u32> = reconciler.local().iter().map(|item| item.order).collect();
    assert_eq!(orders, vec![0, 1]);
}

#[tokio::test]
async fn load_sorts_by_remote_order() {
    let remote = InMemoryCollection::new("P");
    let mut reconciler = Reconciler::new(&remote, SyncConfig::default());
    reconciler.reset_snapshot(vec![project("B", 5, "b"), project("A", 2, "a")]);

    assert_eq!(ids(reconciler.snapshot()), vec!["A", "B"]);
    assert_eq!(reconciler.snapshot()[1].order, 1);
}
