use folio_model::Entity;
use folio_sync::{count_changes, deep_equal, SyncPlan};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};

fn item(id: &str, order: u32, title: &str) -> Entity {
    Entity::new(id, order).with_field("title", title)
}

// ── deep_equal ───────────────────────────────────────────────────

#[test]
fn key_order_is_irrelevant() {
    let a: Value = serde_json::from_str(r#"{"a": 1, "b": {"c": [1, 2]}}"#).unwrap();
    let b: Value = serde_json::from_str(r#"{"b": {"c": [1, 2]}, "a": 1}"#).unwrap();
    assert!(deep_equal(&a, &b));
}

#[test]
fn integer_and_float_forms_are_equal() {
    assert!(deep_equal(&json!(3), &json!(3.0)));
    assert!(!deep_equal(&json!(3), &json!(3.5)));
}

#[test]
fn array_order_matters() {
    assert!(!deep_equal(&json!([1, 2]), &json!([2, 1])));
}

#[test]
fn null_differs_from_missing_key() {
    assert!(!deep_equal(&json!({"a": null}), &json!({})));
}

// ── count_changes ────────────────────────────────────────────────

#[test]
fn counts_changed_and_extra_array_entries() {
    let snapshot = json!([{"id": "a"}, {"id": "b"}]);
    let current = json!([{"id": "a"}, {"id": "c"}, {"id": "d"}]);
    assert_eq!(count_changes(&snapshot, &current), 2);
}

#[test]
fn counts_differing_object_keys() {
    let snapshot = json!({"a": 1, "b": 2, "c": 3});
    let current = json!({"a": 1, "b": 5, "d": 3});
    assert_eq!(count_changes(&snapshot, &current), 3);
}

#[test]
fn scalars_count_once() {
    assert_eq!(count_changes(&json!("x"), &json!("y")), 1);
    assert_eq!(count_changes(&json!("x"), &json!("x")), 0);
}

// ── SyncPlan ─────────────────────────────────────────────────────

#[test]
fn plans_each_kind_of_change() {
    let snapshot = vec![item("P1", 0, "a"), item("P2", 1, "b"), item("P3", 2, "c")];
    let local = vec![item("P3", 0, "c*"), item("temp_1", 1, "d"), item("P1", 2, "a")];

    let plan = SyncPlan::between(&snapshot, &local);

    assert_eq!(plan.deletes, vec!["P2".to_string()]);
    assert_eq!(plan.creates.len(), 1);
    assert_eq!(plan.creates[0].id, "temp_1");
    assert_eq!(plan.updates.len(), 1);
    assert_eq!(plan.updates[0].id, "P3");
    assert_eq!(
        plan.reorders,
        vec![("P3".to_string(), 0), ("P1".to_string(), 2)]
    );
    assert_eq!(plan.operation_count(), 5);
}

#[test]
fn unknown_persisted_looking_id_is_created() {
    let plan = SyncPlan::between(&[], &[item("b1", 0, "")]);
    assert_eq!(plan.creates.len(), 1);
    assert!(plan.updates.is_empty());
}

#[test]
fn identical_collections_plan_nothing() {
    let snapshot = vec![item("P1", 0, "a"), item("P2", 1, "b")];
    assert!(SyncPlan::between(&snapshot, &snapshot).is_empty());
}

// ── Properties ───────────────────────────────────────────────────

fn collection() -> impl Strategy<Value = Vec<Entity>> {
    prop::collection::vec("[a-z]{0,6}", 0..8).prop_map(|titles| {
        titles
            .iter()
            .enumerate()
            .map(|(idx, title)| item(&format!("P{}", idx + 1), idx as u32, title))
            .collect()
    })
}

proptest! {
    #[test]
    fn plan_against_self_is_empty(items in collection()) {
        prop_assert!(SyncPlan::between(&items, &items).is_empty());
    }

    #[test]
    fn deleting_everything_plans_only_deletes(items in collection()) {
        let plan = SyncPlan::between(&items, &[]);
        prop_assert_eq!(plan.deletes.len(), items.len());
        prop_assert_eq!(plan.operation_count(), items.len());
    }

    #[test]
    fn count_changes_is_zero_iff_equal(a in collection(), b in collection()) {
        let (a, b) = (serde_json::to_value(&a).unwrap(), serde_json::to_value(&b).unwrap());
        prop_assert_eq!(count_changes(&a, &b) == 0, deep_equal(&a, &b));
    }
}
