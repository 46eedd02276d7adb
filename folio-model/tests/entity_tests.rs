use folio_model::{BlockType, CollectionSchema, ContentBlock, Document, Entity, ModelError};
use pretty_assertions::assert_eq;
use serde_json::json;

fn person() -> Entity {
    Entity::from_record(json!({
        "id": "p1",
        "order": 2,
        "name": "Kim",
        "email": ["kim@uni.ac.kr"],
        "office": {"building": "A", "room": 301},
        "visible": true
    }))
    .unwrap()
}

// ── Records ──────────────────────────────────────────────────────

#[test]
fn record_fields_are_flattened() {
    let e = person();
    assert_eq!(e.id, "p1");
    assert_eq!(e.order, 2);
    assert_eq!(e.fields.len(), 4);
    assert!(!e.fields.contains_key("id"));
}

#[test]
fn record_round_trip_keeps_shape() {
    let e = person();
    let record = e.to_record().unwrap();
    assert_eq!(record["id"], "p1");
    assert_eq!(record["order"], 2);
    assert_eq!(record["name"], "Kim");
}

#[test]
fn missing_order_defaults_to_zero() {
    let e = Entity::from_record(json!({"id": "n1", "label": "Home"})).unwrap();
    assert_eq!(e.order, 0);
}

#[test]
fn record_without_id_is_rejected() {
    assert!(matches!(
        Entity::from_record(json!({"name": "x"})),
        Err(ModelError::Serialization(_))
    ));
    assert!(matches!(
        Entity::from_record(json!({"id": ""})),
        Err(ModelError::InvalidId(_))
    ));
}

#[test]
fn temporary_ids_are_detected() {
    assert!(Entity::new("temp_1", 0).is_temporary());
    assert!(!person().is_temporary());
}

// ── JSON pointer helpers ─────────────────────────────────────────

#[test]
fn pointer_accessors() {
    let e = person();
    assert_eq!(e.get_str("/name"), Some("Kim"));
    assert_eq!(e.get_str("/office/building"), Some("A"));
    assert_eq!(e.get_number("/office/room"), Some(301.0));
    assert_eq!(e.get_bool("/visible"), Some(true));
    assert_eq!(e.get_str("/email/0"), Some("kim@uni.ac.kr"));
}

#[test]
fn pointer_misses() {
    let e = person();
    assert_eq!(e.get_str("/missing"), None);
    assert_eq!(e.get_str("name"), None);
    assert_eq!(e.get_bool("/name"), None);
}

#[test]
fn same_fields_ignores_position() {
    let a = Entity::new("x", 0).with_field("title", "A");
    let mut b = a.clone();
    b.order = 5;
    assert!(a.same_fields(&b));
    b.set("title", "B");
    assert!(!a.same_fields(&b));
}

// ── Embedded documents ───────────────────────────────────────────

#[test]
fn document_field_round_trip() {
    let mut article = Entity::new("a1", 0);
    let doc = Document::new(vec![ContentBlock::with_id("b1", BlockType::Heading, 0)]);
    article.set_document("content", &doc).unwrap();
    assert!(article.get_str("/content").unwrap().contains("\"heading\""));
    assert_eq!(article.document("content"), doc);
}

#[test]
fn legacy_markdown_field_is_wrapped() {
    let project = Entity::new("w1", 0).with_field("description", "Plain text");
    let doc = project.document("description");
    assert_eq!(doc.blocks.len(), 1);
    assert!(Entity::new("w2", 0).document("description").blocks.is_empty());
}

// ── Collection schemas ───────────────────────────────────────────

#[test]
fn presets_are_named_and_routed() {
    let names: Vec<String> = CollectionSchema::presets().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["people", "articles", "projects", "exhibitions", "navigation"]);
    assert_eq!(
        CollectionSchema::preset("articles").unwrap().path,
        "/api/admin/news/articles"
    );
    assert!(CollectionSchema::preset("courses").is_none());
}

#[test]
fn filter_drops_unknown_and_identity_fields() {
    let schema = CollectionSchema::navigation();
    let e = Entity::new("n1", 3)
        .with_field("label", "About")
        .with_field("href", "/about")
        .with_field("createdAt", "2024-01-01");
    let mut fields = e.fields.clone();
    fields.insert("id".into(), json!("n1"));
    let filtered = schema.filter_fields(&fields);
    assert_eq!(filtered.len(), 2);
    assert!(filtered.contains_key("label"));
    assert!(!filtered.contains_key("createdAt"));
    assert!(!filtered.contains_key("id"));
}

#[test]
fn open_schema_accepts_everything() {
    let schema = CollectionSchema::new("misc", "/api/misc", &[]);
    assert!(schema.accepts("anything"));
    let fields = Entity::new("m", 0).with_field("x", 1).fields;
    assert_eq!(schema.filter_fields(&fields).len(), 1);
}
