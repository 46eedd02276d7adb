use crate::document::Document;
use crate::error::ModelResult;
use crate::ordering::Ordered;
use folio_types::{is_temp_id, validate_id};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record of a remote collection.
///
/// Only `id` and `order` are known to Folio; everything else is carried in
/// `fields` and defined by the collection's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(default)]
    pub order: u32,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Entity {
    pub fn new(id: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            order,
            fields: Map::new(),
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Parses a raw JSON record. The record must be an object with a valid
    /// string `id`.
    pub fn from_record(record: Value) -> ModelResult<Self> {
        let entity: Entity = serde_json::from_value(record)?;
        validate_id(&entity.id)?;
        Ok(entity)
    }

    /// The record as a JSON object, `id` and `order` included.
    pub fn to_record(&self) -> ModelResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// True while the record only exists locally.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        is_temp_id(&self.id)
    }

    /// Extract a value from `fields` using a JSON pointer (e.g., "/title",
    /// "/heroImage/url").
    #[must_use]
    pub fn get(&self, pointer: &str) -> Option<&Value> {
        let path = pointer.strip_prefix('/')?;
        let (head, rest) = match path.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let value = self.fields.get(head)?;
        match rest {
            Some(rest) => value.pointer(&format!("/{rest}")),
            None => Some(value),
        }
    }

    /// Extract a string value from `fields` using a JSON pointer.
    #[must_use]
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.get(pointer).and_then(Value::as_str)
    }

    /// Extract a boolean value from `fields` using a JSON pointer.
    #[must_use]
    pub fn get_bool(&self, pointer: &str) -> Option<bool> {
        self.get(pointer).and_then(Value::as_bool)
    }

    /// Extract a numeric value from `fields` using a JSON pointer.
    #[must_use]
    pub fn get_number(&self, pointer: &str) -> Option<f64> {
        self.get(pointer).and_then(Value::as_f64)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// True if both records hold the same fields, ignoring `id` and `order`.
    #[must_use]
    pub fn same_fields(&self, other: &Entity) -> bool {
        self.fields == other.fields
    }

    /// Reads a block document stored in `field`, accepting legacy markdown.
    /// A missing or non-string field yields an empty document.
    #[must_use]
    pub fn document(&self, field: &str) -> Document {
        self.fields
            .get(field)
            .and_then(Value::as_str)
            .map(Document::from_description)
            .unwrap_or_default()
    }

    /// Stores `document` in `field` as a JSON string.
    pub fn set_document(&mut self, field: &str, document: &Document) -> ModelResult<()> {
        let json = document.to_json()?;
        self.fields.insert(field.to_string(), Value::String(json));
        Ok(())
    }
}

impl Ordered for Entity {
    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}
