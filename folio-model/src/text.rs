//! Textual block payloads.
//!
//! A text block's `content` is stored either as a markdown string (older
//! records) or as a structured rich-text document `{"type": "doc", ...}`.
//! The two are told apart by shape, never by a version field.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Storage format of a textual payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Markdown,
    RichText,
    /// Neither a string nor a `doc` object.
    Unknown,
}

impl TextFormat {
    /// Detects the format of a raw JSON payload.
    #[must_use]
    pub fn detect(value: &Value) -> Self {
        if value.is_string() {
            Self::Markdown
        } else if is_rich_text_doc(value) {
            Self::RichText
        } else {
            Self::Unknown
        }
    }
}

/// Returns true if `value` is an object carrying the `type: "doc"` discriminator.
#[must_use]
pub fn is_rich_text_doc(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|obj| obj.get("type"))
        .and_then(Value::as_str)
        == Some("doc")
}

/// Content of a text block.
#[derive(Debug, Clone, PartialEq)]
pub enum TextContent {
    Markdown(String),
    /// A structured rich-text tree, kept verbatim.
    RichText(Value),
}

impl TextContent {
    /// Returns the detected storage format.
    #[must_use]
    pub fn format(&self) -> TextFormat {
        match self {
            Self::Markdown(_) => TextFormat::Markdown,
            Self::RichText(_) => TextFormat::RichText,
        }
    }

    /// Returns the markdown source, if this is a markdown payload.
    #[must_use]
    pub fn as_markdown(&self) -> Option<&str> {
        match self {
            Self::Markdown(text) => Some(text),
            Self::RichText(_) => None,
        }
    }

    /// True for an empty markdown string or a `doc` without content nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Markdown(text) => text.trim().is_empty(),
            Self::RichText(doc) => doc
                .get("content")
                .and_then(Value::as_array)
                .is_none_or(Vec::is_empty),
        }
    }

    /// Classifies a raw JSON payload; `None` when the shape is unrecognized.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self::Markdown(text)),
            other if is_rich_text_doc(&other) => Some(Self::RichText(other)),
            _ => None,
        }
    }
}

impl Default for TextContent {
    fn default() -> Self {
        Self::Markdown(String::new())
    }
}

impl From<&str> for TextContent {
    fn from(text: &str) -> Self {
        Self::Markdown(text.to_string())
    }
}

impl Serialize for TextContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Markdown(text) => serializer.serialize_str(text),
            Self::RichText(doc) => doc.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TextContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).ok_or_else(|| {
            de::Error::custom("text content must be a markdown string or a {\"type\": \"doc\"} object")
        })
    }
}
