use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Describes a remote collection: its name, REST path and the fields a
/// create or update may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    /// Path relative to the API base, e.g. `/api/admin/about/people`.
    pub path: String,
    /// Editable fields. Empty means every field is sent.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl CollectionSchema {
    pub fn new(name: &str, path: &str, fields: &[&str]) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
        }
    }

    /// Faculty and staff profiles.
    pub fn people() -> Self {
        Self::new(
            "people",
            "/api/admin/about/people",
            &[
                "name",
                "title",
                "role",
                "office",
                "email",
                "phone",
                "major",
                "specialty",
                "badge",
                "profileImage",
                "courses",
                "biography",
            ],
        )
    }

    /// News articles. `content` holds a block document.
    pub fn articles() -> Self {
        Self::new(
            "articles",
            "/api/admin/news/articles",
            &[
                "slug",
                "title",
                "category",
                "excerpt",
                "thumbnailImage",
                "content",
                "attachments",
                "published",
            ],
        )
    }

    /// Student work. `content` holds a block document.
    pub fn projects() -> Self {
        Self::new(
            "projects",
            "/api/admin/work/projects",
            &[
                "title",
                "subtitle",
                "category",
                "tags",
                "author",
                "email",
                "description",
                "year",
                "heroImage",
                "thumbnailImage",
                "galleryImages",
                "published",
                "content",
            ],
        )
    }

    pub fn exhibitions() -> Self {
        Self::new(
            "exhibitions",
            "/api/admin/work/exhibitions",
            &["title", "subtitle", "artist", "image", "year", "published"],
        )
    }

    /// Site navigation menu items.
    pub fn navigation() -> Self {
        Self::new(
            "navigation",
            "/api/admin/navigation",
            &["label", "href", "isActive", "parentId"],
        )
    }

    /// Every built-in collection.
    pub fn presets() -> Vec<Self> {
        vec![
            Self::people(),
            Self::articles(),
            Self::projects(),
            Self::exhibitions(),
            Self::navigation(),
        ]
    }

    /// Looks up a built-in collection by name.
    pub fn preset(name: &str) -> Option<Self> {
        Self::presets().into_iter().find(|s| s.name == name)
    }

    /// Whether `field` may be sent to the remote.
    #[must_use]
    pub fn accepts(&self, field: &str) -> bool {
        self.fields.is_empty() || self.fields.iter().any(|f| f == field)
    }

    /// Copies the accepted fields out of `fields`. `id` and `order` are never
    /// part of a payload.
    #[must_use]
    pub fn filter_fields(&self, fields: &Map<String, Value>) -> Map<String, Value> {
        fields
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "id" | "order") && self.accepts(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
