//! Content blocks.
//!
//! A block is an id, a sibling position and one payload out of a closed set
//! of variants. On the wire the variant is a `type` tag flattened next to the
//! payload fields:
//!
//! ```json
//! {"id": "block-1-abc", "order": 0, "type": "heading", "level": 2, "content": ""}
//! ```

use crate::error::{ModelError, ModelResult};
use crate::ordering::Ordered;
use crate::text::TextContent;
use folio_types::{generate_block_id, validate_id};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The fixed enumeration of block variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    Text,
    Heading,
    Image,
    Gallery,
    Spacer,
    Divider,
    HeroImage,
    HeroSection,
    WorkTitle,
    WorkMetadata,
    WorkGallery,
    WorkLayoutConfig,
    LayoutRow,
    LayoutGrid,
}

impl BlockType {
    /// Every variant, in toolbar order.
    pub const ALL: [BlockType; 14] = [
        Self::Text,
        Self::Heading,
        Self::Image,
        Self::Gallery,
        Self::Spacer,
        Self::Divider,
        Self::HeroImage,
        Self::HeroSection,
        Self::WorkTitle,
        Self::WorkMetadata,
        Self::WorkGallery,
        Self::WorkLayoutConfig,
        Self::LayoutRow,
        Self::LayoutGrid,
    ];

    /// The wire name of this variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Heading => "heading",
            Self::Image => "image",
            Self::Gallery => "gallery",
            Self::Spacer => "spacer",
            Self::Divider => "divider",
            Self::HeroImage => "hero-image",
            Self::HeroSection => "hero-section",
            Self::WorkTitle => "work-title",
            Self::WorkMetadata => "work-metadata",
            Self::WorkGallery => "work-gallery",
            Self::WorkLayoutConfig => "work-layout-config",
            Self::LayoutRow => "layout-row",
            Self::LayoutGrid => "layout-grid",
        }
    }

    /// Container variants hold child block lists and may not be nested.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::LayoutRow | Self::LayoutGrid)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ModelError::UnknownBlockType(s.to_string()))
    }
}

// ── Payload enums ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    #[serde(rename = "400")]
    Regular,
    #[serde(rename = "500")]
    Medium,
    #[serde(rename = "700")]
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Small,
    Medium,
    #[default]
    Large,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GalleryLayout {
    #[serde(rename = "1+2+3")]
    Staggered,
    #[serde(rename = "grid")]
    Grid,
    #[default]
    #[serde(rename = "auto")]
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacerHeight {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DividerStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayPosition {
    #[default]
    BottomLeft,
    BottomRight,
    Center,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColumnWidth {
    #[default]
    Auto,
    Narrow,
    Wide,
}

/// Column width distribution of a layout row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Distribution {
    #[default]
    Equal,
    GoldenLeft,
    GoldenRight,
    Custom,
}

/// Grid template of a layout grid. `auto` lays out like `2x2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GridTemplate {
    #[default]
    #[serde(rename = "2x2")]
    TwoByTwo,
    #[serde(rename = "3x1")]
    ThreeByOne,
    #[serde(rename = "1x3")]
    OneByThree,
    #[serde(rename = "2x3")]
    TwoByThree,
    #[serde(rename = "auto")]
    Auto,
}

impl GridTemplate {
    /// `(rows, cols)` of the template.
    #[must_use]
    pub const fn dimensions(self) -> (usize, usize) {
        match self {
            Self::TwoByTwo | Self::Auto => (2, 2),
            Self::ThreeByOne => (3, 1),
            Self::OneByThree => (1, 3),
            Self::TwoByThree => (2, 3),
        }
    }

    /// Number of cells, i.e. child slots.
    #[must_use]
    pub const fn cell_count(self) -> usize {
        let (rows, cols) = self.dimensions();
        rows * cols
    }
}

// ── Payload structs ──────────────────────────────────────────────

/// Markdown or rich-text paragraph with optional styling.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextBlock {
    pub content: TextContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingBlock {
    /// 1, 2 or 3.
    pub level: u8,
    pub content: String,
}

impl Default for HeadingBlock {
    fn default() -> Self {
        Self {
            level: 2,
            content: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageBlock {
    pub url: String,
    pub alt: String,
    pub caption: String,
    pub size: ImageSize,
    pub align: Align,
}

/// One image of a gallery.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalleryBlock {
    pub images: Vec<GalleryImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<GalleryLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_layout: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacerBlock {
    pub height: SpacerHeight,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DividerBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<DividerStyle>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroImageBlock {
    pub url: String,
    pub alt: String,
}

/// Typography shared by the title-carrying work blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TitleStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_color: Option<String>,
}

impl TitleStyle {
    /// The work detail page typography: 60px bold title, 14px author line.
    #[must_use]
    pub fn work_detail() -> Self {
        Self {
            title_font_size: Some(60),
            author_font_size: Some(14),
            gap: Some(24),
            title_font_weight: Some(FontWeight::Bold),
            author_font_weight: Some(FontWeight::Medium),
            email_font_weight: Some(FontWeight::Regular),
            title_color: Some("#1b1d1f".into()),
            author_color: Some("#1b1d1f".into()),
            email_color: Some("#7b828e".into()),
        }
    }
}

/// Full-width hero image with title/author/email overlay.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroSectionBlock {
    pub url: String,
    pub alt: String,
    pub title: String,
    pub author: String,
    pub email: String,
    #[serde(flatten)]
    pub style: TitleStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_position: Option<OverlayPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_background: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkTitleBlock {
    pub title: String,
    pub author: String,
    pub email: String,
    #[serde(flatten)]
    pub style: TitleStyle,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkMetadataBlock {
    pub author: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkGalleryBlock {
    pub images: Vec<GalleryImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_layout: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkLayoutConfigBlock {
    /// 1, 2 or 3 columns.
    pub column_layout: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_gap: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_column_width: Option<TextColumnWidth>,
}

impl Default for WorkLayoutConfigBlock {
    fn default() -> Self {
        Self {
            column_layout: 2,
            column_gap: None,
            text_column_width: None,
        }
    }
}

/// Horizontal container: one child list per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutRowBlock {
    /// 2 or 3; always equal to `children.len()`.
    pub columns: u8,
    pub children: Vec<Vec<ContentBlock>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_gap: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
    /// Percentages, one per column; required for `Distribution::Custom`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_widths: Option<Vec<f64>>,
}

impl Default for LayoutRowBlock {
    fn default() -> Self {
        Self {
            columns: 2,
            children: vec![Vec::new(), Vec::new()],
            column_gap: None,
            distribution: None,
            custom_widths: None,
        }
    }
}

/// 2D container: one child list per cell, filled row by row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutGridBlock {
    pub template: GridTemplate,
    pub children: Vec<Vec<ContentBlock>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_cell_height: Option<u32>,
}

impl Default for LayoutGridBlock {
    fn default() -> Self {
        let template = GridTemplate::default();
        Self {
            template,
            children: vec![Vec::new(); template.cell_count()],
            gap: None,
            min_cell_height: None,
        }
    }
}

/// Variant payload of a block, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BlockBody {
    Text(TextBlock),
    Heading(HeadingBlock),
    Image(ImageBlock),
    Gallery(GalleryBlock),
    Spacer(SpacerBlock),
    Divider(DividerBlock),
    HeroImage(HeroImageBlock),
    HeroSection(HeroSectionBlock),
    WorkTitle(WorkTitleBlock),
    WorkMetadata(WorkMetadataBlock),
    WorkGallery(WorkGalleryBlock),
    WorkLayoutConfig(WorkLayoutConfigBlock),
    LayoutRow(LayoutRowBlock),
    LayoutGrid(LayoutGridBlock),
}

impl BlockBody {
    /// The deterministic default payload for a variant.
    #[must_use]
    pub fn default_for(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Text => Self::Text(TextBlock {
                content: TextContent::default(),
                font_size: Some(18),
                font_weight: Some(FontWeight::Regular),
                color: Some("#1b1d1f".into()),
                line_height: Some(1.8),
            }),
            BlockType::Heading => Self::Heading(HeadingBlock::default()),
            BlockType::Image => Self::Image(ImageBlock::default()),
            BlockType::Gallery => Self::Gallery(GalleryBlock {
                images: Vec::new(),
                layout: Some(GalleryLayout::Auto),
                image_layout: Some(1),
            }),
            BlockType::Spacer => Self::Spacer(SpacerBlock::default()),
            BlockType::Divider => Self::Divider(DividerBlock {
                style: Some(DividerStyle::Solid),
            }),
            BlockType::HeroImage => Self::HeroImage(HeroImageBlock::default()),
            BlockType::HeroSection => Self::HeroSection(HeroSectionBlock {
                style: TitleStyle::work_detail(),
                overlay_position: Some(OverlayPosition::BottomLeft),
                overlay_opacity: Some(0.8),
                overlay_background: Some("rgba(0, 0, 0, 0.3)".into()),
                ..HeroSectionBlock::default()
            }),
            BlockType::WorkTitle => Self::WorkTitle(WorkTitleBlock::default()),
            BlockType::WorkMetadata => Self::WorkMetadata(WorkMetadataBlock::default()),
            BlockType::WorkGallery => Self::WorkGallery(WorkGalleryBlock {
                images: Vec::new(),
                image_layout: Some(1),
            }),
            BlockType::WorkLayoutConfig => Self::WorkLayoutConfig(WorkLayoutConfigBlock {
                column_layout: 2,
                column_gap: Some(90),
                text_column_width: Some(TextColumnWidth::Auto),
            }),
            BlockType::LayoutRow => Self::LayoutRow(LayoutRowBlock {
                column_gap: Some(24),
                distribution: Some(Distribution::Equal),
                ..LayoutRowBlock::default()
            }),
            BlockType::LayoutGrid => Self::LayoutGrid(LayoutGridBlock {
                gap: Some(16),
                min_cell_height: Some(200),
                ..LayoutGridBlock::default()
            }),
        }
    }

    /// The variant tag of this payload.
    #[must_use]
    pub fn block_type(&self) -> BlockType {
        match self {
            Self::Text(_) => BlockType::Text,
            Self::Heading(_) => BlockType::Heading,
            Self::Image(_) => BlockType::Image,
            Self::Gallery(_) => BlockType::Gallery,
            Self::Spacer(_) => BlockType::Spacer,
            Self::Divider(_) => BlockType::Divider,
            Self::HeroImage(_) => BlockType::HeroImage,
            Self::HeroSection(_) => BlockType::HeroSection,
            Self::WorkTitle(_) => BlockType::WorkTitle,
            Self::WorkMetadata(_) => BlockType::WorkMetadata,
            Self::WorkGallery(_) => BlockType::WorkGallery,
            Self::WorkLayoutConfig(_) => BlockType::WorkLayoutConfig,
            Self::LayoutRow(_) => BlockType::LayoutRow,
            Self::LayoutGrid(_) => BlockType::LayoutGrid,
        }
    }
}

/// One node of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Unique within the owning document; never changes.
    pub id: String,
    /// Position among siblings.
    pub order: u32,
    #[serde(flatten)]
    pub body: BlockBody,
}

/// Creates a default block of `block_type` with a freshly generated id.
#[must_use]
pub fn create_default_block(block_type: BlockType, order: u32) -> ContentBlock {
    ContentBlock::new_default(block_type, order)
}

impl ContentBlock {
    /// Default block of `block_type` with a freshly generated id.
    #[must_use]
    pub fn new_default(block_type: BlockType, order: u32) -> Self {
        Self::with_id(generate_block_id(), block_type, order)
    }

    /// Default block of `block_type` with a caller-supplied id.
    #[must_use]
    pub fn with_id(id: impl Into<String>, block_type: BlockType, order: u32) -> Self {
        Self {
            id: id.into(),
            order,
            body: BlockBody::default_for(block_type),
        }
    }

    #[must_use]
    pub fn block_type(&self) -> BlockType {
        self.body.block_type()
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        self.block_type().is_container()
    }

    /// Child lists of a container block; `None` for leaf blocks.
    #[must_use]
    pub fn slots(&self) -> Option<&Vec<Vec<ContentBlock>>> {
        match &self.body {
            BlockBody::LayoutRow(row) => Some(&row.children),
            BlockBody::LayoutGrid(grid) => Some(&grid.children),
            _ => None,
        }
    }

    /// Mutable child lists of a container block.
    pub fn slots_mut(&mut self) -> Option<&mut Vec<Vec<ContentBlock>>> {
        match &mut self.body {
            BlockBody::LayoutRow(row) => Some(&mut row.children),
            BlockBody::LayoutGrid(grid) => Some(&mut grid.children),
            _ => None,
        }
    }

    /// Shallow-merges the keys of a JSON object into this block's payload.
    ///
    /// `id`, `type` and `order` are never overwritten. Fails if the merged
    /// value no longer forms a valid payload of the same variant.
    pub fn merged_with(&self, partial: &Value) -> ModelResult<ContentBlock> {
        let Some(patch) = partial.as_object() else {
            return Err(self.invalid("partial update must be a JSON object"));
        };
        let mut value = serde_json::to_value(self)?;
        if let Some(target) = value.as_object_mut() {
            for (key, field) in patch {
                if matches!(key.as_str(), "id" | "type" | "order") {
                    continue;
                }
                target.insert(key.clone(), field.clone());
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Checks payload ranges and container shape (one level deep).
    pub fn validate(&self) -> ModelResult<()> {
        validate_id(&self.id)?;
        match &self.body {
            BlockBody::Heading(h) if !(1..=3).contains(&h.level) => {
                Err(self.invalid(format!("heading level {} outside 1..=3", h.level)))
            }
            BlockBody::Gallery(GalleryBlock {
                image_layout: Some(n),
                ..
            })
            | BlockBody::WorkGallery(WorkGalleryBlock {
                image_layout: Some(n),
                ..
            }) if !(1..=3).contains(n) => {
                Err(self.invalid(format!("image layout {n} outside 1..=3")))
            }
            BlockBody::WorkLayoutConfig(c) if !(1..=3).contains(&c.column_layout) => Err(
                self.invalid(format!("column layout {} outside 1..=3", c.column_layout)),
            ),
            BlockBody::HeroSection(HeroSectionBlock {
                overlay_opacity: Some(opacity),
                ..
            }) if !(0.0..=1.0).contains(opacity) => {
                Err(self.invalid(format!("overlay opacity {opacity} outside 0..=1")))
            }
            BlockBody::LayoutRow(row) => {
                if !(2..=3).contains(&row.columns) {
                    return Err(self.invalid(format!("{} columns outside 2..=3", row.columns)));
                }
                if row.children.len() != row.columns as usize {
                    return Err(self.invalid(format!(
                        "{} columns but {} child lists",
                        row.columns,
                        row.children.len()
                    )));
                }
                if row.distribution == Some(Distribution::Custom) {
                    match &row.custom_widths {
                        Some(widths) if widths.len() == row.columns as usize => {}
                        _ => {
                            return Err(self.invalid(
                                "custom distribution needs one width per column",
                            ));
                        }
                    }
                }
                Ok(())
            }
            BlockBody::LayoutGrid(grid) if grid.children.len() != grid.template.cell_count() => {
                Err(self.invalid(format!(
                    "template has {} cells but {} child lists",
                    grid.template.cell_count(),
                    grid.children.len()
                )))
            }
            _ => Ok(()),
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> ModelError {
        ModelError::InvalidPayload {
            block_type: self.block_type().as_str(),
            reason: reason.into(),
        }
    }
}

impl Ordered for ContentBlock {
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
