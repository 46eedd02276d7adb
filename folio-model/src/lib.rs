//! Content model for Folio.
//!
//! Defines the types every other Folio crate builds on:
//! - [`ContentBlock`]: one typed node of a document (text, image, layout row, ...)
//! - [`Document`]: the `{ blocks, version }` blob persisted through its owning record
//! - [`Entity`]: a generic `{ id, order, ...fields }` record of a remote collection
//! - [`CollectionSchema`]: where a collection lives remotely and which fields it accepts
//! - [`Ordered`]: sibling ordering and reindexing shared by blocks and entities
//!
//! Everything here is pure: constructors and validators have no side effects
//! beyond id generation.

mod block;
mod document;
mod entity;
mod error;
mod ordering;
mod schema;
mod text;

pub use block::{
    create_default_block, Align, BlockBody, BlockType, ContentBlock, DividerBlock, DividerStyle,
    Distribution, FontWeight, GalleryBlock, GalleryImage, GalleryLayout, GridTemplate,
    HeadingBlock, HeroImageBlock, HeroSectionBlock, ImageBlock, ImageSize, LayoutGridBlock,
    LayoutRowBlock, OverlayPosition, SpacerBlock, SpacerHeight, TextBlock, TextColumnWidth,
    TitleStyle, WorkGalleryBlock, WorkLayoutConfigBlock, WorkMetadataBlock, WorkTitleBlock,
};
pub use document::{
    generate_row_config, group_blocks_by_rows, validate_block_tree, Document, RowConfig,
    DEFAULT_MAX_TREE_DEPTH, DOCUMENT_VERSION,
};
pub use entity::Entity;
pub use error::{ModelError, ModelResult};
pub use ordering::{insert_after, is_contiguous, move_item, position_of, reindex, remove_by_id, Ordered};
pub use schema::CollectionSchema;
pub use text::{is_rich_text_doc, TextContent, TextFormat};
