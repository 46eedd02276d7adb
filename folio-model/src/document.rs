//! Documents: the ordered top-level block list persisted as one JSON blob.

use crate::block::{BlockBody, ContentBlock, TextBlock};
use crate::error::{ModelError, ModelResult};
use crate::ordering::reindex;
use crate::text::TextContent;
use folio_types::generate_block_id;
use serde::{Deserialize, Serialize};

/// Version tag written into every document.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Nesting depth accepted by [`validate_block_tree`] unless told otherwise.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 3;

/// One row of a row-based layout: `layout` columns filled by `block_count`
/// consecutive top-level blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowConfig {
    /// 1, 2 or 3 columns.
    pub layout: u8,
    pub block_count: usize,
}

/// A block tree plus its format version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub blocks: Vec<ContentBlock>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_config: Option<Vec<RowConfig>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Document {
    /// Wraps `blocks` into a current-version document, reindexing them.
    #[must_use]
    pub fn new(mut blocks: Vec<ContentBlock>) -> Self {
        reindex(&mut blocks);
        Self {
            blocks,
            version: DOCUMENT_VERSION.to_string(),
            row_config: None,
        }
    }

    /// Reads a stored description field.
    ///
    /// A JSON document is returned as is. Anything else is legacy markdown
    /// and becomes a single text block. An empty description is an empty
    /// document.
    #[must_use]
    pub fn from_description(description: &str) -> Self {
        if description.is_empty() {
            return Self::default();
        }
        if let Ok(doc) = Self::from_json(description) {
            return doc;
        }
        let block = ContentBlock {
            id: generate_block_id(),
            order: 0,
            body: BlockBody::Text(TextBlock {
                content: TextContent::Markdown(description.to_string()),
                ..TextBlock::default()
            }),
        };
        Self::new(vec![block])
    }

    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Runs [`validate_block_tree`] plus per-block payload checks.
    pub fn validate(&self, max_depth: usize) -> ModelResult<()> {
        validate_block_tree(&self.blocks, max_depth)?;
        for block in &self.blocks {
            block.validate()?;
            if let Some(slots) = block.slots() {
                for child in slots.iter().flatten() {
                    child.validate()?;
                }
            }
        }
        Ok(())
    }

    /// Top-level blocks grouped by this document's row config.
    #[must_use]
    pub fn rows(&self) -> Vec<&[ContentBlock]> {
        group_blocks_by_rows(&self.blocks, self.row_config.as_deref())
    }
}

/// Checks that containers only appear at the top level and that no block
/// sits deeper than `max_depth` (top-level blocks are depth 1).
///
/// The error names the first offending block by path, e.g.
/// `root[0]/layout-row[col1][0]`.
pub fn validate_block_tree(blocks: &[ContentBlock], max_depth: usize) -> ModelResult<()> {
    for (idx, block) in blocks.iter().enumerate() {
        check_block(block, 1, &format!("root[{idx}]"), max_depth)?;
    }
    Ok(())
}

fn check_block(block: &ContentBlock, depth: usize, path: &str, max_depth: usize) -> ModelResult<()> {
    if depth > max_depth {
        return Err(ModelError::InvalidTree(format!(
            "block tree exceeds maximum nesting depth of {max_depth} at {path}"
        )));
    }
    if depth > 1 && block.is_container() {
        return Err(ModelError::InvalidTree(format!(
            "container block ({}) cannot be nested inside another container at {path}",
            block.block_type()
        )));
    }
    let Some(slots) = block.slots() else {
        return Ok(());
    };
    let (kind, slot_name) = match block.body {
        BlockBody::LayoutGrid(_) => ("layout-grid", "cell"),
        _ => ("layout-row", "col"),
    };
    for (slot_idx, slot) in slots.iter().enumerate() {
        for (child_idx, child) in slot.iter().enumerate() {
            let child_path = format!("{path}/{kind}[{slot_name}{slot_idx}][{child_idx}]");
            check_block(child, depth + 1, &child_path, max_depth)?;
        }
    }
    Ok(())
}

/// Splits `blocks` into consecutive rows.
///
/// Without a row config everything is one row. Blocks left over after the
/// last configured row form a trailing row so nothing is lost.
#[must_use]
pub fn group_blocks_by_rows<'a>(
    blocks: &'a [ContentBlock],
    row_config: Option<&[RowConfig]>,
) -> Vec<&'a [ContentBlock]> {
    let Some(config) = row_config.filter(|c| !c.is_empty()) else {
        return vec![blocks];
    };
    let mut rows = Vec::with_capacity(config.len() + 1);
    let mut start = 0;
    for row in config {
        let begin = start.min(blocks.len());
        let end = (start + row.block_count).min(blocks.len());
        rows.push(&blocks[begin..end]);
        start += row.block_count;
    }
    if start < blocks.len() {
        rows.push(&blocks[start..]);
    }
    rows
}

/// Builds a row config for `block_count` blocks: one row per layout, each
/// taking `layout` blocks, clamped to what remains.
#[must_use]
pub fn generate_row_config(block_count: usize, layouts: &[u8]) -> Vec<RowConfig> {
    let mut remaining = block_count;
    let mut rows = Vec::new();
    for &layout in layouts {
        if remaining == 0 {
            break;
        }
        let count = remaining.min(layout as usize);
        rows.push(RowConfig {
            layout,
            block_count: count,
        });
        remaining -= count;
    }
    rows
}
