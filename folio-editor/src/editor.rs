//! The block tree editor.

use crate::container;
use crate::drag::SlotDrag;
use crate::error::{EditorError, EditorResult};
use crate::history::{History, DEFAULT_HISTORY_LIMIT};
use crate::propagate::{DocumentSink, Propagator, DEFAULT_PROPAGATION_DELAY};
use crate::rows;
use folio_model::{
    group_blocks_by_rows, insert_after, move_item, position_of, reindex, remove_by_id,
    validate_block_tree, BlockType, ContentBlock, Document, GridTemplate, RowConfig,
    DEFAULT_MAX_TREE_DEPTH,
};
use folio_types::{IdGenerator, SessionIdGenerator};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Editor tuning knobs.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Captures kept for undo, current state included.
    pub history_limit: usize,
    /// Quiet period before a changed document reaches the sink.
    pub propagation_delay: Duration,
    /// Deepest nesting accepted when validating updates.
    pub max_tree_depth: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            propagation_delay: DEFAULT_PROPAGATION_DELAY,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Capture {
    blocks: Vec<ContentBlock>,
    row_config: Option<Vec<RowConfig>>,
}

/// Owns one document's block list and its undo history.
///
/// Every successful mutation leaves `blocks[i].order == i`, records one
/// history entry and notifies the propagation sink, if any. Operations on
/// unknown ids do nothing and return `false`.
pub struct BlockTreeEditor {
    blocks: Vec<ContentBlock>,
    row_config: Option<Vec<RowConfig>>,
    selected_id: Option<String>,
    history: History<Capture>,
    ids: Box<dyn IdGenerator>,
    config: EditorConfig,
    propagator: Option<Propagator>,
}

impl Default for BlockTreeEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl BlockTreeEditor {
    /// Creates an editor over an empty document.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_document(Document::default(), config)
    }

    /// Creates an editor over an existing document.
    pub fn with_document(document: Document, config: EditorConfig) -> Self {
        let mut blocks = document.blocks;
        reindex(&mut blocks);
        let capture = Capture {
            blocks: blocks.clone(),
            row_config: document.row_config.clone(),
        };
        Self {
            blocks,
            row_config: document.row_config,
            selected_id: None,
            history: History::new(capture, config.history_limit),
            ids: Box::new(SessionIdGenerator::new()),
            config,
            propagator: None,
        }
    }

    /// Replaces the id source.
    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Sends every changed document to `sink` after the propagation delay.
    #[must_use]
    pub fn with_sink(mut self, sink: impl DocumentSink) -> Self {
        self.propagator = Some(Propagator::new(sink, self.config.propagation_delay));
        self
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn get_block(&self, id: &str) -> Option<&ContentBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// Selects a top-level block; unknown ids clear the selection.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected_id = id
            .filter(|id| self.get_block(id).is_some())
            .map(str::to_string);
    }

    pub fn row_config(&self) -> Option<&[RowConfig]> {
        self.row_config.as_deref()
    }

    /// Top-level blocks grouped into rows.
    pub fn rows(&self) -> Vec<&[ContentBlock]> {
        group_blocks_by_rows(&self.blocks, self.row_config.as_deref())
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Snapshot of the current state as a document.
    pub fn document(&self) -> Document {
        let mut document = Document::new(self.blocks.clone());
        document.row_config = self.row_config.clone();
        document
    }

    // ── Block CRUD ───────────────────────────────────────────────

    /// Inserts a default block after `after_id`, or at the end when it is
    /// `None` or unknown. Returns the new block's id.
    pub fn add_block(&mut self, block_type: BlockType, after_id: Option<&str>) -> String {
        let id = self.ids.block_id();
        let block = ContentBlock::with_id(id.clone(), block_type, 0);
        let index = insert_after(&mut self.blocks, block, after_id);
        if let Some(config) = self.row_config.as_mut() {
            rows::block_inserted(config, index);
        }
        debug!(%id, %block_type, index, "block added");
        self.commit();
        id
    }

    /// Shallow-merges `partial` into a block's payload. `id`, `type` and
    /// `order` keys are ignored. A partial that would leave the block invalid
    /// is rejected.
    pub fn update_block(&mut self, id: &str, partial: &Value) -> bool {
        let Some(index) = position_of(&self.blocks, id) else {
            debug!(id, "update on unknown block ignored");
            return false;
        };
        match self.blocks[index].merged_with(partial) {
            Ok(merged) => self.replace_checked(index, merged),
            Err(e) => {
                warn!(id, error = %e, "rejected block update");
                false
            }
        }
    }

    /// Edits a block in place through a typed closure. Changes to `id` and
    /// `order` are discarded.
    pub fn update_block_with(&mut self, id: &str, edit: impl FnOnce(&mut ContentBlock)) -> bool {
        let Some(index) = position_of(&self.blocks, id) else {
            debug!(id, "update on unknown block ignored");
            return false;
        };
        let mut edited = self.blocks[index].clone();
        edit(&mut edited);
        edited.id = self.blocks[index].id.clone();
        edited.order = self.blocks[index].order;
        self.replace_checked(index, edited)
    }

    fn replace_checked(&mut self, index: usize, block: ContentBlock) -> bool {
        let checked = block.validate().and_then(|()| {
            validate_block_tree(std::slice::from_ref(&block), self.config.max_tree_depth)
        });
        if let Err(e) = checked {
            warn!(id = %block.id, error = %e, "rejected block update");
            return false;
        }
        if self.blocks[index] == block {
            return false;
        }
        self.blocks[index] = block;
        self.commit();
        true
    }

    /// Removes a block, clearing the selection if it pointed there.
    pub fn delete_block(&mut self, id: &str) -> bool {
        let Some(index) = position_of(&self.blocks, id) else {
            debug!(id, "delete of unknown block ignored");
            return false;
        };
        remove_by_id(&mut self.blocks, id);
        if let Some(config) = self.row_config.as_mut() {
            rows::block_removed(config, index);
        }
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        self.commit();
        true
    }

    /// Moves a block to `destination`; past the end appends.
    pub fn reorder_blocks(&mut self, source_id: &str, destination: usize) -> bool {
        let before = position_of(&self.blocks, source_id);
        if !move_item(&mut self.blocks, source_id, destination) {
            debug!(source_id, "reorder of unknown block ignored");
            return false;
        }
        if before == position_of(&self.blocks, source_id) {
            return false;
        }
        self.commit();
        true
    }

    // ── History ──────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let Some(capture) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(capture);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(capture) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(capture);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replaces every block and restarts the history from that state. Row
    /// layout is dropped; use [`Self::reset_document`] to keep one.
    pub fn reset_blocks(&mut self, blocks: Vec<ContentBlock>) {
        self.row_config = None;
        self.replace_all(blocks);
    }

    /// Replaces blocks and row config from a document.
    pub fn reset_document(&mut self, document: Document) {
        self.row_config = document.row_config;
        self.replace_all(document.blocks);
    }

    fn replace_all(&mut self, mut blocks: Vec<ContentBlock>) {
        reindex(&mut blocks);
        self.blocks = blocks;
        self.history.reset(self.capture());
        self.drop_stale_selection();
        self.propagate();
    }

    // ── Containers ───────────────────────────────────────────────

    pub fn change_slot_count(&mut self, container_id: &str, count: usize) -> bool {
        self.edit_container(container_id, |c| Ok(container::change_slot_count(c, count)))
            .unwrap_or(false)
    }

    pub fn set_grid_template(&mut self, container_id: &str, template: GridTemplate) -> bool {
        self.edit_container(container_id, |c| Ok(container::set_grid_template(c, template)))
            .unwrap_or(false)
    }

    /// Appends a default block to a container slot and returns its id.
    ///
    /// Fails with [`EditorError::NestedContainer`] for container types;
    /// unknown containers or slots yield `Ok(None)`.
    pub fn add_block_to_slot(
        &mut self,
        container_id: &str,
        slot: usize,
        block_type: BlockType,
    ) -> EditorResult<Option<String>> {
        if block_type.is_container() {
            return Err(EditorError::NestedContainer(block_type));
        }
        let id = self.ids.block_id();
        let block = ContentBlock::with_id(id.clone(), block_type, 0);
        let added =
            self.edit_container(container_id, |c| container::insert_into_slot(c, slot, block))?;
        Ok(added.then_some(id))
    }

    pub fn move_block_across_slots(
        &mut self,
        container_id: &str,
        block_id: &str,
        from: usize,
        to: usize,
    ) -> bool {
        self.edit_container(container_id, |c| {
            Ok(container::move_block_across_slots(c, block_id, from, to))
        })
        .unwrap_or(false)
    }

    pub fn reorder_within_slot(
        &mut self,
        container_id: &str,
        slot: usize,
        block_id: &str,
        destination: usize,
    ) -> bool {
        self.edit_container(container_id, |c| {
            Ok(container::reorder_within_slot(c, slot, block_id, destination))
        })
        .unwrap_or(false)
    }

    pub fn update_in_slot(
        &mut self,
        container_id: &str,
        slot: usize,
        block_id: &str,
        partial: &Value,
    ) -> bool {
        self.edit_container(container_id, |c| {
            Ok(container::update_in_slot(c, slot, block_id, partial))
        })
        .unwrap_or(false)
    }

    pub fn delete_from_slot(&mut self, container_id: &str, slot: usize, block_id: &str) -> bool {
        self.edit_container(container_id, |c| {
            Ok(container::delete_from_slot(c, slot, block_id))
        })
        .unwrap_or(false)
    }

    /// Applies a finished drag between container slot identifiers.
    ///
    /// Cross-slot drags move the block to the end of the target slot;
    /// same-slot drags onto another block reorder within the slot.
    pub fn handle_slot_drag(&mut self, active: &str, over: &str) -> bool {
        match SlotDrag::resolve(active, over) {
            Some(SlotDrag::CrossSlot {
                container_id,
                block_id,
                from,
                to,
            }) => self.move_block_across_slots(&container_id, &block_id, from, to),
            Some(SlotDrag::SameSlot {
                container_id,
                slot,
                block_id,
                over_block: Some(over_block),
            }) => {
                let destination = self
                    .get_block(&container_id)
                    .and_then(|c| c.slots())
                    .and_then(|slots| slots.get(slot))
                    .and_then(|blocks| position_of(blocks, &over_block));
                match destination {
                    Some(destination) => {
                        self.reorder_within_slot(&container_id, slot, &block_id, destination)
                    }
                    None => false,
                }
            }
            Some(SlotDrag::SameSlot { .. }) => false,
            None => {
                debug!(active, over, "drag ids are not slot ids");
                false
            }
        }
    }

    fn edit_container(
        &mut self,
        container_id: &str,
        edit: impl FnOnce(&ContentBlock) -> EditorResult<ContentBlock>,
    ) -> EditorResult<bool> {
        let Some(index) = position_of(&self.blocks, container_id) else {
            debug!(container_id, "unknown container");
            return Ok(false);
        };
        if !self.blocks[index].is_container() {
            debug!(container_id, "block is not a container");
            return Ok(false);
        }
        let next = edit(&self.blocks[index])?;
        if next == self.blocks[index] {
            return Ok(false);
        }
        self.blocks[index] = next;
        self.commit();
        Ok(true)
    }

    // ── Rows ─────────────────────────────────────────────────────

    /// Switches to a row layout, one row per entry of `layouts`.
    pub fn enable_rows(&mut self, layouts: &[u8]) {
        self.row_config = Some(folio_model::generate_row_config(self.blocks.len(), layouts));
        self.commit();
    }

    pub fn add_row(&mut self, layout: u8) {
        rows::add_row(self.row_config.get_or_insert_with(Vec::new), layout);
        self.commit();
    }

    pub fn delete_row(&mut self, row: usize) -> bool {
        let deleted = self
            .row_config
            .as_mut()
            .is_some_and(|config| rows::delete_row(config, row));
        if deleted {
            self.commit();
        }
        deleted
    }

    pub fn set_row_layout(&mut self, row: usize, layout: u8) -> bool {
        let changed = self
            .row_config
            .as_mut()
            .is_some_and(|config| rows::set_row_layout(config, row, layout));
        if changed {
            self.commit();
        }
        changed
    }

    /// Appends a default block at the end of `row`. A row index past the
    /// last row opens a new single-column row.
    pub fn add_block_to_row(&mut self, block_type: BlockType, row: usize) -> String {
        let config = self.row_config.get_or_insert_with(Vec::new);
        let index = if row < config.len() {
            let index = rows::row_range(config, row).end.min(self.blocks.len());
            config[row].block_count += 1;
            index
        } else {
            config.push(RowConfig {
                layout: 1,
                block_count: 1,
            });
            self.blocks.len()
        };
        let id = self.ids.block_id();
        self.blocks
            .insert(index, ContentBlock::with_id(id.clone(), block_type, 0));
        reindex(&mut self.blocks);
        debug!(%id, row, index, "block added to row");
        self.commit();
        id
    }

    /// Moves a block to `position` within `row`, moving it between rows if
    /// needed. A row left empty is removed unless it is the only one.
    pub fn move_block_to_row(&mut self, block_id: &str, row: usize, position: usize) -> bool {
        let Some(config) = self.row_config.as_mut() else {
            return false;
        };
        let Some(source_index) = position_of(&self.blocks, block_id) else {
            return false;
        };
        if row >= config.len() {
            return false;
        }
        let source_row = rows::row_of(config, source_index);
        let block = self.blocks.remove(source_index);
        if let Some(source_row) = source_row {
            config[source_row].block_count -= 1;
        }
        let position = position.min(config[row].block_count);
        let index = rows::destination_index(config, row, position).min(self.blocks.len());
        self.blocks.insert(index, block);
        config[row].block_count += 1;
        if let Some(source_row) = source_row {
            if source_row != row && config[source_row].block_count == 0 && config.len() > 1 {
                config.remove(source_row);
            }
        }
        reindex(&mut self.blocks);
        self.commit();
        true
    }

    /// Moves a whole row, blocks included, to `destination`.
    pub fn reorder_rows(&mut self, source: usize, destination: usize) -> bool {
        let Some(config) = self.row_config.as_mut() else {
            return false;
        };
        let Some((range, insert_at)) = rows::reorder_rows(config, source, destination) else {
            return false;
        };
        let end = range.end.min(self.blocks.len());
        let start = range.start.min(end);
        let moved: Vec<ContentBlock> = self.blocks.drain(start..end).collect();
        let insert_at = insert_at.min(self.blocks.len());
        self.blocks.splice(insert_at..insert_at, moved);
        reindex(&mut self.blocks);
        self.commit();
        true
    }

    // ── Propagation ──────────────────────────────────────────────

    /// Delivers any pending document to the sink now.
    pub fn flush(&mut self) {
        if let Some(propagator) = self.propagator.as_mut() {
            propagator.flush();
        }
    }

    fn capture(&self) -> Capture {
        Capture {
            blocks: self.blocks.clone(),
            row_config: self.row_config.clone(),
        }
    }

    fn commit(&mut self) {
        self.history.record(self.capture());
        self.propagate();
    }

    fn restore(&mut self, capture: Capture) {
        self.blocks = capture.blocks;
        self.row_config = capture.row_config;
        self.drop_stale_selection();
        self.propagate();
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = self.selected_id.as_deref() {
            if self.get_block(id).is_none() {
                self.selected_id = None;
            }
        }
    }

    fn propagate(&mut self) {
        if self.propagator.is_none() {
            return;
        }
        let document = self.document();
        if let Some(propagator) = self.propagator.as_mut() {
            propagator.notify(document);
        }
    }
}

impl std::fmt::Debug for BlockTreeEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockTreeEditor")
            .field("blocks", &self.blocks.len())
            .field("selected_id", &self.selected_id)
            .field("history", &self.history.len())
            .field("propagator", &self.propagator)
            .finish()
    }
}
