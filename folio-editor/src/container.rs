//! Mutations of layout containers.
//!
//! Every function takes a container block and returns the updated copy.
//! Leaf blocks, unknown ids and out-of-range slots come back unchanged.

use crate::error::{EditorError, EditorResult};
use folio_model::{
    move_item, position_of, reindex, remove_by_id, BlockBody, BlockType, ContentBlock,
    GridTemplate,
};
use serde_json::Value;
use tracing::{debug, warn};

const GRID_TEMPLATES: [GridTemplate; 4] = [
    GridTemplate::TwoByTwo,
    GridTemplate::ThreeByOne,
    GridTemplate::OneByThree,
    GridTemplate::TwoByThree,
];

/// Resizes a container to `count` slots.
///
/// Growing appends empty slots. Shrinking moves every block of the removed
/// slots, in order, to the end of the last surviving slot. Rows accept 2 or
/// 3 columns; grids accept any count some template provides (3 picks `3x1`).
pub fn change_slot_count(container: &ContentBlock, count: usize) -> ContentBlock {
    let mut next = container.clone();
    match &mut next.body {
        BlockBody::LayoutRow(row) => {
            if !(2..=3).contains(&count) {
                debug!(id = %container.id, count, "row column count out of range, ignored");
                return next;
            }
            resize_slots(&mut row.children, count);
            row.columns = count as u8;
            if row.custom_widths.as_ref().is_some_and(|w| w.len() != count) {
                row.custom_widths = Some(vec![100.0 / count as f64; count]);
            }
        }
        BlockBody::LayoutGrid(grid) => {
            let Some(template) = GRID_TEMPLATES.into_iter().find(|t| t.cell_count() == count)
            else {
                debug!(id = %container.id, count, "no grid template with this cell count");
                return next;
            };
            resize_slots(&mut grid.children, count);
            grid.template = template;
        }
        _ => debug!(id = %container.id, "slot count change on a leaf block ignored"),
    }
    next
}

/// Switches a grid to `template`, resizing its cells.
pub fn set_grid_template(grid: &ContentBlock, template: GridTemplate) -> ContentBlock {
    let mut next = grid.clone();
    if let BlockBody::LayoutGrid(body) = &mut next.body {
        resize_slots(&mut body.children, template.cell_count());
        body.template = template;
    }
    next
}

fn resize_slots(slots: &mut Vec<Vec<ContentBlock>>, count: usize) {
    if count == 0 || count == slots.len() {
        return;
    }
    if count > slots.len() {
        slots.resize_with(count, Vec::new);
        return;
    }
    let overflow: Vec<ContentBlock> = slots.drain(count..).flatten().collect();
    if let Some(last) = slots.last_mut() {
        last.extend(overflow);
        reindex(last);
    }
}

/// Appends a default block of `block_type` to `slot`.
///
/// Container types are rejected with [`EditorError::NestedContainer`].
pub fn add_block_to_slot(
    container: &ContentBlock,
    slot: usize,
    block_type: BlockType,
) -> EditorResult<ContentBlock> {
    if block_type.is_container() {
        return Err(EditorError::NestedContainer(block_type));
    }
    insert_into_slot(container, slot, ContentBlock::new_default(block_type, 0))
}

/// Appends `block` to `slot`, rejecting containers.
pub fn insert_into_slot(
    container: &ContentBlock,
    slot: usize,
    block: ContentBlock,
) -> EditorResult<ContentBlock> {
    if block.is_container() {
        return Err(EditorError::NestedContainer(block.block_type()));
    }
    let mut next = container.clone();
    match next.slots_mut().and_then(|slots| slots.get_mut(slot)) {
        Some(target) => {
            target.push(block);
            reindex(target);
        }
        None => debug!(id = %container.id, slot, "no such slot, block not added"),
    }
    Ok(next)
}

/// Moves a block from slot `from` to the end of slot `to`.
pub fn move_block_across_slots(
    container: &ContentBlock,
    block_id: &str,
    from: usize,
    to: usize,
) -> ContentBlock {
    let mut next = container.clone();
    let Some(slots) = next.slots_mut() else {
        return next;
    };
    if from == to || from >= slots.len() || to >= slots.len() {
        debug!(block_id, from, to, "cross-slot move ignored");
        return next;
    }
    let Some(moved) = remove_by_id(&mut slots[from], block_id) else {
        debug!(block_id, from, "block not found in source slot");
        return next;
    };
    slots[to].push(moved);
    reindex(&mut slots[to]);
    next
}

/// Moves a block to `destination` inside its slot.
pub fn reorder_within_slot(
    container: &ContentBlock,
    slot: usize,
    block_id: &str,
    destination: usize,
) -> ContentBlock {
    let mut next = container.clone();
    if let Some(target) = next.slots_mut().and_then(|slots| slots.get_mut(slot)) {
        if !move_item(target, block_id, destination) {
            debug!(block_id, slot, "block not found in slot");
        }
    }
    next
}

/// Merges a partial payload into a block inside `slot`. A merge that fails
/// to parse or to validate leaves the block unchanged.
pub fn update_in_slot(
    container: &ContentBlock,
    slot: usize,
    block_id: &str,
    partial: &Value,
) -> ContentBlock {
    let mut next = container.clone();
    let Some(target) = next.slots_mut().and_then(|slots| slots.get_mut(slot)) else {
        return next;
    };
    let Some(idx) = position_of(target, block_id) else {
        debug!(block_id, slot, "block not found in slot");
        return next;
    };
    let merged = target[idx]
        .merged_with(partial)
        .and_then(|merged| merged.validate().map(|()| merged));
    match merged {
        Ok(merged) => target[idx] = merged,
        Err(e) => warn!(block_id, error = %e, "rejected slot block update"),
    }
    next
}

/// Removes a block from `slot` and reindexes the slot.
pub fn delete_from_slot(container: &ContentBlock, slot: usize, block_id: &str) -> ContentBlock {
    let mut next = container.clone();
    if let Some(target) = next.slots_mut().and_then(|slots| slots.get_mut(slot)) {
        if remove_by_id(target, block_id).is_none() {
            debug!(block_id, slot, "block not found in slot");
        }
    }
    next
}
