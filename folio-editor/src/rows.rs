//! Row-based page layouts.
//!
//! A row config partitions the top-level block list into consecutive rows.
//! These helpers keep the partition in step with block insertions, deletions
//! and moves; the editor applies them together with the block change so both
//! land in one history entry.

use folio_model::RowConfig;
use std::ops::Range;

/// Index of the row holding the block at `block_index`, if any row does.
#[must_use]
pub fn row_of(rows: &[RowConfig], block_index: usize) -> Option<usize> {
    let mut end = 0;
    rows.iter().position(|row| {
        end += row.block_count;
        block_index < end
    })
}

/// Index of the first block of `row`.
#[must_use]
pub fn row_start(rows: &[RowConfig], row: usize) -> usize {
    rows.iter().take(row).map(|r| r.block_count).sum()
}

/// Block index range covered by `row`.
#[must_use]
pub fn row_range(rows: &[RowConfig], row: usize) -> Range<usize> {
    let start = row_start(rows, row);
    let count = rows.get(row).map_or(0, |r| r.block_count);
    start..start + count
}

/// Appends an empty row.
pub fn add_row(rows: &mut Vec<RowConfig>, layout: u8) {
    rows.push(RowConfig {
        layout: layout.clamp(1, 3),
        block_count: 0,
    });
}

/// Changes the column count of a row. Out-of-range rows are ignored.
pub fn set_row_layout(rows: &mut [RowConfig], row: usize, layout: u8) -> bool {
    match rows.get_mut(row) {
        Some(target) => {
            target.layout = layout.clamp(1, 3);
            true
        }
        None => false,
    }
}

/// Deletes a row, handing its blocks to the previous row (or to the next
/// one when deleting the first). The last remaining row is never deleted.
pub fn delete_row(rows: &mut Vec<RowConfig>, row: usize) -> bool {
    if rows.len() <= 1 || row >= rows.len() {
        return false;
    }
    let removed = rows.remove(row);
    if removed.block_count > 0 {
        let target = row.saturating_sub(1);
        rows[target].block_count += removed.block_count;
    }
    true
}

/// Accounts for a block inserted at `block_index`, which joins the row of
/// the block before it. Returns false when that position lies past every
/// row (the block then falls into the trailing overflow row).
pub fn block_inserted(rows: &mut [RowConfig], block_index: usize) -> bool {
    let owner = match block_index {
        0 => (!rows.is_empty()).then_some(0),
        idx => row_of(rows, idx - 1),
    };
    match owner.and_then(|row| rows.get_mut(row)) {
        Some(row) => {
            row.block_count += 1;
            true
        }
        None => false,
    }
}

/// Accounts for the removal of the block at `block_index`. A row left empty
/// disappears unless it is the only one.
pub fn block_removed(rows: &mut Vec<RowConfig>, block_index: usize) {
    let Some(row) = row_of(rows, block_index) else {
        return;
    };
    rows[row].block_count -= 1;
    if rows[row].block_count == 0 && rows.len() > 1 {
        rows.remove(row);
    }
}

/// Index in the flat block list of `position` within `row`, computed before
/// the moved block leaves its source row.
#[must_use]
pub fn destination_index(rows: &[RowConfig], row: usize, position: usize) -> usize {
    row_start(rows, row) + position
}

/// Moves a row to `destination`. Returns the permutation to apply to the
/// block list as `(source range, insertion index after removal)`, or `None`
/// when nothing moves.
pub fn reorder_rows(
    rows: &mut Vec<RowConfig>,
    source: usize,
    destination: usize,
) -> Option<(Range<usize>, usize)> {
    if source >= rows.len() || destination >= rows.len() || source == destination {
        return None;
    }
    let blocks = row_range(rows, source);
    let moved = rows.remove(source);
    rows.insert(destination, moved);
    Some((blocks, row_start(rows, destination)))
}
