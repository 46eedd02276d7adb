//! Sibling ordering.
//!
//! Every ordered list in Folio keeps `items[i].order() == i`. The helpers
//! below mutate a list and restore that invariant before returning.

/// A record with a stable id and a position among its siblings.
pub trait Ordered {
    fn id(&self) -> &str;
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

/// Rewrites `order` so it matches each item's index.
pub fn reindex<T: Ordered>(items: &mut [T]) {
    for (idx, item) in items.iter_mut().enumerate() {
        item.set_order(idx as u32);
    }
}

/// Returns true if `items[i].order() == i` for every item.
#[must_use]
pub fn is_contiguous<T: Ordered>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(idx, item)| item.order() as usize == idx)
}

/// Index of the item with the given id.
#[must_use]
pub fn position_of<T: Ordered>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Inserts `item` right after `after_id`, or at the end when `after_id` is
/// `None` or unknown. Returns the insertion index.
pub fn insert_after<T: Ordered>(items: &mut Vec<T>, item: T, after_id: Option<&str>) -> usize {
    let index = after_id
        .and_then(|id| position_of(items, id))
        .map_or(items.len(), |idx| idx + 1);
    items.insert(index, item);
    reindex(items);
    index
}

/// Removes the item with the given id and reindexes the rest.
pub fn remove_by_id<T: Ordered>(items: &mut Vec<T>, id: &str) -> Option<T> {
    let idx = position_of(items, id)?;
    let removed = items.remove(idx);
    reindex(items);
    Some(removed)
}

/// Moves the item with id `id` to `destination`.
///
/// A destination past the end appends. Returns false (and leaves the list
/// untouched) when the id is unknown.
pub fn move_item<T: Ordered>(items: &mut Vec<T>, id: &str, destination: usize) -> bool {
    let Some(source) = position_of(items, id) else {
        return false;
    };
    let moved = items.remove(source);
    let destination = destination.min(items.len());
    items.insert(destination, moved);
    reindex(items);
    true
}
