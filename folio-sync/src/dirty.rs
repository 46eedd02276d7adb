//! Snapshot / local state pairs.

use crate::diff::{count_changes, deep_equal};
use serde::Serialize;
use std::cell::Cell;

#[derive(Debug, Clone, Copy)]
struct DirtyStats {
    generation: u64,
    dirty: bool,
    changes: usize,
}

/// The last remote-equal state of some data next to its editable copy.
///
/// Dirtiness and the change count are computed on the JSON form and cached
/// until the next mutation.
#[derive(Debug, Clone)]
pub struct DirtyState<T> {
    snapshot: T,
    local: T,
    generation: u64,
    stats: Cell<Option<DirtyStats>>,
}

impl<T: Clone + PartialEq + Serialize> DirtyState<T> {
    /// Starts clean, with `data` as both snapshot and local state.
    pub fn new(data: T) -> Self {
        Self {
            snapshot: data.clone(),
            local: data,
            generation: 0,
            stats: Cell::new(None),
        }
    }

    /// Accepts `data` as the new remote-equal state.
    pub fn reset_snapshot(&mut self, data: T) {
        self.local = data.clone();
        self.snapshot = data;
        self.touch();
    }

    /// Replaces the remote-equal state and keeps local edits.
    pub fn set_snapshot(&mut self, data: T) {
        self.snapshot = data;
        self.touch();
    }

    /// Discards local edits.
    pub fn revert(&mut self) {
        self.local = self.snapshot.clone();
        self.touch();
    }

    pub fn snapshot(&self) -> &T {
        &self.snapshot
    }

    pub fn local(&self) -> &T {
        &self.local
    }

    /// Mutable access to the local state. Counts as a mutation.
    pub fn local_mut(&mut self) -> &mut T {
        self.touch();
        &mut self.local
    }

    pub fn set_local(&mut self, data: T) {
        self.local = data;
        self.touch();
    }

    /// True when local and snapshot differ structurally.
    pub fn is_dirty(&self) -> bool {
        self.stats().dirty
    }

    /// Number of top-level entries that differ.
    pub fn change_count(&self) -> usize {
        self.stats().changes
    }

    /// Bumped on every mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn touch(&mut self) {
        self.generation += 1;
        self.stats.set(None);
    }

    fn stats(&self) -> DirtyStats {
        if let Some(stats) = self.stats.get() {
            if stats.generation == self.generation {
                return stats;
            }
        }
        let stats = self.compute();
        self.stats.set(Some(stats));
        stats
    }

    fn compute(&self) -> DirtyStats {
        let (dirty, changes) = match (
            serde_json::to_value(&self.snapshot),
            serde_json::to_value(&self.local),
        ) {
            (Ok(snapshot), Ok(local)) => (
                !deep_equal(&snapshot, &local),
                count_changes(&snapshot, &local),
            ),
            _ => {
                let dirty = self.snapshot != self.local;
                (dirty, usize::from(dirty))
            }
        };
        DirtyStats {
            generation: self.generation,
            dirty,
            changes,
        }
    }
}

impl<T: Clone + PartialEq + Serialize + Default> Default for DirtyState<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
