//! Drag identifiers for blocks inside layout containers.
//!
//! A draggable block is addressed as `row:{container}:col:{slot}:{block}` or
//! `grid:{container}:cell:{slot}:{block}`; a slot drop zone drops the
//! trailing block id.

use std::fmt;

/// Which kind of container a drag identifier points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Row,
    Grid,
}

impl ContainerKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Grid => "grid",
        }
    }

    fn slot_word(self) -> &'static str {
        match self {
            Self::Row => "col",
            Self::Grid => "cell",
        }
    }
}

/// A parsed drag identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRef {
    pub kind: ContainerKind,
    pub container_id: String,
    pub slot: usize,
    /// `None` for a slot drop zone.
    pub block_id: Option<String>,
}

impl SlotRef {
    /// Identifier of a draggable block.
    pub fn block(kind: ContainerKind, container_id: &str, slot: usize, block_id: &str) -> Self {
        Self {
            kind,
            container_id: container_id.to_string(),
            slot,
            block_id: Some(block_id.to_string()),
        }
    }

    /// Identifier of a slot drop zone.
    pub fn zone(kind: ContainerKind, container_id: &str, slot: usize) -> Self {
        Self {
            kind,
            container_id: container_id.to_string(),
            slot,
            block_id: None,
        }
    }

    /// Parses a drag identifier. Returns `None` for anything that is not a
    /// slot identifier, including top-level block ids.
    pub fn parse(raw: &str) -> Option<Self> {
        [ContainerKind::Row, ContainerKind::Grid]
            .into_iter()
            .find_map(|kind| Self::parse_as(kind, raw))
    }

    fn parse_as(kind: ContainerKind, raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix(kind.prefix())?.strip_prefix(':')?;
        let marker = format!(":{}:", kind.slot_word());
        let (container_id, tail) = rest.split_once(&marker)?;
        if container_id.is_empty() {
            return None;
        }
        let (slot, block_id) = match tail.split_once(':') {
            Some((slot, block)) if !block.is_empty() => (slot, Some(block.to_string())),
            Some(_) => return None,
            None => (tail, None),
        };
        if slot.is_empty() || !slot.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            kind,
            container_id: container_id.to_string(),
            slot: slot.parse().ok()?,
            block_id,
        })
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.kind.prefix(),
            self.container_id,
            self.kind.slot_word(),
            self.slot
        )?;
        if let Some(block_id) = &self.block_id {
            write!(f, ":{block_id}")?;
        }
        Ok(())
    }
}

/// What a finished drag inside a container means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotDrag {
    /// Move `block_id` from slot `from` to the end of slot `to`.
    CrossSlot {
        container_id: String,
        block_id: String,
        from: usize,
        to: usize,
    },
    /// Both ends are in one slot; handled as an ordinary reorder. `over_block`
    /// is `None` when dropped on the slot's own zone.
    SameSlot {
        container_id: String,
        slot: usize,
        block_id: String,
        over_block: Option<String>,
    },
}

impl SlotDrag {
    /// Interprets a drag from `active` (a block) onto `over` (a block or a
    /// zone). `None` when either id is unparsable, the active id is a zone,
    /// or the ends belong to different containers.
    pub fn resolve(active: &str, over: &str) -> Option<Self> {
        let active = SlotRef::parse(active)?;
        let over = SlotRef::parse(over)?;
        let block_id = active.block_id?;
        if active.container_id != over.container_id {
            return None;
        }
        if active.slot != over.slot {
            return Some(Self::CrossSlot {
                container_id: active.container_id,
                block_id,
                from: active.slot,
                to: over.slot,
            });
        }
        Some(Self::SameSlot {
            container_id: active.container_id,
            slot: active.slot,
            block_id,
            over_block: over.block_id,
        })
    }
}
