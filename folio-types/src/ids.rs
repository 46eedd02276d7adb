//! Identifier generation and classification.
//!
//! Generation is owned by the editing session through the [`IdGenerator`]
//! capability, so two sessions never share a counter.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking an id that has not been assigned by the remote store.
pub const TEMP_ID_PREFIX: &str = "temp_";

/// Prefix of locally generated block ids.
pub const BLOCK_ID_PREFIX: &str = "block-";

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Whether an id is persisted remotely or only known locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdKind {
    Temporary,
    Persisted,
}

impl IdKind {
    /// Classifies an id by its prefix.
    #[must_use]
    pub fn of(id: &str) -> Self {
        if is_temp_id(id) {
            Self::Temporary
        } else {
            Self::Persisted
        }
    }
}

/// Returns true if `id` carries the temporary-id marker.
#[must_use]
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Rejects ids that cannot be used as record or block identifiers.
pub fn validate_id(id: &str) -> crate::Result<()> {
    if id.trim().is_empty() || id.chars().any(char::is_control) {
        return Err(crate::Error::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Generates a block id: `block-<unix millis>-<9 base36 chars>`.
///
/// Unique with overwhelming probability within a session. Not a security
/// token.
#[must_use]
pub fn generate_block_id() -> String {
    format!(
        "{BLOCK_ID_PREFIX}{}-{}",
        Utc::now().timestamp_millis(),
        base36_suffix(Uuid::new_v4().as_u128(), 9)
    )
}

fn base36_suffix(mut value: u128, len: usize) -> String {
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        out.push(char::from(BASE36[(value % 36) as usize]));
        value /= 36;
    }
    out
}

/// Source of fresh ids for one editing session.
pub trait IdGenerator: Send {
    /// Returns a fresh block id.
    fn block_id(&mut self) -> String;

    /// Returns a fresh temporary record id (always starts with [`TEMP_ID_PREFIX`]).
    fn temp_id(&mut self) -> String;
}

/// Default generator: timestamp, per-session counter and a random suffix.
#[derive(Debug, Default)]
pub struct SessionIdGenerator {
    counter: u64,
}

impl SessionIdGenerator {
    /// Creates a generator with its counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of temporary ids handed out so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.counter
    }
}

impl IdGenerator for SessionIdGenerator {
    fn block_id(&mut self) -> String {
        generate_block_id()
    }

    fn temp_id(&mut self) -> String {
        self.counter += 1;
        let suffix = Uuid::new_v4().simple().to_string();
        format!(
            "{TEMP_ID_PREFIX}{}_{}_{}",
            Utc::now().timestamp_millis(),
            self.counter,
            &suffix[..8]
        )
    }
}

/// Deterministic generator producing `b1, b2, ...` and `temp_1, temp_2, ...`.
///
/// Useful wherever reproducible ids matter, such as fixtures and replay.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    block_prefix: String,
    next_block: u64,
    next_temp: u64,
}

impl SequentialIdGenerator {
    /// Creates a generator whose block ids start with `block_prefix`.
    #[must_use]
    pub fn new(block_prefix: impl Into<String>) -> Self {
        Self {
            block_prefix: block_prefix.into(),
            next_block: 1,
            next_temp: 1,
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("b")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn block_id(&mut self) -> String {
        let id = format!("{}{}", self.block_prefix, self.next_block);
        self.next_block += 1;
        id
    }

    fn temp_id(&mut self) -> String {
        let id = format!("{TEMP_ID_PREFIX}{}", self.next_temp);
        self.next_temp += 1;
        id
    }
}
