//! Structural comparison and save planning.

use folio_model::Entity;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Deep structural equality of two JSON values.
///
/// Numbers compare by value, so `1` equals `1.0`. Object key order is
/// irrelevant.
#[must_use]
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| deep_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => fields_equal(x, y),
        _ => a == b,
    }
}

/// [`deep_equal`] for two JSON objects.
#[must_use]
pub fn fields_equal(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| deep_equal(value, other)))
}

/// Number of top-level differences between two values.
///
/// Arrays compare index by index, each extra or missing entry counting once.
/// Objects count differing keys. Any other unequal pair counts as one.
#[must_use]
pub fn count_changes(snapshot: &Value, current: &Value) -> usize {
    if deep_equal(snapshot, current) {
        return 0;
    }
    match (snapshot, current) {
        (Value::Array(s), Value::Array(c)) => {
            let shared = s.iter().zip(c).filter(|(a, b)| !deep_equal(a, b)).count();
            shared + s.len().abs_diff(c.len())
        }
        (Value::Object(s), Value::Object(c)) => {
            let keys: HashSet<&String> = s.keys().chain(c.keys()).collect();
            keys.into_iter()
                .filter(|key| match (s.get(*key), c.get(*key)) {
                    (Some(a), Some(b)) => !deep_equal(a, b),
                    _ => true,
                })
                .count()
        }
        _ => 1,
    }
}

/// The remote operations needed to turn `snapshot` into `local`, apart
/// from the reorders of newly created records, whose remote positions are
/// only known once they exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    /// Snapshot ids missing from local, in snapshot order.
    pub deletes: Vec<String>,
    /// Local records pending creation, in local order.
    pub creates: Vec<Entity>,
    /// Persisted records whose fields changed, in local order.
    pub updates: Vec<Entity>,
    /// Persisted records whose position changed, with the new position.
    pub reorders: Vec<(String, u32)>,
}

impl SyncPlan {
    /// Diffs two collections by id.
    ///
    /// A local record is pending creation when its id is temporary or absent
    /// from the snapshot. A persisted record is reordered when its local
    /// `order` differs from its index in the snapshot.
    #[must_use]
    pub fn between(snapshot: &[Entity], local: &[Entity]) -> Self {
        let positions: HashMap<&str, (usize, &Entity)> = snapshot
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.id.as_str(), (idx, item)))
            .collect();
        let local_ids: HashSet<&str> = local.iter().map(|item| item.id.as_str()).collect();

        let mut plan = Self {
            deletes: snapshot
                .iter()
                .filter(|item| !local_ids.contains(item.id.as_str()))
                .map(|item| item.id.clone())
                .collect(),
            ..Self::default()
        };

        for item in local {
            match positions.get(item.id.as_str()) {
                Some((position, persisted)) if !item.is_temporary() => {
                    if !fields_equal(&item.fields, &persisted.fields) {
                        plan.updates.push(item.clone());
                    }
                    if item.order as usize != *position {
                        plan.reorders.push((item.id.clone(), item.order));
                    }
                }
                _ => plan.creates.push(item.clone()),
            }
        }
        plan
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operation_count() == 0
    }

    /// Planned remote calls, not counting follow-up reorders of creations.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.deletes.len() + self.creates.len() + self.updates.len() + self.reorders.len()
    }
}
