//! Structural diffs of claims and entities.
//!
//! Three container shapes are diffed: keyed maps ([`MapDiff`]), unordered
//! lists compared by equality ([`ListDiff`]) and single values ([`DiffOp`]).

pub mod claim;
pub mod entity;

pub use claim::{ClaimDiffer, ClaimDifference};
pub use entity::{ClaimOrder, DiffConflict, DiffField, EntityDiff, EntityDiffer, EntityPatcher};

use std::collections::BTreeMap;

/// A change to one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOp<T> {
    Add(T),
    Remove(T),
    Change { old: T, new: T },
}

impl<T> DiffOp<T> {
    /// The value before the change, if there was one.
    pub fn old_value(&self) -> Option<&T> {
        match self {
            DiffOp::Add(_) => None,
            DiffOp::Remove(old) | DiffOp::Change { old, .. } => Some(old),
        }
    }

    /// The value after the change, if there is one.
    pub fn new_value(&self) -> Option<&T> {
        match self {
            DiffOp::Remove(_) => None,
            DiffOp::Add(new) | DiffOp::Change { new, .. } => Some(new),
        }
    }
}

impl<T: PartialEq> DiffOp<T> {
    /// Diff between two optional values; `None` if they are equal.
    pub fn between(old: Option<T>, new: Option<T>) -> Option<Self> {
        match (old, new) {
            (None, None) => None,
            (None, Some(new)) => Some(DiffOp::Add(new)),
            (Some(old), None) => Some(DiffOp::Remove(old)),
            (Some(old), Some(new)) if old == new => None,
            (Some(old), Some(new)) => Some(DiffOp::Change { old, new }),
        }
    }
}

/// Per-key diff of two maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDiff<K: Ord, V> {
    ops: BTreeMap<K, DiffOp<V>>,
}

impl<K: Ord, V> Default for MapDiff<K, V> {
    fn default() -> Self {
        Self {
            ops: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V: PartialEq> MapDiff<K, V> {
    /// Computes the diff from `old` to `new`.
    pub fn between(
        old: impl IntoIterator<Item = (K, V)>,
        new: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        let old: BTreeMap<K, V> = old.into_iter().collect();
        let mut new: BTreeMap<K, V> = new.into_iter().collect();

        let mut ops = BTreeMap::new();
        for (key, old_value) in old {
            let new_value = new.remove(&key);
            if let Some(op) = DiffOp::between(Some(old_value), new_value) {
                ops.insert(key, op);
            }
        }
        for (key, new_value) in new {
            ops.insert(key, DiffOp::Add(new_value));
        }
        Self { ops }
    }
}

impl<K: Ord, V> MapDiff<K, V> {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn get(&self, key: &K) -> Option<&DiffOp<V>> {
        self.ops.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &DiffOp<V>)> {
        self.ops.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.ops.keys()
    }
}

impl<K: Ord, V> FromIterator<(K, DiffOp<V>)> for MapDiff<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, DiffOp<V>)>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

/// Order-agnostic diff of two lists compared by equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDiff<T> {
    pub added: Vec<T>,
    pub removed: Vec<T>,
}

impl<T> Default for ListDiff<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<T: PartialEq + Clone> ListDiff<T> {
    /// Elements of `new` missing in `old` are added, elements of `old`
    /// missing in `new` are removed. Position changes are not reported.
    pub fn between<'a>(
        old: impl IntoIterator<Item = &'a T>,
        new: impl IntoIterator<Item = &'a T>,
    ) -> Self
    where
        T: 'a,
    {
        let old: Vec<&T> = old.into_iter().collect();
        let new: Vec<&T> = new.into_iter().collect();
        Self {
            added: new.iter().filter(|n| !old.contains(n)).map(|n| (*n).clone()).collect(),
            removed: old.iter().filter(|o| !new.contains(o)).map(|o| (*o).clone()).collect(),
        }
    }

    /// Some(diff) if the lists differ as sets.
    pub fn non_empty_between<'a>(
        old: impl IntoIterator<Item = &'a T>,
        new: impl IntoIterator<Item = &'a T>,
    ) -> Option<Self>
    where
        T: 'a,
    {
        let diff = Self::between(old, new);
        (!diff.is_empty()).then_some(diff)
    }

    /// True if one side adds what the other removes.
    pub fn conflicts_with(&self, other: &ListDiff<T>) -> bool {
        self.added.iter().any(|a| other.removed.contains(a))
            || self.removed.iter().any(|r| other.added.contains(r))
    }
}

impl<T> ListDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
