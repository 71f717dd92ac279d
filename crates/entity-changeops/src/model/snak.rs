//! Snaks: property/value assertions, and unordered snak collections.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::id::ContentHasher;
use crate::model::{DataValue, PropertyId};

/// A property assertion in one of three value-presence states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "snaktype", rename_all = "lowercase")]
pub enum Snak {
    /// The property has no value.
    NoValue { property: PropertyId },
    /// The property has some value that is not known.
    SomeValue { property: PropertyId },
    /// The property has the given value.
    Value {
        property: PropertyId,
        value: DataValue,
    },
}

impl Snak {
    /// Creates a value snak.
    pub fn value(property: PropertyId, value: DataValue) -> Self {
        Snak::Value { property, value }
    }

    /// Returns the property this snak is about.
    pub fn property(&self) -> PropertyId {
        match self {
            Snak::NoValue { property } | Snak::SomeValue { property } | Snak::Value { property, .. } => {
                *property
            }
        }
    }

    /// Returns the data value, for value snaks.
    pub fn data_value(&self) -> Option<&DataValue> {
        match self {
            Snak::Value { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns the content hash of this snak.
    ///
    /// The hash covers the snak type, the property and the value; two equal
    /// snaks always hash equally.
    pub fn hash(&self) -> String {
        let mut hasher = ContentHasher::new("snak");
        self.hash_into(&mut hasher);
        hasher.finish()
    }

    pub(crate) fn hash_into(&self, hasher: &mut ContentHasher) {
        match self {
            Snak::NoValue { property } => {
                hasher.update_str("novalue").update_str(&property.to_string());
            }
            Snak::SomeValue { property } => {
                hasher.update_str("somevalue").update_str(&property.to_string());
            }
            Snak::Value { property, value } => {
                hasher.update_str("value").update_str(&property.to_string());
                value.hash_into(hasher);
            }
        }
    }
}

impl fmt::Display for Snak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Snak::NoValue { property } => write!(f, "{property}: no value"),
            Snak::SomeValue { property } => write!(f, "{property}: unknown value"),
            Snak::Value { property, value } => write!(f, "{property}: {value:?}"),
        }
    }
}

/// An unordered set of snaks keyed by content hash.
///
/// Iteration follows insertion order, but equality ignores order.
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnakList {
    snaks: Vec<Snak>,
}

impl SnakList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a snak unless an equal one is present. Returns true if added.
    pub fn add(&mut self, snak: Snak) -> bool {
        if self.snaks.contains(&snak) {
            return false;
        }
        self.snaks.push(snak);
        true
    }

    /// Removes the snak with the given hash. Returns the removed snak.
    pub fn remove_by_hash(&mut self, hash: &str) -> Option<Snak> {
        let pos = self.snaks.iter().position(|s| s.hash() == hash)?;
        Some(self.snaks.remove(pos))
    }

    /// Replaces the snak with hash `hash` by `snak`, keeping its position.
    pub fn replace_by_hash(&mut self, hash: &str, snak: Snak) -> Option<Snak> {
        let pos = self.snaks.iter().position(|s| s.hash() == hash)?;
        Some(std::mem::replace(&mut self.snaks[pos], snak))
    }

    /// Returns the snak with the given hash.
    pub fn get_by_hash(&self, hash: &str) -> Option<&Snak> {
        self.snaks.iter().find(|s| s.hash() == hash)
    }

    /// Returns true if an equal snak is present.
    pub fn contains(&self, snak: &Snak) -> bool {
        self.snaks.contains(snak)
    }

    /// Returns true if a snak with the given hash is present.
    pub fn contains_hash(&self, hash: &str) -> bool {
        self.get_by_hash(hash).is_some()
    }

    pub fn len(&self) -> usize {
        self.snaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snaks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snak> {
        self.snaks.iter()
    }

    /// Returns the hashes of all snaks, sorted.
    pub fn sorted_hashes(&self) -> Vec<String> {
        let mut hashes: Vec<String> = self.snaks.iter().map(Snak::hash).collect();
        hashes.sort();
        hashes
    }

    /// Order-independent hash of the whole list.
    pub fn hash(&self) -> String {
        let mut hasher = ContentHasher::new("snak-list");
        for h in self.sorted_hashes() {
            hasher.update_str(&h);
        }
        hasher.finish()
    }
}

impl PartialEq for SnakList {
    fn eq(&self, other: &Self) -> bool {
        self.snaks.len() == other.snaks.len() && self.snaks.iter().all(|s| other.snaks.contains(s))
    }
}

impl FromIterator<Snak> for SnakList {
    fn from_iter<I: IntoIterator<Item = Snak>>(iter: I) -> Self {
        let mut list = SnakList::new();
        for snak in iter {
            list.add(snak);
        }
        list
    }
}

impl<'a> IntoIterator for &'a SnakList {
    type Item = &'a Snak;
    type IntoIter = std::slice::Iter<'a, Snak>;

    fn into_iter(self) -> Self::IntoIter {
        self.snaks.iter()
    }
}
