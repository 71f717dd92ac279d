//! Entity identifiers and content hashing.
//!
//! Items are identified as `Q<n>`, properties as `P<n>`. Parsing is
//! case-insensitive (`q42` ≡ `Q42`); the canonical form is upper-case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::InvalidArgument;

/// Kind of entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Item,
    Property,
}

impl EntityType {
    /// Returns the serialization prefix (`Q` or `P`).
    pub fn prefix(self) -> char {
        match self {
            EntityType::Item => 'Q',
            EntityType::Property => 'P',
        }
    }

    /// Returns the lower-case type name.
    pub fn name(self) -> &'static str {
        match self {
            EntityType::Item => "item",
            EntityType::Property => "property",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses `<prefix><n>` case-insensitively. Rejects zero and leading zeros.
fn parse_numeric(s: &str, prefix: char) -> Option<u64> {
    let mut chars = s.chars();
    let first = chars.next()?;
    if !first.eq_ignore_ascii_case(&prefix) {
        return None;
    }
    let digits = chars.as_str();
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Numeric id of an item (`Q<n>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(u64);

impl ItemId {
    /// Creates an item id from its numeric part.
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// Returns the numeric part.
    pub fn number(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_numeric(s.trim(), 'Q')
            .map(ItemId)
            .ok_or_else(|| InvalidArgument::MalformedEntityId { value: s.to_string() })
    }
}

impl TryFrom<String> for ItemId {
    type Error = InvalidArgument;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}

/// Numeric id of a property (`P<n>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyId(u64);

impl PropertyId {
    /// Creates a property id from its numeric part.
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// Returns the numeric part.
    pub fn number(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl FromStr for PropertyId {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_numeric(s.trim(), 'P')
            .map(PropertyId)
            .ok_or_else(|| InvalidArgument::MalformedEntityId { value: s.to_string() })
    }
}

impl TryFrom<String> for PropertyId {
    type Error = InvalidArgument;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PropertyId> for String {
    fn from(id: PropertyId) -> Self {
        id.to_string()
    }
}

/// Id of any entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityId {
    Item(ItemId),
    Property(PropertyId),
}

impl EntityId {
    /// Returns the type of entity this id names.
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityId::Item(_) => EntityType::Item,
            EntityId::Property(_) => EntityType::Property,
        }
    }

    /// Returns the item id, if this is one.
    pub fn as_item(&self) -> Option<ItemId> {
        match self {
            EntityId::Item(id) => Some(*id),
            EntityId::Property(_) => None,
        }
    }

    /// Returns the property id, if this is one.
    pub fn as_property(&self) -> Option<PropertyId> {
        match self {
            EntityId::Property(id) => Some(*id),
            EntityId::Item(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Item(id) => id.fmt(f),
            EntityId::Property(id) => id.fmt(f),
        }
    }
}

impl FromStr for EntityId {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(n) = parse_numeric(trimmed, 'Q') {
            return Ok(EntityId::Item(ItemId(n)));
        }
        if let Some(n) = parse_numeric(trimmed, 'P') {
            return Ok(EntityId::Property(PropertyId(n)));
        }
        Err(InvalidArgument::MalformedEntityId { value: s.to_string() })
    }
}

impl TryFrom<String> for EntityId {
    type Error = InvalidArgument;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

impl From<ItemId> for EntityId {
    fn from(id: ItemId) -> Self {
        EntityId::Item(id)
    }
}

impl From<PropertyId> for EntityId {
    fn from(id: PropertyId) -> Self {
        EntityId::Property(id)
    }
}

/// Incremental SHA-256 content hasher.
///
/// Every field is length-prefixed so that adjacent fields cannot run
/// together (`"ab" + "c"` hashes differently from `"a" + "bc"`).
#[derive(Debug, Clone, Default)]
pub struct ContentHasher {
    inner: Sha256,
}

impl ContentHasher {
    /// Creates a hasher seeded with a domain tag.
    pub fn new(domain: &str) -> Self {
        let mut hasher = Self { inner: Sha256::new() };
        hasher.update_str(domain);
        hasher
    }

    /// Feeds a length-prefixed byte field.
    pub fn update_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.inner.update((bytes.len() as u64).to_le_bytes());
        self.inner.update(bytes);
        self
    }

    /// Feeds a length-prefixed string field.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.update_bytes(s.as_bytes())
    }

    /// Finishes and returns the lower-case hex digest.
    pub fn finish(self) -> String {
        format_hash(self.inner.finalize().as_slice())
    }
}

/// Formats a digest as lower-case hex.
pub fn format_hash(digest: &[u8]) -> String {
    let mut s = String::with_capacity(digest.len() * 2);
    for byte in digest {
        s.push_str(&format!("{:02x}", byte));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entity_ids() {
        assert_eq!("Q42".parse::<EntityId>().unwrap(), EntityId::Item(ItemId::new(42)));
        assert_eq!("q42".parse::<ItemId>().unwrap(), ItemId::new(42));
        assert_eq!("P31".parse::<EntityId>().unwrap(), EntityId::Property(PropertyId::new(31)));
        assert_eq!("p31".parse::<PropertyId>().unwrap(), PropertyId::new(31));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "Q", "Q0", "Q042", "X42", "Q4a2", "42", "P-1"] {
            assert!(bad.parse::<EntityId>().is_err(), "{bad:?} should not parse");
        }
        assert!("P31".parse::<ItemId>().is_err());
        assert!("Q31".parse::<PropertyId>().is_err());
    }

    #[test]
    fn test_display_canonical() {
        let id: EntityId = "q149".parse().unwrap();
        assert_eq!(id.to_string(), "Q149");
        assert_eq!(id.entity_type(), EntityType::Item);
        assert_eq!(id.as_item(), Some(ItemId::new(149)));
        assert_eq!(id.as_property(), None);
    }

    #[test]
    fn test_content_hash_deterministic() {
        let mut a = ContentHasher::new("test");
        a.update_str("hello").update_str("world");
        let mut b = ContentHasher::new("test");
        b.update_str("hello").update_str("world");
        assert_eq!(a.finish(), b.finish());
    }

    #[test]
    fn test_content_hash_field_boundaries() {
        let mut a = ContentHasher::new("test");
        a.update_str("ab").update_str("c");
        let mut b = ContentHasher::new("test");
        b.update_str("a").update_str("bc");
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn test_format_hash() {
        assert_eq!(format_hash(&[0x00, 0xab, 0x10]), "00ab10");
    }
}
