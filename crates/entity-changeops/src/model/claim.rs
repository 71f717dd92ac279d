//! Claims, statements, references and the per-entity statement list.

use serde::{Deserialize, Serialize};

use crate::model::id::ContentHasher;
use crate::model::{PropertyId, Snak, SnakList};

/// A main snak with qualifiers, identified by a guid once attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// `<entity id>$<uuid>`, or `None` before the claim is attached.
    pub guid: Option<String>,
    pub main_snak: Snak,
    #[serde(default)]
    pub qualifiers: SnakList,
}

impl Claim {
    /// Creates a claim with no guid and no qualifiers.
    pub fn new(main_snak: Snak) -> Self {
        Self {
            guid: None,
            main_snak,
            qualifiers: SnakList::new(),
        }
    }

    /// Returns the property of the main snak.
    pub fn property(&self) -> PropertyId {
        self.main_snak.property()
    }

    /// Content hash over main snak and qualifiers. The guid is not included.
    pub fn hash(&self) -> String {
        let mut hasher = ContentHasher::new("claim");
        self.hash_into(&mut hasher);
        hasher.finish()
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        self.main_snak.hash_into(hasher);
        hasher.update_str(&self.qualifiers.hash());
    }
}

/// Statement rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Preferred,
    #[default]
    Normal,
    Deprecated,
}

impl Rank {
    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Preferred => "preferred",
            Rank::Normal => "normal",
            Rank::Deprecated => "deprecated",
        }
    }

    /// Parses a lower-case rank name.
    pub fn from_name(name: &str) -> Option<Rank> {
        match name {
            "preferred" => Some(Rank::Preferred),
            "normal" => Some(Rank::Normal),
            "deprecated" => Some(Rank::Deprecated),
            _ => None,
        }
    }
}

/// A set of snaks documenting a source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference {
    pub snaks: SnakList,
}

impl Reference {
    pub fn new(snaks: SnakList) -> Self {
        Self { snaks }
    }

    /// Hash derived from the snak set (order-independent).
    pub fn hash(&self) -> String {
        let mut hasher = ContentHasher::new("reference");
        hasher.update_str(&self.snaks.hash());
        hasher.finish()
    }
}

impl FromIterator<Snak> for Reference {
    fn from_iter<I: IntoIterator<Item = Snak>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Ordered list of references without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceList {
    references: Vec<Reference>,
}

impl ReferenceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reference at `index` (or at the end). Returns false if a
    /// reference with the same hash is already present.
    pub fn add(&mut self, reference: Reference, index: Option<usize>) -> bool {
        if self.contains_hash(&reference.hash()) {
            return false;
        }
        match index {
            Some(i) => self.references.insert(i.min(self.references.len()), reference),
            None => self.references.push(reference),
        }
        true
    }

    /// Returns the position of the reference with the given hash.
    pub fn index_of_hash(&self, hash: &str) -> Option<usize> {
        self.references.iter().position(|r| r.hash() == hash)
    }

    pub fn get_by_hash(&self, hash: &str) -> Option<&Reference> {
        self.references.iter().find(|r| r.hash() == hash)
    }

    pub fn contains_hash(&self, hash: &str) -> bool {
        self.index_of_hash(hash).is_some()
    }

    /// Removes the reference with the given hash.
    pub fn remove_by_hash(&mut self, hash: &str) -> Option<Reference> {
        let pos = self.index_of_hash(hash)?;
        Some(self.references.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reference> {
        self.references.iter()
    }

    /// Hash over the references in order.
    pub fn hash(&self) -> String {
        let mut hasher = ContentHasher::new("reference-list");
        for reference in &self.references {
            hasher.update_str(&reference.hash());
        }
        hasher.finish()
    }
}

impl FromIterator<Reference> for ReferenceList {
    fn from_iter<I: IntoIterator<Item = Reference>>(iter: I) -> Self {
        let mut list = ReferenceList::new();
        for reference in iter {
            list.add(reference, None);
        }
        list
    }
}

impl<'a> IntoIterator for &'a ReferenceList {
    type Item = &'a Reference;
    type IntoIter = std::slice::Iter<'a, Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.references.iter()
    }
}

/// A claim with rank and references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub claim: Claim,
    #[serde(default)]
    pub rank: Rank,
    #[serde(default)]
    pub references: ReferenceList,
}

impl Statement {
    /// Creates a normal-rank statement without references.
    pub fn new(main_snak: Snak) -> Self {
        Self::from_claim(Claim::new(main_snak))
    }

    pub fn from_claim(claim: Claim) -> Self {
        Self {
            claim,
            rank: Rank::Normal,
            references: ReferenceList::new(),
        }
    }

    pub fn guid(&self) -> Option<&str> {
        self.claim.guid.as_deref()
    }

    pub fn set_guid(&mut self, guid: impl Into<String>) {
        self.claim.guid = Some(guid.into());
    }

    pub fn main_snak(&self) -> &Snak {
        &self.claim.main_snak
    }

    pub fn property(&self) -> PropertyId {
        self.claim.property()
    }

    /// Content hash over main snak, qualifiers, rank and references.
    pub fn hash(&self) -> String {
        let mut hasher = ContentHasher::new("statement");
        self.claim.hash_into(&mut hasher);
        hasher.update_str(self.rank.as_str());
        hasher.update_str(&self.references.hash());
        hasher.finish()
    }
}

/// Read access to the claim part of a claim or statement.
///
/// Bare claims have no rank and no references.
pub trait AsClaim {
    fn as_claim(&self) -> &Claim;

    fn rank(&self) -> Option<Rank> {
        None
    }

    fn references(&self) -> Option<&ReferenceList> {
        None
    }
}

impl AsClaim for Claim {
    fn as_claim(&self) -> &Claim {
        self
    }
}

impl AsClaim for Statement {
    fn as_claim(&self) -> &Claim {
        &self.claim
    }

    fn rank(&self) -> Option<Rank> {
        Some(self.rank)
    }

    fn references(&self) -> Option<&ReferenceList> {
        Some(&self.references)
    }
}

/// Ordered statements of one entity, addressed by guid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementList {
    statements: Vec<Statement>,
}

impl StatementList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    /// Position of the statement with the given guid.
    pub fn index_of_guid(&self, guid: &str) -> Option<usize> {
        self.statements.iter().position(|s| s.guid() == Some(guid))
    }

    pub fn get_by_guid(&self, guid: &str) -> Option<&Statement> {
        self.statements.iter().find(|s| s.guid() == Some(guid))
    }

    pub fn get_by_guid_mut(&mut self, guid: &str) -> Option<&mut Statement> {
        self.statements.iter_mut().find(|s| s.guid() == Some(guid))
    }

    /// Appends a statement.
    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Inserts or replaces a statement by guid.
    ///
    /// An existing statement with the same guid is replaced in place, or moved
    /// to `index` when one is given. New statements go to `index` or the end.
    /// Indexes past the end are clamped.
    pub fn set(&mut self, statement: Statement, index: Option<usize>) {
        let existing = statement.guid().and_then(|g| self.index_of_guid(g));
        match (existing, index) {
            (Some(pos), None) => self.statements[pos] = statement,
            (Some(pos), Some(target)) => {
                self.statements.remove(pos);
                let target = target.min(self.statements.len());
                self.statements.insert(target, statement);
            }
            (None, Some(target)) => {
                let target = target.min(self.statements.len());
                self.statements.insert(target, statement);
            }
            (None, None) => self.statements.push(statement),
        }
    }

    /// Removes and returns the statement with the given guid.
    pub fn remove_by_guid(&mut self, guid: &str) -> Option<Statement> {
        let pos = self.index_of_guid(guid)?;
        Some(self.statements.remove(pos))
    }

    /// Returns true if a statement with this content hash is present.
    pub fn contains_hash(&self, hash: &str) -> bool {
        self.statements.iter().any(|s| s.hash() == hash)
    }

    /// Statements whose main snak uses `property`.
    pub fn by_property(&self, property: PropertyId) -> impl Iterator<Item = &Statement> {
        self.statements.iter().filter(move |s| s.property() == property)
    }

    /// Removes all statements, returning them in order.
    pub fn take_all(&mut self) -> Vec<Statement> {
        std::mem::take(&mut self.statements)
    }

    pub fn retain(&mut self, keep: impl FnMut(&Statement) -> bool) {
        self.statements.retain(keep);
    }

    /// Guids in list order. Statements without a guid are skipped.
    pub fn guids(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().filter_map(Statement::guid)
    }

    /// Puts the statements with the given guids into that order.
    ///
    /// The listed statements swap among the positions they already occupy;
    /// all others stay where they are. Guids that are not present are
    /// ignored.
    pub fn reorder(&mut self, order: &[&str]) {
        let slots: Vec<usize> = self
            .statements
            .iter()
            .enumerate()
            .filter(|(_, s)| s.guid().is_some_and(|g| order.contains(&g)))
            .map(|(pos, _)| pos)
            .collect();
        let ordered: Vec<Statement> = order
            .iter()
            .filter_map(|guid| self.get_by_guid(guid).cloned())
            .collect();
        if slots.len() != ordered.len() {
            return;
        }
        for (pos, statement) in slots.into_iter().zip(ordered) {
            self.statements[pos] = statement;
        }
    }
}

impl FromIterator<Statement> for StatementList {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a StatementList {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}
