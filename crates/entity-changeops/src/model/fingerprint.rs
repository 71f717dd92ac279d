//! Multilingual terms: labels, descriptions and aliases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One term per language.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermList {
    terms: BTreeMap<String, String>,
}

impl TermList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.terms.get(language).map(String::as_str)
    }

    pub fn has(&self, language: &str) -> bool {
        self.terms.contains_key(language)
    }

    /// Sets the term for `language`, returning the previous one.
    pub fn set(&mut self, language: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.terms.insert(language.into(), text.into())
    }

    /// Removes the term for `language`, returning it.
    pub fn remove(&mut self, language: &str) -> Option<String> {
        self.terms.remove(language)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterates `(language, text)` pairs in language order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.terms.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }
}

impl<L: Into<String>, T: Into<String>> FromIterator<(L, T)> for TermList {
    fn from_iter<I: IntoIterator<Item = (L, T)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().map(|(l, t)| (l.into(), t.into())).collect(),
        }
    }
}

/// Per-language alias sets.
///
/// Aliases within a language are unique; their order is kept but carries no
/// meaning. A language with no aliases is not stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasGroupList {
    groups: BTreeMap<String, Vec<String>>,
}

fn dedup_preserving_order(aliases: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for alias in aliases {
        if !out.contains(&alias) {
            out.push(alias);
        }
    }
    out
}

impl AliasGroupList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aliases for `language`; empty if none.
    pub fn get(&self, language: &str) -> &[String] {
        self.groups.get(language).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, language: &str) -> bool {
        self.groups.contains_key(language)
    }

    /// Replaces the aliases of `language`.
    pub fn set(&mut self, language: impl Into<String>, aliases: impl IntoIterator<Item = String>) {
        let language = language.into();
        let aliases = dedup_preserving_order(aliases);
        if aliases.is_empty() {
            self.groups.remove(&language);
        } else {
            self.groups.insert(language, aliases);
        }
    }

    /// Adds aliases to `language`, skipping ones already present.
    pub fn add(&mut self, language: &str, aliases: impl IntoIterator<Item = String>) {
        let merged = self.get(language).iter().cloned().chain(aliases);
        let merged: Vec<String> = merged.collect();
        self.set(language, merged);
    }

    /// Removes the given aliases from `language`.
    pub fn remove(&mut self, language: &str, aliases: &[String]) {
        let remaining: Vec<String> = self
            .get(language)
            .iter()
            .filter(|a| !aliases.contains(a))
            .cloned()
            .collect();
        self.set(language, remaining);
    }

    /// Drops all aliases of `language`, returning them.
    pub fn remove_language(&mut self, language: &str) -> Vec<String> {
        self.groups.remove(language).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(l, a)| (l.as_str(), a.as_slice()))
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Set equality for one language, ignoring order.
    pub fn same_aliases(&self, language: &str, aliases: &[String]) -> bool {
        let current = self.get(language);
        current.len() == aliases.len() && current.iter().all(|a| aliases.contains(a))
    }
}

/// Labels, descriptions and aliases of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Fingerprint {
    #[serde(default)]
    pub labels: TermList,
    #[serde(default)]
    pub descriptions: TermList,
    #[serde(default)]
    pub aliases: AliasGroupList,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.descriptions.is_empty() && self.aliases.is_empty()
    }
}
