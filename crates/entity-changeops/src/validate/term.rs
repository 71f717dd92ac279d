//! Term validation: language codes, term text rules and label uniqueness.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::config::Settings;
use crate::error::ValidationError;
use crate::model::{Entity, EntityId, EntityType};
use crate::validate::ValidationResult;

/// Checks the text of a label, description or alias.
pub trait TermValidator: fmt::Debug + Send + Sync {
    fn validate(&self, text: &str) -> ValidationResult;
}

/// Default term rules: non-empty, bounded length, no surrounding whitespace,
/// no control characters.
#[derive(Debug, Clone)]
pub struct LengthTermValidator {
    max_length: usize,
}

impl LengthTermValidator {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl TermValidator for LengthTermValidator {
    fn validate(&self, text: &str) -> ValidationResult {
        if text.is_empty() {
            return ValidationResult::error(ValidationError::EmptyTerm);
        }

        let mut result = ValidationResult::ok();
        let length = text.chars().count();
        if length > self.max_length {
            result.push(ValidationError::TermTooLong {
                length,
                max: self.max_length,
            });
        }
        if text.trim() != text {
            result.push(ValidationError::TermSurroundingWhitespace);
        }
        if text.chars().any(char::is_control) {
            result.push(ValidationError::TermControlCharacters);
        }
        result
    }
}

/// Accepts only configured language codes.
#[derive(Debug, Clone, Default)]
pub struct LanguageValidator {
    codes: BTreeSet<String>,
}

impl LanguageValidator {
    pub fn new(codes: impl IntoIterator<Item = String>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    pub fn is_known(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn validate(&self, code: &str) -> ValidationResult {
        if self.is_known(code) {
            ValidationResult::ok()
        } else {
            ValidationResult::error(ValidationError::UnknownLanguage {
                code: code.to_string(),
            })
        }
    }
}

/// Looks up other entities that already use a label.
///
/// Backed by an external term index; the check is advisory.
pub trait LabelConflictFinder: fmt::Debug + Send + Sync {
    /// Entities of `entity_type` (other than `ignore`) with `label` in `language`.
    fn find_label_conflicts(
        &self,
        entity_type: EntityType,
        language: &str,
        label: &str,
        ignore: Option<EntityId>,
    ) -> Vec<EntityId>;
}

/// In-memory label index.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTermIndex {
    labels: FxHashMap<(EntityType, String, String), BTreeSet<EntityId>>,
}

impl InMemoryTermIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes the labels of `entity`. Entities without id are skipped.
    pub fn index_entity(&mut self, entity: &Entity) {
        let Some(id) = entity.id() else {
            return;
        };
        self.remove_entity(id);
        for (language, label) in entity.fingerprint().labels.iter() {
            self.labels
                .entry((entity.entity_type(), language.to_string(), label.to_string()))
                .or_default()
                .insert(id);
        }
    }

    /// Drops all labels of `id`.
    pub fn remove_entity(&mut self, id: EntityId) {
        self.labels.retain(|_, ids| {
            ids.remove(&id);
            !ids.is_empty()
        });
    }
}

impl LabelConflictFinder for InMemoryTermIndex {
    fn find_label_conflicts(
        &self,
        entity_type: EntityType,
        language: &str,
        label: &str,
        ignore: Option<EntityId>,
    ) -> Vec<EntityId> {
        let key = (entity_type, language.to_string(), label.to_string());
        self.labels
            .get(&key)
            .map(|ids| ids.iter().copied().filter(|id| Some(*id) != ignore).collect())
            .unwrap_or_default()
    }
}

/// The term validators one change op needs, bundled for cheap cloning.
#[derive(Debug, Clone)]
pub struct TermValidators {
    languages: Arc<LanguageValidator>,
    terms: Arc<dyn TermValidator>,
    conflicts: Option<Arc<dyn LabelConflictFinder>>,
}

impl TermValidators {
    pub fn new(languages: LanguageValidator, terms: Arc<dyn TermValidator>) -> Self {
        Self {
            languages: Arc::new(languages),
            terms,
            conflicts: None,
        }
    }

    /// Language and length rules from `settings`, no uniqueness check.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            LanguageValidator::new(settings.language_codes.iter().cloned()),
            Arc::new(LengthTermValidator::new(settings.max_term_length)),
        )
    }

    /// Enables the label uniqueness check.
    pub fn with_conflict_finder(mut self, finder: Arc<dyn LabelConflictFinder>) -> Self {
        self.conflicts = Some(finder);
        self
    }

    pub fn validate_language(&self, code: &str) -> ValidationResult {
        self.languages.validate(code)
    }

    pub fn validate_term(&self, text: &str) -> ValidationResult {
        self.terms.validate(text)
    }

    /// Reports other entities of the same type that use `label` in `language`.
    pub fn validate_label_uniqueness(
        &self,
        entity: &Entity,
        language: &str,
        label: &str,
    ) -> ValidationResult {
        let Some(finder) = &self.conflicts else {
            return ValidationResult::ok();
        };
        finder
            .find_label_conflicts(entity.entity_type(), language, label, entity.id())
            .into_iter()
            .map(|conflicting| ValidationError::LabelConflict {
                language: language.to_string(),
                label: label.to_string(),
                conflicting,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builder::ItemBuilder;
    use crate::model::ItemId;

    #[test]
    fn test_length_validator() {
        let validator = LengthTermValidator::new(5);
        assert!(validator.validate("abc").is_valid());
        assert_eq!(validator.validate("").errors(), &[ValidationError::EmptyTerm]);
        assert!(matches!(
            validator.validate("abcdef").errors(),
            [ValidationError::TermTooLong { length: 6, max: 5 }]
        ));
        assert_eq!(
            validator.validate(" ab").errors(),
            &[ValidationError::TermSurroundingWhitespace]
        );
        assert_eq!(
            validator.validate("a\u{7}b").errors(),
            &[ValidationError::TermControlCharacters]
        );
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        let validator = LengthTermValidator::new(3);
        assert!(validator.validate("äöü").is_valid());
    }

    #[test]
    fn test_language_validator() {
        let validator = LanguageValidator::new(["en".to_string(), "de".to_string()]);
        assert!(validator.validate("en").is_valid());
        assert!(!validator.validate("xx").is_valid());
    }

    #[test]
    fn test_term_index_conflicts() {
        let mut index = InMemoryTermIndex::new();
        let q1 = ItemBuilder::new().id(ItemId::new(1)).label("en", "Berlin").build();
        let q2 = ItemBuilder::new().id(ItemId::new(2)).label("en", "Paris").build();
        index.index_entity(&q1);
        index.index_entity(&q2);

        let conflicts = index.find_label_conflicts(EntityType::Item, "en", "Berlin", None);
        assert_eq!(conflicts, vec![EntityId::Item(ItemId::new(1))]);

        let ignored = index.find_label_conflicts(
            EntityType::Item,
            "en",
            "Berlin",
            Some(EntityId::Item(ItemId::new(1))),
        );
        assert!(ignored.is_empty());

        let other_type = index.find_label_conflicts(EntityType::Property, "en", "Berlin", None);
        assert!(other_type.is_empty());
    }

    #[test]
    fn test_reindex_replaces_labels() {
        let mut index = InMemoryTermIndex::new();
        index.index_entity(&ItemBuilder::new().id(ItemId::new(1)).label("en", "Old").build());
        index.index_entity(&ItemBuilder::new().id(ItemId::new(1)).label("en", "New").build());
        assert!(index.find_label_conflicts(EntityType::Item, "en", "Old", None).is_empty());
        assert_eq!(index.find_label_conflicts(EntityType::Item, "en", "New", None).len(), 1);
    }

    #[test]
    fn test_uniqueness_ignores_self() {
        let mut index = InMemoryTermIndex::new();
        let q1 = ItemBuilder::new().id(ItemId::new(1)).label("en", "Berlin").build();
        index.index_entity(&q1);
        let validators = TermValidators::from_settings(&Settings::default())
            .with_conflict_finder(Arc::new(index));

        assert!(validators.validate_label_uniqueness(&q1, "en", "Berlin").is_valid());
        let q2 = ItemBuilder::new().id(ItemId::new(2)).build();
        let result = validators.validate_label_uniqueness(&q2, "en", "Berlin");
        assert!(matches!(
            result.errors(),
            [ValidationError::LabelConflict { .. }]
        ));
    }
}
