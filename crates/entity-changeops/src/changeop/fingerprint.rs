//! Term change ops: labels, descriptions and aliases.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::changeop::ChangeOp;
use crate::error::{ChangeOpError, ValidationError};
use crate::model::summary::update_summary;
use crate::model::{Entity, Summary, SummaryArg, TermList};
use crate::validate::{TermValidators, ValidationResult};

/// Sets or removes the term of one language in `terms`, returning the
/// summary action and argument.
fn apply_term(terms: &mut TermList, language: &str, value: Option<&str>) -> (&'static str, String) {
    match value {
        Some(value) => {
            let action = if terms.has(language) { "set" } else { "add" };
            terms.set(language, value);
            (action, value.to_string())
        }
        None => {
            let old = terms.remove(language).unwrap_or_default();
            ("remove", old)
        }
    }
}

/// Language and term checks shared by labels and descriptions.
fn validate_term(validators: &TermValidators, language: &str, value: Option<&str>) -> ValidationResult {
    let mut result = validators.validate_language(language);
    if let Some(value) = value {
        result.merge(validators.validate_term(value));
    }
    result
}

/// Sets (`Some`) or removes (`None`) the label of one language.
#[derive(Debug, Clone)]
pub struct ChangeOpLabel {
    language: String,
    label: Option<String>,
    validators: TermValidators,
}

impl ChangeOpLabel {
    pub fn new(language: &str, label: Option<&str>, validators: TermValidators) -> Self {
        Self {
            language: language.to_string(),
            label: label.map(str::to_string),
            validators,
        }
    }
}

impl ChangeOp for ChangeOpLabel {
    fn validate(&self, entity: &Entity) -> ValidationResult {
        let label = self.label.as_deref();
        let mut result = validate_term(&self.validators, &self.language, label);
        if let Some(label) = label {
            if entity.fingerprint().descriptions.get(&self.language) == Some(label) {
                result.push(ValidationError::LabelEqualsDescription {
                    language: self.language.clone(),
                });
            }
            result.merge(
                self.validators
                    .validate_label_uniqueness(entity, &self.language, label),
            );
        }
        result
    }

    fn apply(
        &mut self,
        entity: &mut Entity,
        summary: Option<&mut Summary>,
    ) -> Result<(), ChangeOpError> {
        let labels = &mut entity.fingerprint_mut().labels;
        let (action, arg) = apply_term(labels, &self.language, self.label.as_deref());
        debug!(language = %self.language, action, "applied label change");
        update_summary(summary, action, Some(&self.language), vec![arg.into()]);
        Ok(())
    }
}

/// Sets (`Some`) or removes (`None`) the description of one language.
#[derive(Debug, Clone)]
pub struct ChangeOpDescription {
    language: String,
    description: Option<String>,
    validators: TermValidators,
}

impl ChangeOpDescription {
    pub fn new(language: &str, description: Option<&str>, validators: TermValidators) -> Self {
        Self {
            language: language.to_string(),
            description: description.map(str::to_string),
            validators,
        }
    }
}

impl ChangeOp for ChangeOpDescription {
    fn validate(&self, entity: &Entity) -> ValidationResult {
        let description = self.description.as_deref();
        let mut result = validate_term(&self.validators, &self.language, description);
        if let Some(description) = description {
            if entity.fingerprint().labels.get(&self.language) == Some(description) {
                result.push(ValidationError::LabelEqualsDescription {
                    language: self.language.clone(),
                });
            }
        }
        result
    }

    fn apply(
        &mut self,
        entity: &mut Entity,
        summary: Option<&mut Summary>,
    ) -> Result<(), ChangeOpError> {
        let descriptions = &mut entity.fingerprint_mut().descriptions;
        let (action, arg) = apply_term(descriptions, &self.language, self.description.as_deref());
        debug!(language = %self.language, action, "applied description change");
        update_summary(summary, action, Some(&self.language), vec![arg.into()]);
        Ok(())
    }
}

/// What an alias op does with the given aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasAction {
    /// Union with the existing aliases.
    Add,
    /// Replace the existing aliases.
    Set,
    /// Remove the given aliases.
    Remove,
}

impl AliasAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AliasAction::Add => "add",
            AliasAction::Set => "set",
            AliasAction::Remove => "remove",
        }
    }
}

impl fmt::Display for AliasAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses `"add"`, `"set"` or `"remove"`; the empty string means `Set`.
impl FromStr for AliasAction {
    type Err = ChangeOpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(AliasAction::Add),
            "set" | "" => Ok(AliasAction::Set),
            "remove" => Ok(AliasAction::Remove),
            other => Err(ChangeOpError::UnknownAliasAction {
                action: other.to_string(),
            }),
        }
    }
}

/// Adds, replaces or removes aliases of one language.
///
/// An unrecognised action keyword is accepted at construction and reported
/// when the op is applied.
#[derive(Debug, Clone)]
pub struct ChangeOpAliases {
    language: String,
    aliases: Vec<String>,
    action: Result<AliasAction, String>,
    validators: TermValidators,
}

impl ChangeOpAliases {
    /// Builds the op from a raw action keyword.
    pub fn new(language: &str, aliases: Vec<String>, action: &str, validators: TermValidators) -> Self {
        let action = action.parse::<AliasAction>().map_err(|_| action.to_string());
        Self {
            language: language.to_string(),
            aliases,
            action,
            validators,
        }
    }

    pub fn with_action(
        language: &str,
        aliases: Vec<String>,
        action: AliasAction,
        validators: TermValidators,
    ) -> Self {
        Self {
            language: language.to_string(),
            aliases,
            action: Ok(action),
            validators,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

impl ChangeOp for ChangeOpAliases {
    fn validate(&self, _entity: &Entity) -> ValidationResult {
        let mut result = self.validators.validate_language(&self.language);
        if self.action != Ok(AliasAction::Remove) {
            for alias in &self.aliases {
                result.merge(self.validators.validate_term(alias));
            }
        }
        result
    }

    fn apply(
        &mut self,
        entity: &mut Entity,
        summary: Option<&mut Summary>,
    ) -> Result<(), ChangeOpError> {
        let action = self
            .action
            .clone()
            .map_err(|action| ChangeOpError::UnknownAliasAction { action })?;

        let aliases = &mut entity.fingerprint_mut().aliases;
        match action {
            AliasAction::Add => aliases.add(&self.language, self.aliases.iter().cloned()),
            AliasAction::Set => aliases.set(self.language.as_str(), self.aliases.iter().cloned()),
            AliasAction::Remove => aliases.remove(&self.language, &self.aliases),
        }
        debug!(language = %self.language, %action, count = self.aliases.len(), "applied alias change");

        let args: Vec<SummaryArg> = self.aliases.iter().map(|a| a.as_str().into()).collect();
        update_summary(summary, action.as_str(), Some(&self.language), args);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::model::builder::ItemBuilder;
    use crate::model::ItemId;

    fn validators() -> TermValidators {
        TermValidators::from_settings(&Settings::default())
    }

    fn strings(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_label_summary_actions() {
        let mut entity = ItemBuilder::new().id(ItemId::new(1)).build();
        let mut summary = Summary::new();

        ChangeOpLabel::new("en", Some("foo"), validators())
            .apply(&mut entity, Some(&mut summary))
            .unwrap();
        assert_eq!(summary.action_name.as_deref(), Some("add"));
        assert_eq!(summary.language_code.as_deref(), Some("en"));

        ChangeOpLabel::new("en", Some("bar"), validators())
            .apply(&mut entity, Some(&mut summary))
            .unwrap();
        assert_eq!(summary.action_name.as_deref(), Some("set"));
        assert_eq!(entity.fingerprint().labels.get("en"), Some("bar"));

        ChangeOpLabel::new("en", None, validators())
            .apply(&mut entity, Some(&mut summary))
            .unwrap();
        assert_eq!(summary.action_name.as_deref(), Some("remove"));
        assert_eq!(summary.auto_summary_args, vec![SummaryArg::Text("bar".to_string())]);
        assert!(!entity.fingerprint().labels.has("en"));
    }

    #[test]
    fn test_label_validation() {
        let entity = ItemBuilder::new()
            .id(ItemId::new(1))
            .description("en", "same")
            .build();
        let op = ChangeOpLabel::new("en", Some("same"), validators());
        assert_eq!(
            op.validate(&entity).errors(),
            &[ValidationError::LabelEqualsDescription {
                language: "en".to_string()
            }]
        );

        let op = ChangeOpLabel::new("en", Some(" padded"), validators());
        assert!(!op.validate(&entity).is_valid());

        let op = ChangeOpLabel::new("en", None, validators());
        assert!(op.validate(&entity).is_valid());
    }

    #[test]
    fn test_description_set_and_remove() {
        let mut entity = ItemBuilder::new().id(ItemId::new(1)).build();
        let mut op = ChangeOpDescription::new("de", Some("Hauptstadt"), validators());
        assert!(op.validate(&entity).is_valid());
        op.apply(&mut entity, None).unwrap();
        assert_eq!(entity.fingerprint().descriptions.get("de"), Some("Hauptstadt"));

        ChangeOpDescription::new("de", None, validators())
            .apply(&mut entity, None)
            .unwrap();
        assert!(entity.fingerprint().descriptions.is_empty());
    }

    #[test]
    fn test_alias_action_parse() {
        assert_eq!("add".parse::<AliasAction>().unwrap(), AliasAction::Add);
        assert_eq!("".parse::<AliasAction>().unwrap(), AliasAction::Set);
        assert_eq!("remove".parse::<AliasAction>().unwrap(), AliasAction::Remove);
        assert!(matches!(
            "replace".parse::<AliasAction>(),
            Err(ChangeOpError::UnknownAliasAction { .. })
        ));
    }

    #[test]
    fn test_aliases_add_set_remove() {
        let existing = ["en-existingAlias1", "en-existingAlias2"];
        let new = strings(&["en-alias1", "en-alias2", "en-alias3"]);
        let base = ItemBuilder::new().id(ItemId::new(1)).aliases("en", existing).build();

        let mut entity = base.clone();
        ChangeOpAliases::new("en", new.clone(), "add", validators())
            .apply(&mut entity, None)
            .unwrap();
        let mut expected = strings(&existing);
        expected.extend(new.clone());
        assert!(entity.fingerprint().aliases.same_aliases("en", &expected));

        let mut entity = base.clone();
        ChangeOpAliases::new("en", new.clone(), "set", validators())
            .apply(&mut entity, None)
            .unwrap();
        assert_eq!(entity.fingerprint().aliases.get("en"), new.as_slice());

        let mut entity = base.clone();
        ChangeOpAliases::new("en", strings(&existing), "remove", validators())
            .apply(&mut entity, None)
            .unwrap();
        assert!(entity.fingerprint().aliases.get("en").is_empty());
    }

    #[test]
    fn test_empty_action_behaves_as_set() {
        let mut entity = ItemBuilder::new().id(ItemId::new(1)).aliases("en", ["old"]).build();
        let mut summary = Summary::new();
        ChangeOpAliases::new("en", strings(&["new"]), "", validators())
            .apply(&mut entity, Some(&mut summary))
            .unwrap();
        assert_eq!(entity.fingerprint().aliases.get("en"), strings(&["new"]).as_slice());
        assert_eq!(summary.action_name.as_deref(), Some("set"));
    }

    #[test]
    fn test_unknown_action_fails_on_apply_only() {
        let mut op = ChangeOpAliases::new("en", strings(&["a"]), "replace", validators());
        let mut entity = ItemBuilder::new().id(ItemId::new(1)).build();
        assert!(op.validate(&entity).is_valid());
        let before = entity.clone();
        assert_eq!(
            op.apply(&mut entity, None),
            Err(ChangeOpError::UnknownAliasAction {
                action: "replace".to_string()
            })
        );
        assert_eq!(entity, before);
    }

    #[test]
    fn test_alias_validation() {
        let entity = ItemBuilder::new().id(ItemId::new(1)).build();
        let op = ChangeOpAliases::with_action("en", strings(&["ok", ""]), AliasAction::Add, validators());
        assert_eq!(op.validate(&entity).errors(), &[ValidationError::EmptyTerm]);
        assert_eq!(op.language(), "en");
        assert_eq!(op.aliases().len(), 2);
    }
}
