//! Error types for change operations, validation, persistence and configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::diff::DiffConflict;
use crate::model::{DataType, EntityId, EntityType, ItemId, PropertyId, ValueType};

/// Construction-time argument error.
///
/// Raised when an operation is built from arguments of the wrong shape. These
/// indicate a client error and are never recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    #[error("malformed entity id: {value:?}")]
    MalformedEntityId { value: String },

    #[error("{id} is not an id of type {expected}")]
    UnexpectedEntityType { id: EntityId, expected: EntityType },

    #[error("{name} must be a non-empty string")]
    EmptyArgument { name: &'static str },

    #[error("unknown site id: {site_id:?}")]
    UnknownSite { site_id: String },

    #[error("{badge} is not an allowed badge")]
    BadgeNotAllowed { badge: ItemId },

    #[error("site {site_id:?} has no link to attach badges to")]
    SiteLinkNotFound { site_id: String },

    #[error("invalid conflict type to ignore: {value:?} (expected \"label\" or \"description\")")]
    InvalidIgnoreConflict { value: String },

    #[error("cannot merge a {from} into a {to}")]
    EntityTypeMismatch { from: EntityType, to: EntityType },

    #[error("cannot merge {id} with itself")]
    SameEntity { id: EntityId },

    #[error("the {role} entity has no id")]
    MissingEntityId { role: &'static str },

    #[error("unknown rank: {value:?}")]
    UnknownRank { value: String },

    #[error("too many aliases: {count} (max {max})")]
    TooManyAliases { count: usize, max: usize },
}

/// A single validate-time problem.
///
/// Validation never fails fast; these are collected in a
/// [`ValidationResult`](crate::validate::ValidationResult).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown language code: {code:?}")]
    UnknownLanguage { code: String },

    #[error("term must not be empty")]
    EmptyTerm,

    #[error("term length {length} exceeds maximum {max}")]
    TermTooLong { length: usize, max: usize },

    #[error("term must not start or end with whitespace")]
    TermSurroundingWhitespace,

    #[error("term contains control characters")]
    TermControlCharacters,

    #[error("label {label:?} ({language}) is already used by {conflicting}")]
    LabelConflict {
        language: String,
        label: String,
        conflicting: EntityId,
    },

    #[error("label and description for {language} must differ")]
    LabelEqualsDescription { language: String },

    #[error("property {property} not found")]
    UnknownProperty { property: PropertyId },

    #[error("value type mismatch for {property}: expected {expected:?}, found {actual:?}")]
    DataTypeMismatch {
        property: PropertyId,
        expected: DataType,
        actual: ValueType,
    },

    #[error("invalid value for {property}: {reason}")]
    InvalidValue { property: PropertyId, reason: String },

    #[error("string value length {length} exceeds maximum {max}")]
    StringTooLong { length: usize, max: usize },

    #[error("unknown site id: {site_id:?}")]
    UnknownSite { site_id: String },

    #[error("page title must not be empty")]
    EmptyPageTitle,

    #[error("page title length {length} exceeds maximum {max}")]
    PageTitleTooLong { length: usize, max: usize },
}

/// Raised by the edit pipeline when `validate()` reports problems.
///
/// Carries every collected error so callers can render all of them at once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} validation error(s), first: {}", .errors.len(), first_message(.errors))]
pub struct ChangeOpValidationError {
    pub errors: Vec<ValidationError>,
}

fn first_message(errors: &[ValidationError]) -> String {
    errors.first().map(ToString::to_string).unwrap_or_default()
}

/// Malformed claim guid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuidError {
    #[error("claim guid {guid:?} has no '$' separator")]
    MissingSeparator { guid: String },

    #[error("claim guid {guid:?} has a malformed entity id")]
    MalformedEntityId { guid: String },

    #[error("claim guid {guid:?} has a malformed uuid")]
    MalformedUuid { guid: String },
}

/// Apply-time failure of a change operation.
///
/// Always a single specific cause; the enclosing [`ChangeOps`](crate::changeop::ChangeOps)
/// aborts on the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeOpError {
    #[error("entity has no id")]
    EntityWithoutId,

    #[error("claim {guid:?} does not belong to {entity}")]
    ForeignClaimGuid { guid: String, entity: EntityId },

    #[error("no claim with guid {guid:?}")]
    ClaimNotFound { guid: String },

    #[error(transparent)]
    MalformedGuid(#[from] GuidError),

    #[error("claim has main snak property {expected}, replacement uses {actual}")]
    PropertyMismatch {
        expected: PropertyId,
        actual: PropertyId,
    },

    #[error("snak rejected: {0}")]
    InvalidSnak(ChangeOpValidationError),

    #[error("{operation} is not supported on a {entity_type}")]
    UnsupportedEntityType {
        operation: &'static str,
        entity_type: EntityType,
    },

    #[error("unknown alias action: {action:?}")]
    UnknownAliasAction { action: String },

    #[error("no qualifier with hash {hash:?}")]
    QualifierNotFound { hash: String },

    #[error("claim already has qualifier {hash:?}")]
    QualifierExists { hash: String },

    #[error("no reference with hash {hash:?}")]
    ReferenceNotFound { hash: String },

    #[error("statement already has reference {hash:?}")]
    ReferenceExists { hash: String },

    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
}

/// Failure reported by an entity store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("entity {id} not found")]
    EntityNotFound { id: EntityId },

    #[error("revision {revision} of {id} not found")]
    RevisionNotFound { id: EntityId, revision: u64 },

    #[error("entity has no id")]
    MissingEntityId,

    #[error("entity {id} already exists")]
    EntityExists { id: EntityId },

    #[error("entity {id} was edited from revision {expected} but is now at revision {latest}")]
    RevisionConflict { id: EntityId, expected: u64, latest: u64 },
}

/// An entity diff could not be applied cleanly.
///
/// Lists every operand whose value no longer matched what the diff expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("patch failed with {} conflict(s)", .conflicts.len())]
pub struct PatchError {
    pub conflicts: Vec<DiffConflict>,
}

/// Failure to load configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Unified error for the edit pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error(transparent)]
    Validation(#[from] ChangeOpValidationError),

    #[error(transparent)]
    ChangeOp(#[from] ChangeOpError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_summary() {
        let err = ChangeOpValidationError {
            errors: vec![
                ValidationError::EmptyTerm,
                ValidationError::UnknownLanguage {
                    code: "xx".to_string(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 validation error(s)"));
        assert!(msg.contains("term must not be empty"));
    }

    #[test]
    fn test_guid_error_converts() {
        let err: ChangeOpError = GuidError::MissingSeparator {
            guid: "abc".to_string(),
        }
        .into();
        assert!(matches!(err, ChangeOpError::MalformedGuid(_)));
    }
}
