//! Validation for change ops.
//!
//! Validation is read-only and never fails fast: every check appends to a
//! [`ValidationResult`] so callers can report all problems at once. Apply-time
//! invariants live in the change ops themselves.

pub mod snak;
pub mod term;

pub use snak::{PropertyDataTypeLookup, PropertyDataTypes, SnakValidator};
pub use term::{
    InMemoryTermIndex, LabelConflictFinder, LanguageValidator, LengthTermValidator,
    TermValidator, TermValidators,
};

use crate::error::{ChangeOpValidationError, ValidationError};

/// Outcome of a validate call: valid iff no errors were collected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// A valid result.
    pub fn ok() -> Self {
        Self::default()
    }

    /// An invalid result with one error.
    pub fn error(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Appends all errors of `other`.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// Converts into the error raised by the edit pipeline.
    pub fn into_result(self) -> Result<(), ChangeOpValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ChangeOpValidationError {
                errors: self.errors,
            })
        }
    }
}

impl FromIterator<ValidationError> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<ValidationResult> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = ValidationResult>>(iter: I) -> Self {
        let mut result = ValidationResult::ok();
        for r in iter {
            result.merge(r);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_collects_all() {
        let mut result = ValidationResult::ok();
        assert!(result.is_valid());
        result.merge(ValidationResult::error(ValidationError::EmptyTerm));
        result.merge(ValidationResult::ok());
        result.push(ValidationError::TermControlCharacters);
        assert!(!result.is_valid());
        assert_eq!(result.errors().len(), 2);
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationResult::ok().into_result().is_ok());
        let err = ValidationResult::error(ValidationError::EmptyTerm)
            .into_result()
            .unwrap_err();
        assert_eq!(err.errors, vec![ValidationError::EmptyTerm]);
    }
}
