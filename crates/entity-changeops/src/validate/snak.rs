//! Snak validation against property data types.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::config::Settings;
use crate::error::ValidationError;
use crate::model::{Claim, DataType, DataValue, Entity, EntityId, PropertyId, Snak, Statement};
use crate::validate::{LanguageValidator, ValidationResult};

/// Resolves the data type of a property.
pub trait PropertyDataTypeLookup: fmt::Debug + Send + Sync {
    fn data_type(&self, property: PropertyId) -> Option<DataType>;
}

/// Property data types known to the validator.
#[derive(Debug, Clone, Default)]
pub struct PropertyDataTypes {
    properties: FxHashMap<PropertyId, DataType>,
}

impl PropertyDataTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a property's data type.
    pub fn add_property(&mut self, property: PropertyId, data_type: DataType) {
        self.properties.insert(property, data_type);
    }

    /// Registers every property entity in `entities` that has an id.
    pub fn from_entities<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> Self {
        let mut types = Self::new();
        for entity in entities {
            if let Entity::Property(p) = entity {
                if let Some(id) = p.id {
                    types.add_property(id, p.data_type);
                }
            }
        }
        types
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl PropertyDataTypeLookup for PropertyDataTypes {
    fn data_type(&self, property: PropertyId) -> Option<DataType> {
        self.properties.get(&property).copied()
    }
}

impl FromIterator<(PropertyId, DataType)> for PropertyDataTypes {
    fn from_iter<I: IntoIterator<Item = (PropertyId, DataType)>>(iter: I) -> Self {
        Self {
            properties: iter.into_iter().collect(),
        }
    }
}

/// Checks snaks against the data type of their property.
#[derive(Debug, Clone)]
pub struct SnakValidator {
    data_types: Arc<dyn PropertyDataTypeLookup>,
    languages: LanguageValidator,
    max_string_length: usize,
}

impl SnakValidator {
    pub fn new(
        data_types: Arc<dyn PropertyDataTypeLookup>,
        languages: LanguageValidator,
        max_string_length: usize,
    ) -> Self {
        Self {
            data_types,
            languages,
            max_string_length,
        }
    }

    /// Uses the language list and string limit from `settings`.
    pub fn from_settings(data_types: Arc<dyn PropertyDataTypeLookup>, settings: &Settings) -> Self {
        Self::new(
            data_types,
            LanguageValidator::new(settings.language_codes.iter().cloned()),
            settings.max_string_value_length,
        )
    }

    /// Validates a single snak.
    pub fn validate_snak(&self, snak: &Snak) -> ValidationResult {
        let property = snak.property();
        let Some(data_type) = self.data_types.data_type(property) else {
            return ValidationResult::error(ValidationError::UnknownProperty { property });
        };
        match snak.data_value() {
            Some(value) => self.validate_value(property, data_type, value),
            None => ValidationResult::ok(),
        }
    }

    fn validate_value(
        &self,
        property: PropertyId,
        data_type: DataType,
        value: &DataValue,
    ) -> ValidationResult {
        let actual = value.value_type();
        if actual != data_type.value_type() {
            return ValidationResult::error(ValidationError::DataTypeMismatch {
                property,
                expected: data_type,
                actual,
            });
        }

        let mut result = ValidationResult::ok();
        if let Some(reason) = value.validate() {
            result.push(ValidationError::InvalidValue {
                property,
                reason: reason.to_string(),
            });
        }

        match value {
            DataValue::String(s) => result.merge(self.check_string_length(s)),
            DataValue::MonolingualText { language, text } => {
                result.merge(self.check_string_length(text));
                if !language.is_empty() {
                    result.merge(self.languages.validate(language));
                }
            }
            DataValue::EntityId(id) => {
                let matches_type = match (data_type, id) {
                    (DataType::WikibaseItem, EntityId::Item(_)) => true,
                    (DataType::WikibaseProperty, EntityId::Property(_)) => true,
                    _ => false,
                };
                if !matches_type {
                    result.push(ValidationError::InvalidValue {
                        property,
                        reason: format!("{id} is not a valid {data_type:?} value"),
                    });
                }
            }
            DataValue::Quantity { .. } | DataValue::Time { .. } => {}
        }
        result
    }

    fn check_string_length(&self, s: &str) -> ValidationResult {
        let length = s.chars().count();
        if length > self.max_string_length {
            ValidationResult::error(ValidationError::StringTooLong {
                length,
                max: self.max_string_length,
            })
        } else {
            ValidationResult::ok()
        }
    }

    /// Validates the main snak and every qualifier.
    pub fn validate_claim(&self, claim: &Claim) -> ValidationResult {
        let mut result = self.validate_snak(&claim.main_snak);
        for qualifier in &claim.qualifiers {
            result.merge(self.validate_snak(qualifier));
        }
        result
    }

    /// Validates the claim part and every reference snak.
    pub fn validate_statement(&self, statement: &Statement) -> ValidationResult {
        let mut result = self.validate_claim(&statement.claim);
        for reference in &statement.references {
            for snak in &reference.snaks {
                result.merge(self.validate_snak(snak));
            }
        }
        result
    }
}
