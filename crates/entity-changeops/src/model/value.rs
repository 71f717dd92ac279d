//! Data values carried by value snaks.

use serde::{Deserialize, Serialize};

use crate::model::id::ContentHasher;
use crate::model::{EntityId, ItemId};

/// Property data types.
///
/// Several data types share one underlying [`ValueType`] (a URL is stored as
/// a string value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataType {
    String,
    ExternalId,
    Url,
    MonolingualText,
    WikibaseItem,
    WikibaseProperty,
    Quantity,
    Time,
}

impl DataType {
    /// Returns the value type values of this data type must have.
    pub fn value_type(self) -> ValueType {
        match self {
            DataType::String | DataType::ExternalId | DataType::Url => ValueType::String,
            DataType::MonolingualText => ValueType::MonolingualText,
            DataType::WikibaseItem | DataType::WikibaseProperty => ValueType::EntityId,
            DataType::Quantity => ValueType::Quantity,
            DataType::Time => ValueType::Time,
        }
    }

    /// Parses the kebab-case data type name.
    pub fn from_name(name: &str) -> Option<DataType> {
        match name {
            "string" => Some(DataType::String),
            "external-id" => Some(DataType::ExternalId),
            "url" => Some(DataType::Url),
            "monolingual-text" => Some(DataType::MonolingualText),
            "wikibase-item" => Some(DataType::WikibaseItem),
            "wikibase-property" => Some(DataType::WikibaseProperty),
            "quantity" => Some(DataType::Quantity),
            "time" => Some(DataType::Time),
            _ => None,
        }
    }
}

/// Structural type of a [`DataValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    MonolingualText,
    EntityId,
    Quantity,
    Time,
}

/// A value asserted by a value snak.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum DataValue {
    /// Plain string (also used for URLs and external ids).
    String(String),

    /// Text in one language.
    MonolingualText { language: String, text: String },

    /// Reference to another entity.
    EntityId(EntityId),

    /// Decimal amount as a signed string (e.g. `"+12.5"`), with optional unit item.
    Quantity { amount: String, unit: Option<ItemId> },

    /// Point in time (`+YYYY-MM-DDThh:mm:ssZ`) with precision and calendar model.
    Time {
        time: String,
        precision: u8,
        calendar: ItemId,
    },
}

/// Highest supported time precision (seconds).
const MAX_TIME_PRECISION: u8 = 14;

impl DataValue {
    /// Returns the structural type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            DataValue::String(_) => ValueType::String,
            DataValue::MonolingualText { .. } => ValueType::MonolingualText,
            DataValue::EntityId(_) => ValueType::EntityId,
            DataValue::Quantity { .. } => ValueType::Quantity,
            DataValue::Time { .. } => ValueType::Time,
        }
    }

    /// Feeds a canonical encoding of this value into `hasher`.
    pub(crate) fn hash_into(&self, hasher: &mut ContentHasher) {
        match self {
            DataValue::String(s) => {
                hasher.update_str("string").update_str(s);
            }
            DataValue::MonolingualText { language, text } => {
                hasher.update_str("monolingual").update_str(language).update_str(text);
            }
            DataValue::EntityId(id) => {
                hasher.update_str("entity").update_str(&id.to_string());
            }
            DataValue::Quantity { amount, unit } => {
                hasher.update_str("quantity").update_str(amount);
                match unit {
                    Some(unit) => hasher.update_str(&unit.to_string()),
                    None => hasher.update_str(""),
                };
            }
            DataValue::Time {
                time,
                precision,
                calendar,
            } => {
                hasher
                    .update_str("time")
                    .update_str(time)
                    .update_bytes(&[*precision])
                    .update_str(&calendar.to_string());
            }
        }
    }

    /// Checks value-level constraints independent of any property.
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Option<&'static str> {
        match self {
            DataValue::String(s) => {
                if s.trim().is_empty() {
                    return Some("string value must not be empty");
                }
            }
            DataValue::MonolingualText { language, text } => {
                if language.is_empty() {
                    return Some("monolingual text needs a language");
                }
                if text.trim().is_empty() {
                    return Some("monolingual text must not be empty");
                }
            }
            DataValue::EntityId(_) => {}
            DataValue::Quantity { amount, .. } => {
                if !is_decimal_amount(amount) {
                    return Some("quantity amount is not a signed decimal");
                }
            }
            DataValue::Time {
                time, precision, ..
            } => {
                if *precision > MAX_TIME_PRECISION {
                    return Some("time precision out of range");
                }
                if !is_time_string(time) {
                    return Some("time is not in +YYYY-MM-DDThh:mm:ssZ form");
                }
            }
        }
        None
    }
}

/// Accepts `[+-]digits[.digits]`, sign mandatory.
fn is_decimal_amount(amount: &str) -> bool {
    let Some(rest) = amount.strip_prefix('+').or_else(|| amount.strip_prefix('-')) else {
        return false;
    };
    let (int, frac) = match rest.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (rest, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(int) && frac.is_none_or(all_digits)
}

/// Accepts `[+-]Y+-MM-DDThh:mm:ssZ` with any number of year digits.
fn is_time_string(time: &str) -> bool {
    let Some(rest) = time.strip_prefix('+').or_else(|| time.strip_prefix('-')) else {
        return false;
    };
    let Some((date, clock)) = rest.split_once('T') else {
        return false;
    };
    let Some(clock) = clock.strip_suffix('Z') else {
        return false;
    };

    let date_parts: Vec<&str> = date.rsplitn(3, '-').collect();
    let clock_parts: Vec<&str> = clock.split(':').collect();
    if date_parts.len() != 3 || clock_parts.len() != 3 {
        return false;
    }
    let digits = |s: &str, len: Option<usize>| {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && len.is_none_or(|l| s.len() == l)
    };
    // rsplitn yields day, month, year
    digits(date_parts[2], None)
        && digits(date_parts[1], Some(2))
        && digits(date_parts[0], Some(2))
        && clock_parts.iter().all(|p| digits(p, Some(2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_value_types() {
        assert_eq!(DataType::Url.value_type(), ValueType::String);
        assert_eq!(DataType::ExternalId.value_type(), ValueType::String);
        assert_eq!(DataType::WikibaseItem.value_type(), ValueType::EntityId);
        assert_eq!(DataType::from_name("monolingual-text"), Some(DataType::MonolingualText));
        assert_eq!(DataType::from_name("nope"), None);
    }

    #[test]
    fn test_validate_quantity() {
        let ok = DataValue::Quantity {
            amount: "+12.50".to_string(),
            unit: None,
        };
        assert_eq!(ok.validate(), None);

        for bad in ["12", "+", "+1.", "+1.2.3", "-a"] {
            let v = DataValue::Quantity {
                amount: bad.to_string(),
                unit: None,
            };
            assert!(v.validate().is_some(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_validate_time() {
        let ok = DataValue::Time {
            time: "+2001-01-15T00:00:00Z".to_string(),
            precision: 11,
            calendar: ItemId::new(1985727),
        };
        assert_eq!(ok.validate(), None);

        let bad_format = DataValue::Time {
            time: "2001-01-15".to_string(),
            precision: 11,
            calendar: ItemId::new(1985727),
        };
        assert!(bad_format.validate().is_some());

        let bad_precision = DataValue::Time {
            time: "+2001-01-15T00:00:00Z".to_string(),
            precision: 15,
            calendar: ItemId::new(1985727),
        };
        assert!(bad_precision.validate().is_some());
    }

    #[test]
    fn test_validate_strings() {
        assert!(DataValue::String("  ".to_string()).validate().is_some());
        assert!(DataValue::String("x".to_string()).validate().is_none());
        let mono = DataValue::MonolingualText {
            language: String::new(),
            text: "hi".to_string(),
        };
        assert!(mono.validate().is_some());
    }
}
