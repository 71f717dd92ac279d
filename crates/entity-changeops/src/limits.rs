//! Default size limits for terms and values.
//!
//! These are the fallbacks used when [`Settings`](crate::config::Settings)
//! does not override them.

/// Maximum length (in characters) of a label, description or alias.
pub const MAX_TERM_LENGTH: usize = 250;

/// Maximum length (in characters) of a string data value.
pub const MAX_STRING_VALUE_LENGTH: usize = 400;

/// Maximum number of aliases accepted per language in a single operation.
pub const MAX_ALIASES_PER_OP: usize = 500;

/// Maximum length of a site page title.
pub const MAX_PAGE_TITLE_LENGTH: usize = 255;

/// Separator between the entity id and the UUID in a claim guid.
pub const GUID_SEPARATOR: char = '$';
