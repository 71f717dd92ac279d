//! TOML-based engine settings.
//!
//! Every field has a default, so an empty document yields a usable
//! configuration. Settings are passed explicitly to the factory, validators
//! and edit pipeline; there is no global instance.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::edit::ActionKind;
use crate::error::ConfigError;
use crate::limits::{MAX_STRING_VALUE_LENGTH, MAX_TERM_LENGTH};
use crate::model::ItemId;
use crate::well_known::{DEFAULT_LANGUAGE_CODES, DEFAULT_SITE_IDS};

/// One rate-limit rule: at most `count` actions of `action` kind per
/// `window_secs` for members of `group`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RateLimitRule {
    pub action: ActionKind,
    pub group: String,
    pub count: u32,
    pub window_secs: u64,
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Items that may be used as site link badges.
    pub badge_items: BTreeSet<ItemId>,
    /// Known site ids.
    pub site_ids: BTreeSet<String>,
    /// Recognised term language codes.
    pub language_codes: BTreeSet<String>,
    /// Maximum label/description/alias length.
    pub max_term_length: usize,
    /// Maximum string data value length.
    pub max_string_value_length: usize,
    /// Save rate limits.
    pub rate_limits: Vec<RateLimitRule>,
    /// Right required per entity action name (`"edit"`, `"create"`, `"merge"`...).
    pub action_rights: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            badge_items: BTreeSet::new(),
            site_ids: DEFAULT_SITE_IDS.iter().map(|s| s.to_string()).collect(),
            language_codes: DEFAULT_LANGUAGE_CODES.iter().map(|s| s.to_string()).collect(),
            max_term_length: MAX_TERM_LENGTH,
            max_string_value_length: MAX_STRING_VALUE_LENGTH,
            rate_limits: Vec::new(),
            action_rights: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Parses settings from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(s)?;
        debug!(
            badges = settings.badge_items.len(),
            sites = settings.site_ids.len(),
            languages = settings.language_codes.len(),
            "parsed settings"
        );
        Ok(settings)
    }

    /// Reads and parses a TOML settings file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "loading settings");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn is_known_site(&self, site_id: &str) -> bool {
        self.site_ids.contains(site_id)
    }

    pub fn is_known_language(&self, code: &str) -> bool {
        self.language_codes.contains(code)
    }

    pub fn is_allowed_badge(&self, badge: ItemId) -> bool {
        self.badge_items.contains(&badge)
    }

    /// Builder-style helper to whitelist badges.
    pub fn with_badges(mut self, badges: impl IntoIterator<Item = ItemId>) -> Self {
        self.badge_items.extend(badges);
        self
    }
}
