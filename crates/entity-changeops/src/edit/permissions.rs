//! Users and permission checks.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::warn;

use crate::config::Settings;
use crate::edit::Status;
use crate::model::{Entity, EntityType};

/// The acting user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct User {
    pub name: String,
    pub groups: BTreeSet<String>,
    pub rights: BTreeSet<String>,
}

impl User {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_groups<'s>(mut self, groups: impl IntoIterator<Item = &'s str>) -> Self {
        self.groups.extend(groups.into_iter().map(str::to_string));
        self
    }

    pub fn with_rights<'s>(mut self, rights: impl IntoIterator<Item = &'s str>) -> Self {
        self.rights.extend(rights.into_iter().map(str::to_string));
        self
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    pub fn has_right(&self, right: &str) -> bool {
        self.rights.contains(right)
    }
}

/// Decides whether a user may perform an action.
pub trait PermissionChecker: fmt::Debug + Send + Sync {
    /// Checks `action` on entities of `entity_type`.
    fn check_type_action(&self, user: &User, action: &str, entity_type: EntityType) -> Status<()>;

    /// Checks `action` on one entity.
    fn check_action(&self, user: &User, action: &str, entity: &Entity) -> Status<()> {
        self.check_type_action(user, action, entity.entity_type())
    }
}

/// Maps actions to required rights.
///
/// A type-specific rule (`"property-create"`) takes precedence over the
/// plain action (`"create"`). Actions without a rule are allowed.
#[derive(Debug, Clone, Default)]
pub struct RightsPermissionChecker {
    action_rights: BTreeMap<String, String>,
}

impl RightsPermissionChecker {
    pub fn new(action_rights: BTreeMap<String, String>) -> Self {
        Self { action_rights }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.action_rights.clone())
    }

    fn required_right(&self, action: &str, entity_type: EntityType) -> Option<&str> {
        let typed = format!("{}-{}", entity_type.name(), action);
        self.action_rights
            .get(&typed)
            .or_else(|| self.action_rights.get(action))
            .map(String::as_str)
    }
}

impl PermissionChecker for RightsPermissionChecker {
    fn check_type_action(&self, user: &User, action: &str, entity_type: EntityType) -> Status<()> {
        match self.required_right(action, entity_type) {
            Some(right) if !user.has_right(right) => {
                warn!(user = %user.name, action, %entity_type, right, "permission denied");
                Status::fatal_with("permissiondenied", [action, right])
            }
            _ => Status::good(()),
        }
    }
}
