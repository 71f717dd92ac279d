//! Save-time edit conflict detection and resolution.

use tracing::{debug, info};

use crate::diff::{EntityDiffer, EntityPatcher};
use crate::edit::RevisionId;
use crate::model::Entity;

/// Three-way merge of a stale edit onto the latest stored revision.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditConflictResolver {
    differ: EntityDiffer,
    patcher: EntityPatcher,
}

impl EditConflictResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// An edit conflicts when it started from a revision other than the
    /// latest one. Edits without a base never conflict.
    pub fn has_edit_conflict(&self, base: Option<RevisionId>, latest: RevisionId) -> bool {
        base.is_some_and(|base| base != latest)
    }

    /// Reconciles `new` (edited from `base`) with `current` (stored since).
    ///
    /// Returns the entity to save, or `None` if both sides changed the same
    /// operand to different values. A resubmission that changes nothing
    /// resolves to `current` as is.
    pub fn fix_edit_conflict(&self, base: &Entity, current: &Entity, new: &Entity) -> Option<Entity> {
        let local = self.differ.diff(base, new);
        if local.is_empty() {
            debug!("local diff is empty, keeping current revision");
            return Some(current.clone());
        }

        let upstream = self.differ.diff(base, current);
        let overlapping = local.conflicts_with(&upstream);
        if !overlapping.is_empty() {
            let fields: Vec<String> = overlapping.iter().map(ToString::to_string).collect();
            info!(id = ?current.id(), conflicts = ?fields, "edit conflict could not be resolved");
            return None;
        }
        debug!(local = ?local, "replaying local changes onto current revision");

        let mut patched = current.clone();
        match self.patcher.patch(&mut patched, &local) {
            Ok(()) => {
                info!(id = ?current.id(), "edit conflict resolved");
                Some(patched)
            }
            Err(err) => {
                let fields: Vec<String> = err.conflicts.iter().map(ToString::to_string).collect();
                info!(id = ?current.id(), conflicts = ?fields, "edit conflict could not be resolved");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builder::{ItemBuilder, StatementBuilder};
    use crate::model::{ItemId, PropertyId};

    fn base() -> Entity {
        ItemBuilder::new().id(ItemId::new(1)).label("en", "foo").build()
    }

    #[test]
    fn test_has_edit_conflict() {
        let resolver = EditConflictResolver::new();
        assert!(!resolver.has_edit_conflict(None, RevisionId::new(3)));
        assert!(!resolver.has_edit_conflict(Some(RevisionId::new(3)), RevisionId::new(3)));
        assert!(resolver.has_edit_conflict(Some(RevisionId::new(2)), RevisionId::new(3)));
    }

    #[test]
    fn test_disjoint_edits_merge() {
        let base = base();
        let mut current = base.clone();
        current.fingerprint_mut().labels.set("de", "bar");
        let mut new = base.clone();
        new.fingerprint_mut().labels.set("en", "baz");

        let merged = EditConflictResolver::new()
            .fix_edit_conflict(&base, &current, &new)
            .unwrap();
        assert_eq!(merged.fingerprint().labels.get("de"), Some("bar"));
        assert_eq!(merged.fingerprint().labels.get("en"), Some("baz"));
    }

    #[test]
    fn test_same_operand_different_values_fails() {
        let base = base();
        let mut current = base.clone();
        current.fingerprint_mut().labels.set("de", "bar");
        let mut new = base.clone();
        new.fingerprint_mut().labels.set("de", "qux");

        assert!(EditConflictResolver::new()
            .fix_edit_conflict(&base, &current, &new)
            .is_none());
    }

    #[test]
    fn test_noop_resubmission_keeps_current() {
        let base = base();
        let mut current = base.clone();
        current.fingerprint_mut().labels.set("en", "changed upstream");

        let resolved = EditConflictResolver::new().fix_edit_conflict(&base, &current, &base);
        assert_eq!(resolved, Some(current));
    }

    #[test]
    fn test_label_removed_upstream_and_changed_locally_fails() {
        let base = base();
        let mut current = base.clone();
        current.fingerprint_mut().labels.remove("en");
        let mut new = base.clone();
        new.fingerprint_mut().labels.set("en", "baz");

        assert!(EditConflictResolver::new()
            .fix_edit_conflict(&base, &current, &new)
            .is_none());
    }

    #[test]
    fn test_stale_claim_move_survives() {
        let base = ItemBuilder::new()
            .id(ItemId::new(1))
            .statement(StatementBuilder::string(PropertyId::new(7), "x").guid("Q1$x"))
            .statement(StatementBuilder::string(PropertyId::new(7), "y").guid("Q1$y"))
            .build();
        let mut current = base.clone();
        current.fingerprint_mut().labels.set("en", "upstream");
        let mut new = base.clone();
        let moved = new.statements().get_by_guid("Q1$y").cloned().unwrap();
        new.statements_mut().set(moved, Some(0));

        let merged = EditConflictResolver::new()
            .fix_edit_conflict(&base, &current, &new)
            .unwrap();
        assert_eq!(merged.statements().guids().collect::<Vec<_>>(), vec!["Q1$y", "Q1$x"]);
        assert_eq!(merged.fingerprint().labels.get("en"), Some("upstream"));
    }
}
