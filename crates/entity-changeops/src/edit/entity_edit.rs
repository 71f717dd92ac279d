//! The save pipeline for one edit of one entity.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::changeop::{ChangeOp, ChangeOps};
use crate::edit::{
    ActionKind, EditConflictResolver, EntityRevisionLookup, EntityStore, PermissionChecker,
    RateLimiter, RevisionId, Status, User,
};
use crate::error::{EditError, StoreError};
use crate::model::{Entity, EntityId, Summary};

/// How often a save is retried when the entity changes while saving.
pub const MAX_SAVE_ATTEMPTS: usize = 3;

/// Collaborators shared by all edits.
#[derive(Debug, Clone)]
pub struct EditContext {
    pub store: Arc<dyn EntityStore>,
    pub permissions: Arc<dyn PermissionChecker>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub resolver: EditConflictResolver,
}

impl EditContext {
    pub fn new(
        store: Arc<dyn EntityStore>,
        permissions: Arc<dyn PermissionChecker>,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            store,
            permissions,
            rate_limiter,
            resolver: EditConflictResolver::new(),
        }
    }
}

/// What is being edited.
#[derive(Debug, Clone)]
pub enum EditTarget {
    /// A stored entity, edited starting from `base` (latest if `None`).
    Existing {
        id: EntityId,
        base: Option<RevisionId>,
    },
    /// A new entity built from a template; an id is assigned on save.
    New(Entity),
}

/// One user's edit of one entity.
///
/// After a successful save the target becomes the saved revision, so
/// further saves continue from it.
#[derive(Debug)]
pub struct EditEntity {
    context: EditContext,
    user: User,
    target: EditTarget,
}

impl EditEntity {
    pub fn new(context: EditContext, user: User, target: EditTarget) -> Self {
        Self {
            context,
            user,
            target,
        }
    }

    pub fn target(&self) -> &EditTarget {
        &self.target
    }

    /// Validates, applies and saves `change_ops`.
    ///
    /// Permission denial, rate limiting and an unresolvable edit conflict
    /// come back as a fatal [`Status`]. Invalid ops, apply failures and
    /// store failures are errors.
    ///
    /// The store refuses the save if another revision landed after the one
    /// the edit was checked against. The edit is then reconciled with that
    /// revision and saved again, up to [`MAX_SAVE_ATTEMPTS`] times.
    pub fn attempt_save(
        &mut self,
        change_ops: &mut ChangeOps,
        mut summary: Summary,
    ) -> Result<Status<RevisionId>, EditError> {
        let store = Arc::clone(&self.context.store);

        // (entity to edit, latest revision id, latest stored entity when the base is stale)
        let (mut entity, mut expected, mut current, kind) = match &self.target {
            EditTarget::Existing { id, base } => {
                let latest = store.entity_revision(*id, None)?;
                if self.context.resolver.has_edit_conflict(*base, latest.revision) {
                    let base_entity = store.entity_revision(*id, *base)?.entity;
                    (base_entity, Some(latest.revision), Some(latest.entity), ActionKind::Edit)
                } else {
                    (latest.entity, Some(latest.revision), None, ActionKind::Edit)
                }
            }
            EditTarget::New(template) => {
                let mut entity = template.clone();
                store.assign_fresh_id(&mut entity)?;
                (entity, None, None, ActionKind::Create)
            }
        };

        let permission = self
            .context
            .permissions
            .check_action(&self.user, kind.as_str(), &entity);
        if !permission.is_ok() {
            return Ok(permission.without_value());
        }

        if !self.context.rate_limiter.is_within_limit(&self.user, kind) {
            warn!(user = %self.user.name, %kind, "save throttled");
            return Ok(Status::fatal("actionthrottledtext"));
        }

        change_ops.validate(&entity).into_result()?;

        let base = entity.clone();
        change_ops.apply(&mut entity, Some(&mut summary))?;

        let is_new = kind == ActionKind::Create;
        let mut resolved_conflict = false;
        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            let to_save = match &current {
                Some(current) => match self.context.resolver.fix_edit_conflict(&base, current, &entity) {
                    Some(merged) => {
                        resolved_conflict = true;
                        merged
                    }
                    None => {
                        info!(id = ?entity.id(), "rejecting save on edit conflict");
                        return Ok(Status::fatal("edit-conflict"));
                    }
                },
                None => entity.clone(),
            };

            match store.save_entity(&to_save, &summary, is_new, expected) {
                Ok(revision) => {
                    debug!(id = ?to_save.id(), %revision, ops = change_ops.len(), attempt, "edit saved");
                    if let Some(id) = to_save.id() {
                        self.target = EditTarget::Existing {
                            id,
                            base: Some(revision),
                        };
                    }
                    let mut status = Status::good(revision);
                    if resolved_conflict {
                        status.warning("edit-conflict-resolved");
                    }
                    return Ok(status);
                }
                Err(StoreError::RevisionConflict { id, latest, .. }) => {
                    debug!(%id, latest, attempt, "entity changed while saving, reconciling");
                    let reloaded = store.entity_revision(id, None)?;
                    expected = Some(reloaded.revision);
                    current = Some(reloaded.entity);
                }
                Err(err) => return Err(err.into()),
            }
        }

        info!(id = ?entity.id(), "entity kept changing while saving, giving up");
        Ok(Status::fatal("edit-conflict"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::changeop::ChangeOpFactory;
    use crate::config::Settings;
    use crate::edit::{EntityRevision, InMemoryEntityStore, NoRateLimit, RightsPermissionChecker};
    use crate::error::ChangeOpValidationError;
    use crate::model::builder::ItemBuilder;
    use crate::model::ItemId;
    use crate::validate::PropertyDataTypes;

    fn factory() -> ChangeOpFactory {
        ChangeOpFactory::new(Settings::default(), Arc::new(PropertyDataTypes::new()))
    }

    fn context(store: Arc<InMemoryEntityStore>) -> EditContext {
        EditContext::new(
            store,
            Arc::new(RightsPermissionChecker::default()),
            Arc::new(NoRateLimit),
        )
    }

    fn label_ops(language: &str, text: &str) -> ChangeOps {
        let mut ops = ChangeOps::new();
        ops.add(factory().new_set_label_op(language, text));
        ops
    }

    #[test]
    fn test_create_then_edit() {
        let store = Arc::new(InMemoryEntityStore::new());
        let mut edit = EditEntity::new(
            context(store.clone()),
            User::new("Alice"),
            EditTarget::New(Entity::new_item()),
        );

        let status = edit.attempt_save(&mut label_ops("en", "foo"), Summary::new()).unwrap();
        assert!(status.is_ok());
        let id = EntityId::Item(ItemId::new(1));
        assert_eq!(store.latest_revision_id(id), status.value().copied());

        let status = edit.attempt_save(&mut label_ops("de", "Fuu"), Summary::new()).unwrap();
        assert!(status.is_ok());
        let saved = store.entity_revision(id, None).unwrap().entity;
        assert_eq!(saved.fingerprint().labels.len(), 2);
        assert_eq!(
            store.latest_summary(id).and_then(|s| s.action_name),
            Some("add".to_string())
        );
    }

    #[test]
    fn test_invalid_ops_are_an_error() {
        let store = Arc::new(InMemoryEntityStore::new());
        let mut edit = EditEntity::new(context(store), User::new("Alice"), EditTarget::New(Entity::new_item()));
        let err = edit
            .attempt_save(&mut label_ops("xx-invalid", "foo"), Summary::new())
            .unwrap_err();
        assert!(matches!(err, EditError::Validation(ChangeOpValidationError { .. })));
    }

    /// Lets another request save `other` right after the first load of the
    /// latest revision.
    #[derive(Debug)]
    struct InterleavingStore {
        inner: InMemoryEntityStore,
        other: Mutex<Option<Entity>>,
    }

    impl EntityRevisionLookup for InterleavingStore {
        fn entity_revision(
            &self,
            id: EntityId,
            revision: Option<RevisionId>,
        ) -> Result<EntityRevision, StoreError> {
            let loaded = self.inner.entity_revision(id, revision)?;
            if revision.is_none() {
                if let Some(other) = self.other.lock().unwrap().take() {
                    self.inner.save_entity(&other, &Summary::new(), false, None)?;
                }
            }
            Ok(loaded)
        }

        fn latest_revision_id(&self, id: EntityId) -> Option<RevisionId> {
            self.inner.latest_revision_id(id)
        }
    }

    impl EntityStore for InterleavingStore {
        fn save_entity(
            &self,
            entity: &Entity,
            summary: &Summary,
            is_new: bool,
            expected_latest: Option<RevisionId>,
        ) -> Result<RevisionId, StoreError> {
            self.inner.save_entity(entity, summary, is_new, expected_latest)
        }

        fn assign_fresh_id(&self, entity: &mut Entity) -> Result<EntityId, StoreError> {
            self.inner.assign_fresh_id(entity)
        }
    }

    /// Q1 with an English label, and another request's version of it.
    fn interleaving_store(other_language: &str, other_text: &str) -> Arc<InterleavingStore> {
        let inner = InMemoryEntityStore::new();
        let item = ItemBuilder::new().id(ItemId::new(1)).label("en", "foo").build();
        inner.save_entity(&item, &Summary::new(), true, None).unwrap();
        let mut other = item;
        other.fingerprint_mut().labels.set(other_language, other_text);
        Arc::new(InterleavingStore {
            inner,
            other: Mutex::new(Some(other)),
        })
    }

    fn edit_latest(store: Arc<InterleavingStore>) -> EditEntity {
        let context = EditContext::new(
            store,
            Arc::new(RightsPermissionChecker::default()),
            Arc::new(NoRateLimit),
        );
        EditEntity::new(
            context,
            User::new("Alice"),
            EditTarget::Existing {
                id: EntityId::Item(ItemId::new(1)),
                base: None,
            },
        )
    }

    #[test]
    fn test_save_racing_another_request_keeps_both_changes() {
        let store = interleaving_store("fr", "from other request");
        let status = edit_latest(store.clone())
            .attempt_save(&mut label_ops("de", "bar"), Summary::new())
            .unwrap();
        assert!(status.is_ok());
        assert!(status.has_message("edit-conflict-resolved"));

        let id = EntityId::Item(ItemId::new(1));
        assert_eq!(store.inner.revision_count(id), 3);
        let saved = store.inner.entity_revision(id, None).unwrap().entity;
        assert_eq!(saved.fingerprint().labels.get("fr"), Some("from other request"));
        assert_eq!(saved.fingerprint().labels.get("de"), Some("bar"));
    }

    #[test]
    fn test_save_racing_a_competing_request_is_rejected() {
        let store = interleaving_store("de", "from other request");
        let status = edit_latest(store.clone())
            .attempt_save(&mut label_ops("de", "bar"), Summary::new())
            .unwrap();
        assert!(status.has_message("edit-conflict"));

        let id = EntityId::Item(ItemId::new(1));
        assert_eq!(store.inner.revision_count(id), 2);
        let saved = store.inner.entity_revision(id, None).unwrap().entity;
        assert_eq!(saved.fingerprint().labels.get("de"), Some("from other request"));
    }
}
