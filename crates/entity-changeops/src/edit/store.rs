//! Persistence contracts and an in-memory store.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::error::StoreError;
use crate::model::{Entity, EntityId, EntityType, ItemId, PropertyId, Summary};

/// Id of one stored revision. Revision ids increase across all entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RevisionId(u64);

impl RevisionId {
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An entity as stored at one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRevision {
    pub entity: Entity,
    pub revision: RevisionId,
}

/// Read access to stored revisions.
pub trait EntityRevisionLookup: fmt::Debug + Send + Sync {
    /// Loads `id` at `revision`, or at its latest revision when `None`.
    fn entity_revision(
        &self,
        id: EntityId,
        revision: Option<RevisionId>,
    ) -> Result<EntityRevision, StoreError>;

    /// Latest revision of `id`, if it exists.
    fn latest_revision_id(&self, id: EntityId) -> Option<RevisionId>;
}

/// Write access to stored entities.
pub trait EntityStore: EntityRevisionLookup {
    /// Stores a new revision. `is_new` entities must not exist yet; others
    /// must.
    ///
    /// With `expected_latest`, the save only goes through while that is
    /// still the entity's latest revision; otherwise it fails with
    /// [`StoreError::RevisionConflict`]. The check and the write are atomic.
    fn save_entity(
        &self,
        entity: &Entity,
        summary: &Summary,
        is_new: bool,
        expected_latest: Option<RevisionId>,
    ) -> Result<RevisionId, StoreError>;

    /// Gives an entity without an id the next free id of its type.
    fn assign_fresh_id(&self, entity: &mut Entity) -> Result<EntityId, StoreError>;
}

#[derive(Debug, Default)]
struct StoreState {
    revisions: BTreeMap<EntityId, Vec<(RevisionId, Entity, Summary)>>,
    last_revision: u64,
    last_item: u64,
    last_property: u64,
}

impl StoreState {
    fn reserve(&mut self, id: EntityId) {
        match id {
            EntityId::Item(item) => self.last_item = self.last_item.max(item.number()),
            EntityId::Property(property) => {
                self.last_property = self.last_property.max(property.number())
            }
        }
    }
}

/// Process-local store keeping every revision.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    state: Mutex<StoreState>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of revisions stored for `id`.
    pub fn revision_count(&self, id: EntityId) -> usize {
        self.state().revisions.get(&id).map_or(0, Vec::len)
    }

    /// Summary recorded with the latest revision of `id`.
    pub fn latest_summary(&self, id: EntityId) -> Option<Summary> {
        self.state()
            .revisions
            .get(&id)
            .and_then(|revs| revs.last())
            .map(|(_, _, summary)| summary.clone())
    }
}

impl EntityRevisionLookup for InMemoryEntityStore {
    fn entity_revision(
        &self,
        id: EntityId,
        revision: Option<RevisionId>,
    ) -> Result<EntityRevision, StoreError> {
        let state = self.state();
        let revisions = state
            .revisions
            .get(&id)
            .ok_or(StoreError::EntityNotFound { id })?;
        let found = match revision {
            None => revisions.last(),
            Some(wanted) => revisions.iter().find(|(rev, _, _)| *rev == wanted),
        };
        found
            .map(|(rev, entity, _)| EntityRevision {
                entity: entity.clone(),
                revision: *rev,
            })
            .ok_or(StoreError::RevisionNotFound {
                id,
                revision: revision.map_or(0, RevisionId::get),
            })
    }

    fn latest_revision_id(&self, id: EntityId) -> Option<RevisionId> {
        self.state()
            .revisions
            .get(&id)
            .and_then(|revs| revs.last())
            .map(|(rev, _, _)| *rev)
    }
}

impl EntityStore for InMemoryEntityStore {
    fn save_entity(
        &self,
        entity: &Entity,
        summary: &Summary,
        is_new: bool,
        expected_latest: Option<RevisionId>,
    ) -> Result<RevisionId, StoreError> {
        let id = entity.id().ok_or(StoreError::MissingEntityId)?;
        let mut state = self.state();
        let latest = state
            .revisions
            .get(&id)
            .and_then(|revs| revs.last())
            .map(|(rev, _, _)| *rev);
        match (is_new, latest) {
            (true, Some(_)) => return Err(StoreError::EntityExists { id }),
            (false, None) => return Err(StoreError::EntityNotFound { id }),
            (false, Some(latest)) => {
                if let Some(expected) = expected_latest.filter(|expected| *expected != latest) {
                    debug!(%id, %expected, %latest, "refusing save from outdated revision");
                    return Err(StoreError::RevisionConflict {
                        id,
                        expected: expected.get(),
                        latest: latest.get(),
                    });
                }
            }
            (true, None) => {}
        }

        state.last_revision += 1;
        let revision = RevisionId(state.last_revision);
        state.reserve(id);
        state
            .revisions
            .entry(id)
            .or_default()
            .push((revision, entity.clone(), summary.clone()));
        debug!(%id, %revision, is_new, "saved entity");
        Ok(revision)
    }

    fn assign_fresh_id(&self, entity: &mut Entity) -> Result<EntityId, StoreError> {
        if let Some(id) = entity.id() {
            return Ok(id);
        }
        let mut state = self.state();
        let id = match entity.entity_type() {
            EntityType::Item => {
                state.last_item += 1;
                EntityId::Item(ItemId::new(state.last_item))
            }
            EntityType::Property => {
                state.last_property += 1;
                EntityId::Property(PropertyId::new(state.last_property))
            }
        };
        entity
            .set_id(id)
            .map_err(|_| StoreError::MissingEntityId)?;
        Ok(id)
    }
}
