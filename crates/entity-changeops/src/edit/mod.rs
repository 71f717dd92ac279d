//! The edit pipeline around change ops.
//!
//! [`EditEntity::attempt_save`] ties the pieces together: permission check,
//! rate limit, validation, apply on a private copy, edit conflict resolution
//! against the latest stored revision, and save. The store, permission
//! checker and rate limiter are traits with in-memory implementations.

pub mod conflict;
pub mod entity_edit;
pub mod permissions;
pub mod rate_limit;
pub mod status;
pub mod store;

pub use conflict::EditConflictResolver;
pub use entity_edit::{EditContext, EditEntity, EditTarget, MAX_SAVE_ATTEMPTS};
pub use permissions::{PermissionChecker, RightsPermissionChecker, User};
pub use rate_limit::{ActionKind, GroupRateLimiter, NoRateLimit, RateLimiter, BYPASS_RIGHT};
pub use status::{Severity, Status, StatusMessage};
pub use store::{EntityRevision, EntityRevisionLookup, EntityStore, InMemoryEntityStore, RevisionId};
