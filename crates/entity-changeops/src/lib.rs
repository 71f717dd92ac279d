//! Validated change operations for multilingual knowledge-base entities.
//!
//! Every edit to an item or property is expressed as a change op: an atomic
//! mutation that can be validated against an entity without touching it and
//! then applied to a private copy. Around that core the crate provides entity
//! merging and save-time edit conflict resolution.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use entity_changeops::changeop::{ChangeOp, ChangeOpFactory, ChangeOps};
//! use entity_changeops::model::builder::ItemBuilder;
//! use entity_changeops::validate::PropertyDataTypes;
//! use entity_changeops::{ItemId, Settings, Summary};
//!
//! let factory = ChangeOpFactory::new(Settings::default(), Arc::new(PropertyDataTypes::new()));
//! let mut item = ItemBuilder::new().id(ItemId::new(42)).build();
//!
//! let mut ops = ChangeOps::new();
//! ops.add(factory.new_set_label_op("en", "Douglas Adams"));
//! ops.add(factory.new_add_aliases_op("en", &["DNA"]).unwrap());
//!
//! assert!(ops.validate(&item).is_valid());
//! let mut summary = Summary::new();
//! ops.apply(&mut item, Some(&mut summary)).unwrap();
//! assert_eq!(item.fingerprint().labels.get("en"), Some("Douglas Adams"));
//! ```
//!
//! # Modules
//!
//! - [`model`]: Entities, terms, claims, site links and edit summaries
//! - [`guid`]: Claim guid parsing and generation
//! - [`validate`]: Term and snak validation
//! - [`changeop`]: Change ops, their factory, and entity merging
//! - [`diff`]: Claim and entity diffs, three-way patching
//! - [`edit`]: The save pipeline (permissions, rate limits, conflicts, store)
//! - [`config`]: TOML settings
//! - [`error`]: Error types
//! - [`limits`]: Default size limits
//! - [`well_known`]: Default language codes and site ids
//!
//! # Conflicts
//!
//! Two kinds of conflict are handled. Merging two entities leaves terms that
//! differ on both sides where they are and reports them in a
//! [`MergeReport`](changeop::MergeReport). Saving an edit started from an
//! outdated revision replays the edit onto the latest revision and fails with
//! a fatal `"edit-conflict"` status only when both touched the same operand.

pub mod changeop;
pub mod config;
pub mod diff;
pub mod edit;
pub mod error;
pub mod guid;
pub mod limits;
pub mod model;
pub mod validate;
pub mod well_known;

// Re-export commonly used types at crate root
pub use changeop::{ChangeOp, ChangeOpFactory, ChangeOps, ChangeOpsMerge, MergeReport};
pub use config::Settings;
pub use diff::{ClaimDiffer, ClaimDifference, ClaimOrder, EntityDiff, EntityDiffer, EntityPatcher};
pub use edit::{EditConflictResolver, EditContext, EditEntity, EditTarget, RevisionId, Status, User};
pub use error::{
    ChangeOpError, ChangeOpValidationError, ConfigError, EditError, GuidError, InvalidArgument,
    PatchError, StoreError, ValidationError,
};
pub use guid::{ClaimGuid, ClaimGuidGenerator};
pub use model::{
    Claim, DataType, DataValue, Entity, EntityId, EntityType, Item, ItemId, Property, PropertyId,
    Rank, Reference, SiteLink, Snak, Statement, Summary,
};
pub use validate::ValidationResult;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
