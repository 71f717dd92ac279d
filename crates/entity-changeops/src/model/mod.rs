//! Data model types.
//!
//! This module contains the value types the change ops operate on:
//! - Identifiers and content hashing
//! - Data values and snaks
//! - Claims, statements and references
//! - Fingerprints (labels, descriptions, aliases) and site links
//! - Entities and edit summaries
//! - Builders (ergonomic construction)

pub mod builder;
pub mod claim;
pub mod entity;
pub mod fingerprint;
pub mod id;
pub mod site_link;
pub mod snak;
pub mod summary;
pub mod value;

pub use builder::{ItemBuilder, PropertyBuilder, StatementBuilder};
pub use claim::{AsClaim, Claim, Rank, Reference, ReferenceList, Statement, StatementList};
pub use entity::{Entity, Item, Property};
pub use fingerprint::{AliasGroupList, Fingerprint, TermList};
pub use id::{format_hash, ContentHasher, EntityId, EntityType, ItemId, PropertyId};
pub use site_link::{dedup_badges, SiteLink, SiteLinkList};
pub use snak::{Snak, SnakList};
pub use summary::{Summary, SummaryArg};
pub use value::{DataType, DataValue, ValueType};
