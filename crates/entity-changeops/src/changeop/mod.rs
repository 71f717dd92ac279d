//! Change operations: atomic, validated entity mutations.
//!
//! Every edit is expressed as a [`ChangeOp`]. Callers first `validate` against
//! the entity to collect all problems, then `apply` to a disposable clone.
//! [`ChangeOps`] composes several operations; [`ChangeOpsMerge`] moves the
//! content of one entity into another.

pub mod claim;
pub mod factory;
pub mod fingerprint;
pub mod merge;
pub mod sitelink;

pub use claim::{
    ChangeOpClaim, ChangeOpClaimRemove, ChangeOpMainSnak, ChangeOpQualifier,
    ChangeOpQualifierRemove, ChangeOpReference, ChangeOpReferenceRemove, ChangeOpStatementRank,
};
pub use factory::ChangeOpFactory;
pub use fingerprint::{AliasAction, ChangeOpAliases, ChangeOpDescription, ChangeOpLabel};
pub use merge::{ChangeOpsMerge, ConflictType, MergeConflict, MergeReport};
pub use sitelink::ChangeOpSiteLink;

use std::fmt;

use tracing::debug;

use crate::error::ChangeOpError;
use crate::model::{Entity, Summary};
use crate::validate::ValidationResult;

/// An atomic mutation of one entity.
pub trait ChangeOp: fmt::Debug {
    /// Collects every problem applying this op to `entity` would have.
    ///
    /// Never mutates the entity.
    fn validate(&self, entity: &Entity) -> ValidationResult;

    /// Mutates `entity` and fills in `summary` if one is given.
    ///
    /// Fails on invariants `validate` cannot see, such as a claim guid that
    /// names another entity. The entity may be left partially modified.
    fn apply(&mut self, entity: &mut Entity, summary: Option<&mut Summary>)
    -> Result<(), ChangeOpError>;
}

/// Ordered composite of change ops.
#[derive(Debug, Default)]
pub struct ChangeOps {
    ops: Vec<Box<dyn ChangeOp>>,
}

impl ChangeOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one op.
    pub fn add(&mut self, op: impl ChangeOp + 'static) {
        self.ops.push(Box::new(op));
    }

    /// Appends several ops, keeping their order.
    pub fn add_all(&mut self, ops: impl IntoIterator<Item = Box<dyn ChangeOp>>) {
        self.ops.extend(ops);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ChangeOp> {
        self.ops.iter().map(|op| op.as_ref())
    }
}

impl ChangeOp for ChangeOps {
    /// Runs every member; valid iff all are.
    fn validate(&self, entity: &Entity) -> ValidationResult {
        self.ops.iter().map(|op| op.validate(entity)).collect()
    }

    /// Applies members in order, stopping at the first failure.
    fn apply(
        &mut self,
        entity: &mut Entity,
        mut summary: Option<&mut Summary>,
    ) -> Result<(), ChangeOpError> {
        for (i, op) in self.ops.iter_mut().enumerate() {
            if let Err(e) = op.apply(entity, summary.as_deref_mut()) {
                debug!(index = i, error = %e, "change op failed");
                return Err(e);
            }
        }
        Ok(())
    }
}

impl FromIterator<Box<dyn ChangeOp>> for ChangeOps {
    fn from_iter<I: IntoIterator<Item = Box<dyn ChangeOp>>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}
