//! Claim and statement change ops.
//!
//! All ops that address an existing claim by guid check that the guid names
//! the target entity before touching anything.

use tracing::debug;

use crate::changeop::ChangeOp;
use crate::error::{ChangeOpError, InvalidArgument};
use crate::guid::{check_guid_owner, ClaimGuidGenerator};
use crate::model::summary::update_summary;
use crate::model::{Entity, EntityId, Rank, Reference, Snak, Statement, Summary, SummaryArg};
use crate::validate::{SnakValidator, ValidationResult};

fn entity_id(entity: &Entity) -> Result<EntityId, ChangeOpError> {
    entity.id().ok_or(ChangeOpError::EntityWithoutId)
}

/// Resolves `guid` to a statement of `entity`, checking ownership first.
fn statement_mut<'e>(entity: &'e mut Entity, guid: &str) -> Result<&'e mut Statement, ChangeOpError> {
    check_guid_owner(guid, entity_id(entity)?)?;
    entity
        .statements_mut()
        .get_by_guid_mut(guid)
        .ok_or_else(|| ChangeOpError::ClaimNotFound {
            guid: guid.to_string(),
        })
}

fn non_empty(value: &str, name: &'static str) -> Result<String, InvalidArgument> {
    if value.is_empty() {
        Err(InvalidArgument::EmptyArgument { name })
    } else {
        Ok(value.to_string())
    }
}

/// Adds a statement, or replaces the statement with the same guid.
///
/// A statement without guid gets a fresh one scoped to the target entity.
/// Re-applying a statement that is already present unchanged is a no-op.
#[derive(Debug, Clone)]
pub struct ChangeOpClaim {
    statement: Statement,
    generator: ClaimGuidGenerator,
    validator: SnakValidator,
    index: Option<usize>,
}

impl ChangeOpClaim {
    pub fn new(
        statement: Statement,
        generator: ClaimGuidGenerator,
        validator: SnakValidator,
        index: Option<usize>,
    ) -> Self {
        Self {
            statement,
            generator,
            validator,
            index,
        }
    }

    /// The statement's guid, once known.
    pub fn claim_guid(&self) -> Option<&str> {
        self.statement.guid()
    }
}

impl ChangeOp for ChangeOpClaim {
    fn validate(&self, _entity: &Entity) -> ValidationResult {
        self.validator.validate_statement(&self.statement)
    }

    fn apply(
        &mut self,
        entity: &mut Entity,
        summary: Option<&mut Summary>,
    ) -> Result<(), ChangeOpError> {
        let entity_id = entity_id(entity)?;
        let guid = match self.statement.guid() {
            Some(guid) => check_guid_owner(guid, entity_id)?.as_str().to_string(),
            None => {
                let guid = self.generator.new_guid(entity_id);
                self.statement.set_guid(guid.as_str());
                guid
            }
        };

        let statements = entity.statements_mut();
        let action = match statements.get_by_guid(&guid) {
            Some(existing) if existing.hash() == self.statement.hash() && self.index.is_none() => {
                debug!(%guid, "statement already present, nothing to do");
                return Ok(());
            }
            Some(_) => "update",
            None => "create",
        };

        statements.set(self.statement.clone(), self.index);
        debug!(%guid, action, index = ?self.index, "applied claim change");
        let arg = SummaryArg::Snak(self.statement.main_snak().clone());
        update_summary(summary, action, None, vec![arg]);
        Ok(())
    }
}

/// Replaces the main snak of a claim, or creates a claim when the guid is
/// empty.
#[derive(Debug, Clone)]
pub struct ChangeOpMainSnak {
    guid: String,
    snak: Snak,
    generator: ClaimGuidGenerator,
    validator: SnakValidator,
}

impl ChangeOpMainSnak {
    pub fn new(guid: &str, snak: Snak, generator: ClaimGuidGenerator, validator: SnakValidator) -> Self {
        Self {
            guid: guid.to_string(),
            snak,
            generator,
            validator,
        }
    }

    /// The claim guid; generated on apply when the op created the claim.
    pub fn claim_guid(&self) -> &str {
        &self.guid
    }
}

impl ChangeOp for ChangeOpMainSnak {
    fn validate(&self, _entity: &Entity) -> ValidationResult {
        self.validator.validate_snak(&self.snak)
    }

    fn apply(
        &mut self,
        entity: &mut Entity,
        summary: Option<&mut Summary>,
    ) -> Result<(), ChangeOpError> {
        if self.guid.is_empty() {
            let entity_id = entity_id(entity)?;
            self.validator
                .validate_snak(&self.snak)
                .into_result()
                .map_err(ChangeOpError::InvalidSnak)?;

            let guid = self.generator.new_guid(entity_id);
            let mut statement = Statement::new(self.snak.clone());
            statement.set_guid(guid.as_str());
            entity.statements_mut().push(statement);
            debug!(%guid, "created claim from main snak");
            self.guid = guid;
            update_summary(summary, "create", None, vec![SummaryArg::Snak(self.snak.clone())]);
            return Ok(());
        }

        let statement = statement_mut(entity, &self.guid)?;
        let expected = statement.property();
        if expected != self.snak.property() {
            return Err(ChangeOpError::PropertyMismatch {
                expected,
                actual: self.snak.property(),
            });
        }
        self.validator
            .validate_snak(&self.snak)
            .into_result()
            .map_err(ChangeOpError::InvalidSnak)?;

        statement.claim.main_snak = self.snak.clone();
        debug!(guid = %self.guid, "replaced main snak");
        update_summary(summary, "update", None, vec![SummaryArg::Snak(self.snak.clone())]);
        Ok(())
    }
}

/// Removes a claim by guid.
#[derive(Debug, Clone)]
pub struct ChangeOpClaimRemove {
    guid: String,
}

impl ChangeOpClaimRemove {
    pub fn new(guid: &str) -> Result<Self, InvalidArgument> {
        Ok(Self {
            guid: non_empty(guid, "claim guid")?,
        })
    }
}

impl ChangeOp for ChangeOpClaimRemove {
    fn validate(&self, _entity: &Entity) -> ValidationResult {
        ValidationResult::ok()
    }

    fn apply(
        &mut self,
        entity: &mut Entity,
        summary: Option<&mut Summary>,
    ) -> Result<(), ChangeOpError> {
        check_guid_owner(&self.guid, entity_id(entity)?)?;
        let removed = entity
            .statements_mut()
            .remove_by_guid(&self.guid)
            .ok_or_else(|| ChangeOpError::ClaimNotFound {
                guid: self.guid.clone(),
            })?;
        debug!(guid = %self.guid, "removed claim");
        update_summary(summary, "remove", None, vec![SummaryArg::Snak(removed.claim.main_snak)]);
        Ok(())
    }
}

/// Sets the rank of a statement.
#[derive(Debug, Clone)]
pub struct ChangeOpStatementRank {
    guid: String,
    rank: Rank,
}

impl ChangeOpStatementRank {
    pub fn new(guid: &str, rank: Rank) -> Result<Self, InvalidArgument> {
        Ok(Self {
            guid: non_empty(guid, "claim guid")?,
            rank,
        })
    }
}

impl ChangeOp for ChangeOpStatementRank {
    fn validate(&self, _entity: &Entity) -> ValidationResult {
        ValidationResult::ok()
    }

    fn apply(
        &mut self,
        entity: &mut Entity,
        summary: Option<&mut Summary>,
    ) -> Result<(), ChangeOpError> {
        let statement = statement_mut(entity, &self.guid)?;
        let old = std::mem::replace(&mut statement.rank, self.rank);
        debug!(guid = %self.guid, from = old.as_str(), to = self.rank.as_str(), "set rank");
        let args = vec![
            SummaryArg::Snak(statement.main_snak().clone()),
            self.rank.as_str().into(),
        ];
        update_summary(summary, "set", None, args);
        Ok(())
    }
}

/// Adds a qualifier (empty hash) or replaces the qualifier with the given
/// hash.
#[derive(Debug, Clone)]
pub struct ChangeOpQualifier {
    guid: String,
    snak: Snak,
    snak_hash: String,
    validator: SnakValidator,
}

impl ChangeOpQualifier {
    pub fn new(
        guid: &str,
        snak: Snak,
        snak_hash: &str,
        validator: SnakValidator,
    ) -> Result<Self, InvalidArgument> {
        Ok(Self {
            guid: non_empty(guid, "claim guid")?,
            snak,
            snak_hash: snak_hash.to_string(),
            validator,
        })
    }
}

impl ChangeOp for ChangeOpQualifier {
    fn validate(&self, _entity: &Entity) -> ValidationResult {
        self.validator.validate_snak(&self.snak)
    }

    fn apply(
        &mut self,
        entity: &mut Entity,
        summary: Option<&mut Summary>,
    ) -> Result<(), ChangeOpError> {
        let statement = statement_mut(entity, &self.guid)?;
        let qualifiers = &mut statement.claim.qualifiers;
        let new_hash = self.snak.hash();

        let action = if self.snak_hash.is_empty() {
            if !qualifiers.add(self.snak.clone()) {
                return Err(ChangeOpError::QualifierExists { hash: new_hash });
            }
            "add"
        } else {
            if !qualifiers.contains_hash(&self.snak_hash) {
                return Err(ChangeOpError::QualifierNotFound {
                    hash: self.snak_hash.clone(),
                });
            }
            if new_hash != self.snak_hash && qualifiers.contains_hash(&new_hash) {
                return Err(ChangeOpError::QualifierExists { hash: new_hash });
            }
            qualifiers.replace_by_hash(&self.snak_hash, self.snak.clone());
            "update"
        };

        debug!(guid = %self.guid, action, "applied qualifier change");
        update_summary(summary, action, None, vec![SummaryArg::Snak(self.snak.clone())]);
        Ok(())
    }
}

/// Removes one qualifier by hash. Missing qualifiers are ignored.
#[derive(Debug, Clone)]
pub struct ChangeOpQualifierRemove {
    guid: String,
    snak_hash: String,
}

impl ChangeOpQualifierRemove {
    pub fn new(guid: &str, snak_hash: &str) -> Result<Self, InvalidArgument> {
        Ok(Self {
            guid: non_empty(guid, "claim guid")?,
            snak_hash: non_empty(snak_hash, "snak hash")?,
        })
    }
}

impl ChangeOp for ChangeOpQualifierRemove {
    fn validate(&self, _entity: &Entity) -> ValidationResult {
        ValidationResult::ok()
    }

    fn apply(
        &mut self,
        entity: &mut Entity,
        summary: Option<&mut Summary>,
    ) -> Result<(), ChangeOpError> {
        let statement = statement_mut(entity, &self.guid)?;
        let removed = statement.claim.qualifiers.remove_by_hash(&self.snak_hash);
        debug!(guid = %self.guid, hash = %self.snak_hash, removed = removed.is_some(), "removed qualifier");
        let args = removed.map(SummaryArg::Snak).into_iter().collect();
        update_summary(summary, "remove", None, args);
        Ok(())
    }
}

/// Adds a reference (empty hash) or replaces the reference with the given
/// hash, optionally at a position.
#[derive(Debug, Clone)]
pub struct ChangeOpReference {
    guid: String,
    reference: Reference,
    reference_hash: String,
    index: Option<usize>,
    validator: SnakValidator,
}

impl ChangeOpReference {
    pub fn new(
        guid: &str,
        reference: Reference,
        reference_hash: &str,
        index: Option<usize>,
        validator: SnakValidator,
    ) -> Result<Self, InvalidArgument> {
        Ok(Self {
            guid: non_empty(guid, "claim guid")?,
            reference,
            reference_hash: reference_hash.to_string(),
            index,
            validator,
        })
    }
}

impl ChangeOp for ChangeOpReference {
    fn validate(&self, _entity: &Entity) -> ValidationResult {
        self.reference
            .snaks
            .iter()
            .map(|snak| self.validator.validate_snak(snak))
            .collect()
    }

    fn apply(
        &mut self,
        entity: &mut Entity,
        summary: Option<&mut Summary>,
    ) -> Result<(), ChangeOpError> {
        let statement = statement_mut(entity, &self.guid)?;
        let references = &mut statement.references;
        let new_hash = self.reference.hash();

        let action = if self.reference_hash.is_empty() {
            if !references.add(self.reference.clone(), self.index) {
                return Err(ChangeOpError::ReferenceExists { hash: new_hash });
            }
            "add"
        } else {
            let Some(pos) = references.index_of_hash(&self.reference_hash) else {
                return Err(ChangeOpError::ReferenceNotFound {
                    hash: self.reference_hash.clone(),
                });
            };
            if new_hash != self.reference_hash && references.contains_hash(&new_hash) {
                return Err(ChangeOpError::ReferenceExists { hash: new_hash });
            }
            references.remove_by_hash(&self.reference_hash);
            references.add(self.reference.clone(), Some(self.index.unwrap_or(pos)));
            "set"
        };

        debug!(guid = %self.guid, action, "applied reference change");
        let args = self.reference.snaks.iter().cloned().map(SummaryArg::Snak).collect();
        update_summary(summary, action, None, args);
        Ok(())
    }
}

/// Removes a reference by hash.
#[derive(Debug, Clone)]
pub struct ChangeOpReferenceRemove {
    guid: String,
    reference_hash: String,
}

impl ChangeOpReferenceRemove {
    pub fn new(guid: &str, reference_hash: &str) -> Result<Self, InvalidArgument> {
        Ok(Self {
            guid: non_empty(guid, "claim guid")?,
            reference_hash: non_empty(reference_hash, "reference hash")?,
        })
    }
}

impl ChangeOp for ChangeOpReferenceRemove {
    fn validate(&self, _entity: &Entity) -> ValidationResult {
        ValidationResult::ok()
    }

    fn apply(
        &mut self,
        entity: &mut Entity,
        summary: Option<&mut Summary>,
    ) -> Result<(), ChangeOpError> {
        let statement = statement_mut(entity, &self.guid)?;
        let removed = statement
            .references
            .remove_by_hash(&self.reference_hash)
            .ok_or_else(|| ChangeOpError::ReferenceNotFound {
                hash: self.reference_hash.clone(),
            })?;
        debug!(guid = %self.guid, hash = %self.reference_hash, "removed reference");
        let args = removed.snaks.iter().cloned().map(SummaryArg::Snak).collect();
        update_summary(summary, "remove", None, args);
        Ok(())
    }
}
