//! Boundary constructor for change ops.
//!
//! Request handlers deal in raw strings. The factory parses them once
//! (action keywords, badge ids, guids, hashes) and hands out typed ops wired
//! to the configured validators.

use std::sync::Arc;

use crate::changeop::{
    AliasAction, ChangeOpAliases, ChangeOpClaim, ChangeOpClaimRemove, ChangeOpDescription,
    ChangeOpLabel, ChangeOpMainSnak, ChangeOpQualifier, ChangeOpQualifierRemove, ChangeOpReference,
    ChangeOpReferenceRemove, ChangeOpSiteLink, ChangeOpStatementRank, ChangeOpsMerge,
};
use crate::config::Settings;
use crate::error::InvalidArgument;
use crate::guid::ClaimGuidGenerator;
use crate::limits::MAX_ALIASES_PER_OP;
use crate::model::{Entity, ItemId, Rank, Reference, Snak, Statement};
use crate::validate::{PropertyDataTypeLookup, SnakValidator, TermValidators};

/// Creates change ops from request-level input.
#[derive(Debug, Clone)]
pub struct ChangeOpFactory {
    settings: Settings,
    terms: TermValidators,
    snaks: SnakValidator,
    generator: ClaimGuidGenerator,
}

impl ChangeOpFactory {
    pub fn new(settings: Settings, data_types: Arc<dyn PropertyDataTypeLookup>) -> Self {
        let terms = TermValidators::from_settings(&settings);
        let snaks = SnakValidator::from_settings(data_types, &settings);
        Self {
            settings,
            terms,
            snaks,
            generator: ClaimGuidGenerator::new(),
        }
    }

    /// Replaces the term validators, e.g. to enable label uniqueness checks.
    pub fn with_term_validators(mut self, terms: TermValidators) -> Self {
        self.terms = terms;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn term_validators(&self) -> &TermValidators {
        &self.terms
    }

    pub fn snak_validator(&self) -> &SnakValidator {
        &self.snaks
    }

    pub fn guid_generator(&self) -> ClaimGuidGenerator {
        self.generator
    }

    pub fn new_set_label_op(&self, language: &str, label: &str) -> ChangeOpLabel {
        ChangeOpLabel::new(language, Some(label), self.terms.clone())
    }

    pub fn new_remove_label_op(&self, language: &str) -> ChangeOpLabel {
        ChangeOpLabel::new(language, None, self.terms.clone())
    }

    pub fn new_set_description_op(&self, language: &str, description: &str) -> ChangeOpDescription {
        ChangeOpDescription::new(language, Some(description), self.terms.clone())
    }

    pub fn new_remove_description_op(&self, language: &str) -> ChangeOpDescription {
        ChangeOpDescription::new(language, None, self.terms.clone())
    }

    /// Alias op from a raw action keyword (`"add"`, `"set"`, `"remove"` or `""`).
    ///
    /// Unknown keywords are reported when the op is applied.
    pub fn new_aliases_op(
        &self,
        language: &str,
        aliases: &[&str],
        action: &str,
    ) -> Result<ChangeOpAliases, InvalidArgument> {
        let aliases = Self::alias_list(aliases)?;
        Ok(ChangeOpAliases::new(language, aliases, action, self.terms.clone()))
    }

    pub fn new_add_aliases_op(&self, language: &str, aliases: &[&str]) -> Result<ChangeOpAliases, InvalidArgument> {
        self.typed_aliases_op(language, aliases, AliasAction::Add)
    }

    pub fn new_set_aliases_op(&self, language: &str, aliases: &[&str]) -> Result<ChangeOpAliases, InvalidArgument> {
        self.typed_aliases_op(language, aliases, AliasAction::Set)
    }

    pub fn new_remove_aliases_op(&self, language: &str, aliases: &[&str]) -> Result<ChangeOpAliases, InvalidArgument> {
        self.typed_aliases_op(language, aliases, AliasAction::Remove)
    }

    fn typed_aliases_op(
        &self,
        language: &str,
        aliases: &[&str],
        action: AliasAction,
    ) -> Result<ChangeOpAliases, InvalidArgument> {
        let aliases = Self::alias_list(aliases)?;
        Ok(ChangeOpAliases::with_action(language, aliases, action, self.terms.clone()))
    }

    fn alias_list(aliases: &[&str]) -> Result<Vec<String>, InvalidArgument> {
        if aliases.len() > MAX_ALIASES_PER_OP {
            return Err(InvalidArgument::TooManyAliases {
                count: aliases.len(),
                max: MAX_ALIASES_PER_OP,
            });
        }
        Ok(aliases.iter().map(|a| a.to_string()).collect())
    }

    /// Site link op from raw strings. Badge ids are parsed case-insensitively.
    pub fn new_site_link_op(
        &self,
        site_id: &str,
        page_title: Option<&str>,
        badges: Option<&[&str]>,
    ) -> Result<ChangeOpSiteLink, InvalidArgument> {
        let badges = badges
            .map(|badges| {
                badges
                    .iter()
                    .map(|b| b.parse::<ItemId>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        ChangeOpSiteLink::new(site_id, page_title, badges, &self.settings)
    }

    pub fn new_remove_site_link_op(&self, site_id: &str) -> Result<ChangeOpSiteLink, InvalidArgument> {
        ChangeOpSiteLink::remove(site_id, &self.settings)
    }

    pub fn new_claim_op(&self, statement: Statement, index: Option<usize>) -> ChangeOpClaim {
        ChangeOpClaim::new(statement, self.generator, self.snaks.clone(), index)
    }

    /// Main snak op; an empty guid creates a new claim.
    pub fn new_main_snak_op(&self, guid: &str, snak: Snak) -> ChangeOpMainSnak {
        ChangeOpMainSnak::new(guid, snak, self.generator, self.snaks.clone())
    }

    pub fn new_remove_claim_op(&self, guid: &str) -> Result<ChangeOpClaimRemove, InvalidArgument> {
        ChangeOpClaimRemove::new(guid)
    }

    /// Rank op from a lower-case rank name.
    pub fn new_statement_rank_op(&self, guid: &str, rank: &str) -> Result<ChangeOpStatementRank, InvalidArgument> {
        let rank = Rank::from_name(rank).ok_or_else(|| InvalidArgument::UnknownRank {
            value: rank.to_string(),
        })?;
        ChangeOpStatementRank::new(guid, rank)
    }

    pub fn new_qualifier_op(&self, guid: &str, snak: Snak, snak_hash: &str) -> Result<ChangeOpQualifier, InvalidArgument> {
        ChangeOpQualifier::new(guid, snak, snak_hash, self.snaks.clone())
    }

    pub fn new_remove_qualifier_op(&self, guid: &str, snak_hash: &str) -> Result<ChangeOpQualifierRemove, InvalidArgument> {
        ChangeOpQualifierRemove::new(guid, snak_hash)
    }

    pub fn new_reference_op(
        &self,
        guid: &str,
        reference: Reference,
        reference_hash: &str,
        index: Option<usize>,
    ) -> Result<ChangeOpReference, InvalidArgument> {
        ChangeOpReference::new(guid, reference, reference_hash, index, self.snaks.clone())
    }

    pub fn new_remove_reference_op(
        &self,
        guid: &str,
        reference_hash: &str,
    ) -> Result<ChangeOpReferenceRemove, InvalidArgument> {
        ChangeOpReferenceRemove::new(guid, reference_hash)
    }

    /// Merge of `from` into `to`. See [`ChangeOpsMerge::new`].
    pub fn new_merge_op<'a>(
        &'a self,
        from: &'a mut Entity,
        to: &'a mut Entity,
        ignore_conflicts: &[&str],
    ) -> Result<ChangeOpsMerge<'a>, InvalidArgument> {
        ChangeOpsMerge::new(from, to, ignore_conflicts, self)
    }
}
