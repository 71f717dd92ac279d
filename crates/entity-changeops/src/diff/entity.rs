//! Entity-level diff and three-way patch.
//!
//! An [`EntityDiff`] records what changed between two versions of an entity.
//! [`EntityPatcher`] replays such a diff onto a third version: an op applies
//! when its old value still holds, is skipped when its new value already
//! holds, and otherwise is a conflict.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::debug;

use crate::diff::{DiffOp, ListDiff, MapDiff};
use crate::error::PatchError;
use crate::model::{AliasGroupList, Entity, SiteLink, SiteLinkList, Statement, StatementList, TermList};

/// Which part of an entity a diff operand belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiffField {
    Label,
    Description,
    Aliases,
    Claim,
    ClaimOrder,
    SiteLink,
}

impl DiffField {
    pub fn as_str(self) -> &'static str {
        match self {
            DiffField::Label => "label",
            DiffField::Description => "description",
            DiffField::Aliases => "aliases",
            DiffField::Claim => "claim",
            DiffField::ClaimOrder => "claim-order",
            DiffField::SiteLink => "sitelink",
        }
    }
}

impl fmt::Display for DiffField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operand two diffs disagree on.
///
/// `key` is the language code, claim guid or site id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiffConflict {
    pub field: DiffField,
    pub key: String,
}

impl DiffConflict {
    pub fn new(field: DiffField, key: impl Into<String>) -> Self {
        Self {
            field,
            key: key.into(),
        }
    }
}

impl fmt::Display for DiffConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.field)
        } else {
            write!(f, "{} {:?}", self.field, self.key)
        }
    }
}

/// Claim guids in list order before and after an edit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClaimOrder {
    pub old: Vec<String>,
    pub new: Vec<String>,
}

impl ClaimOrder {
    fn between(old: &StatementList, new: &StatementList) -> Option<Self> {
        let old: Vec<String> = old.guids().map(str::to_string).collect();
        let new: Vec<String> = new.guids().map(str::to_string).collect();
        (old != new).then_some(Self { old, new })
    }

    /// True if claims present in both versions changed their relative order.
    pub fn is_reorder(&self) -> bool {
        let (old, new) = self.kept_order(|_| true);
        old != new
    }

    /// Old and new order of the guids present in both versions and accepted
    /// by `keep`.
    fn kept_order(&self, keep: impl Fn(&str) -> bool) -> (Vec<&str>, Vec<&str>) {
        let old = self
            .old
            .iter()
            .map(String::as_str)
            .filter(|g| self.new.iter().any(|n| n == g) && keep(*g))
            .collect();
        let new = self
            .new
            .iter()
            .map(String::as_str)
            .filter(|g| self.old.iter().any(|o| o == g) && keep(*g))
            .collect();
        (old, new)
    }

    fn contains(&self, guid: &str) -> bool {
        self.new.iter().any(|g| g == guid)
    }

    /// Nearest claim before `guid` in the new order that `present` accepts.
    fn predecessor(&self, guid: &str, present: impl Fn(&str) -> bool) -> Option<&str> {
        let pos = self.new.iter().position(|g| g == guid)?;
        self.new[..pos].iter().rev().map(String::as_str).find(|g| present(*g))
    }
}

/// Structural difference between two versions of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityDiff {
    pub labels: MapDiff<String, String>,
    pub descriptions: MapDiff<String, String>,
    /// Per language; languages without changes are absent.
    pub aliases: BTreeMap<String, ListDiff<String>>,
    /// Keyed by claim guid.
    pub claims: MapDiff<String, Statement>,
    /// Set when claims were added, removed or moved.
    pub claim_order: Option<ClaimOrder>,
    /// Keyed by site id.
    pub site_links: MapDiff<String, SiteLink>,
}

impl EntityDiff {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
            && self.descriptions.is_empty()
            && self.aliases.is_empty()
            && self.claims.is_empty()
            && self.claim_order.is_none()
            && self.site_links.is_empty()
    }

    /// Operands touched by both diffs with different resulting values.
    ///
    /// Identical changes on both sides do not conflict. Alias lists conflict
    /// when one side adds an alias the other removes. Claim order conflicts
    /// when both sides moved claims into different orders.
    pub fn conflicts_with(&self, other: &EntityDiff) -> Vec<DiffConflict> {
        let mut conflicts = Vec::new();
        map_conflicts(DiffField::Label, &self.labels, &other.labels, &mut conflicts);
        map_conflicts(
            DiffField::Description,
            &self.descriptions,
            &other.descriptions,
            &mut conflicts,
        );
        for (language, diff) in &self.aliases {
            if let Some(theirs) = other.aliases.get(language) {
                if diff.conflicts_with(theirs) {
                    conflicts.push(DiffConflict::new(DiffField::Aliases, language.as_str()));
                }
            }
        }
        map_conflicts(DiffField::Claim, &self.claims, &other.claims, &mut conflicts);
        if let (Some(ours), Some(theirs)) = (&self.claim_order, &other.claim_order) {
            if ours.is_reorder() && theirs.is_reorder() {
                let shared = |guid: &str| ours.contains(guid) && theirs.contains(guid);
                if ours.kept_order(shared).1 != theirs.kept_order(shared).1 {
                    conflicts.push(DiffConflict::new(DiffField::ClaimOrder, ""));
                }
            }
        }
        map_conflicts(
            DiffField::SiteLink,
            &self.site_links,
            &other.site_links,
            &mut conflicts,
        );
        conflicts
    }
}

fn map_conflicts<V: PartialEq>(
    field: DiffField,
    ours: &MapDiff<String, V>,
    theirs: &MapDiff<String, V>,
    out: &mut Vec<DiffConflict>,
) {
    for (key, op) in ours.iter() {
        if let Some(other) = theirs.get(key) {
            if op.new_value() != other.new_value() {
                out.push(DiffConflict::new(field, key.as_str()));
            }
        }
    }
}

/// Computes [`EntityDiff`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityDiffer;

impl EntityDiffer {
    pub fn new() -> Self {
        Self
    }

    /// Diffs `old` against `new`.
    ///
    /// Statements without a guid cannot be matched across versions and are
    /// left out of the claim diff.
    pub fn diff(&self, old: &Entity, new: &Entity) -> EntityDiff {
        let (old_fp, new_fp) = (old.fingerprint(), new.fingerprint());
        let no_links = SiteLinkList::new();

        EntityDiff {
            labels: term_diff(&old_fp.labels, &new_fp.labels),
            descriptions: term_diff(&old_fp.descriptions, &new_fp.descriptions),
            aliases: alias_diff(&old_fp.aliases, &new_fp.aliases),
            claims: MapDiff::between(keyed_statements(old.statements()), keyed_statements(new.statements())),
            claim_order: ClaimOrder::between(old.statements(), new.statements()),
            site_links: MapDiff::between(
                keyed_links(old.site_links().unwrap_or(&no_links)),
                keyed_links(new.site_links().unwrap_or(&no_links)),
            ),
        }
    }
}

fn term_diff(old: &TermList, new: &TermList) -> MapDiff<String, String> {
    let owned = |list: &TermList| -> Vec<(String, String)> {
        list.iter().map(|(l, t)| (l.to_string(), t.to_string())).collect()
    };
    MapDiff::between(owned(old), owned(new))
}

fn alias_diff(old: &AliasGroupList, new: &AliasGroupList) -> BTreeMap<String, ListDiff<String>> {
    let languages: BTreeSet<&str> = old.languages().chain(new.languages()).collect();
    languages
        .into_iter()
        .filter_map(|language| {
            ListDiff::non_empty_between(old.get(language), new.get(language))
                .map(|diff| (language.to_string(), diff))
        })
        .collect()
}

fn keyed_statements(statements: &StatementList) -> Vec<(String, Statement)> {
    statements
        .iter()
        .filter_map(|s| s.guid().map(|guid| (guid.to_string(), s.clone())))
        .collect()
}

fn keyed_links(links: &SiteLinkList) -> Vec<(String, SiteLink)> {
    links.iter().map(|l| (l.site_id.clone(), l.clone())).collect()
}

enum PatchStep<'a, V> {
    Keep,
    Set(&'a V),
    Remove,
    Conflict,
}

fn patch_step<'a, V: PartialEq>(current: Option<&V>, op: &'a DiffOp<V>) -> PatchStep<'a, V> {
    let new = op.new_value();
    if current == new {
        return PatchStep::Keep;
    }
    if current != op.old_value() {
        return PatchStep::Conflict;
    }
    match new {
        Some(value) => PatchStep::Set(value),
        None => PatchStep::Remove,
    }
}

/// Applies [`EntityDiff`]s to entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityPatcher;

impl EntityPatcher {
    pub fn new() -> Self {
        Self
    }

    /// Applies `diff` to `entity`.
    ///
    /// Every operand is attempted; on `Err` the entity holds the
    /// non-conflicting part of the patch, so callers patch a copy.
    pub fn patch(&self, entity: &mut Entity, diff: &EntityDiff) -> Result<(), PatchError> {
        let mut conflicts = Vec::new();

        let fingerprint = entity.fingerprint_mut();
        patch_terms(DiffField::Label, &mut fingerprint.labels, &diff.labels, &mut conflicts);
        patch_terms(
            DiffField::Description,
            &mut fingerprint.descriptions,
            &diff.descriptions,
            &mut conflicts,
        );
        for (language, aliases) in &diff.aliases {
            fingerprint.aliases.add(language, aliases.added.iter().cloned());
            fingerprint.aliases.remove(language, &aliases.removed);
        }

        patch_statements(
            entity.statements_mut(),
            &diff.claims,
            diff.claim_order.as_ref(),
            &mut conflicts,
        );

        if !diff.site_links.is_empty() {
            match entity.site_links_mut() {
                Some(links) => patch_site_links(links, &diff.site_links, &mut conflicts),
                None => conflicts.extend(
                    diff.site_links
                        .keys()
                        .map(|site| DiffConflict::new(DiffField::SiteLink, site.as_str())),
                ),
            }
        }

        if conflicts.is_empty() {
            Ok(())
        } else {
            debug!(count = conflicts.len(), "patch produced conflicts");
            Err(PatchError { conflicts })
        }
    }
}

fn patch_terms(
    field: DiffField,
    terms: &mut TermList,
    diff: &MapDiff<String, String>,
    conflicts: &mut Vec<DiffConflict>,
) {
    for (language, op) in diff.iter() {
        let current = terms.get(language).map(str::to_string);
        match patch_step(current.as_ref(), op) {
            PatchStep::Keep => {}
            PatchStep::Set(text) => {
                terms.set(language.as_str(), text.as_str());
            }
            PatchStep::Remove => {
                terms.remove(language);
            }
            PatchStep::Conflict => conflicts.push(DiffConflict::new(field, language.as_str())),
        }
    }
}

/// Changes and removals go first, then a reorder, then additions in their
/// new order so each lands after its nearest surviving predecessor.
fn patch_statements(
    statements: &mut StatementList,
    diff: &MapDiff<String, Statement>,
    order: Option<&ClaimOrder>,
    conflicts: &mut Vec<DiffConflict>,
) {
    for (guid, op) in diff.iter().filter(|(_, op)| !matches!(op, DiffOp::Add(_))) {
        match patch_step(statements.get_by_guid(guid), op) {
            PatchStep::Keep => {}
            PatchStep::Set(statement) => statements.set(statement.clone(), None),
            PatchStep::Remove => {
                statements.remove_by_guid(guid);
            }
            PatchStep::Conflict => conflicts.push(DiffConflict::new(DiffField::Claim, guid.as_str())),
        }
    }

    if let Some(order) = order.filter(|order| order.is_reorder()) {
        patch_claim_order(statements, order, conflicts);
    }

    let added: Vec<&String> = match order {
        Some(order) => order
            .new
            .iter()
            .filter(|guid| matches!(diff.get(*guid), Some(DiffOp::Add(_))))
            .collect(),
        None => diff
            .iter()
            .filter(|(_, op)| matches!(op, DiffOp::Add(_)))
            .map(|(guid, _)| guid)
            .collect(),
    };
    for guid in added {
        let Some(op) = diff.get(guid) else { continue };
        match patch_step(statements.get_by_guid(guid), op) {
            PatchStep::Keep | PatchStep::Remove => {}
            PatchStep::Set(statement) => {
                let index = order.map(|order| {
                    order
                        .predecessor(guid, |g| statements.index_of_guid(g).is_some())
                        .and_then(|g| statements.index_of_guid(g))
                        .map_or(0, |pos| pos + 1)
                });
                statements.set(statement.clone(), index);
            }
            PatchStep::Conflict => conflicts.push(DiffConflict::new(DiffField::Claim, guid.as_str())),
        }
    }
}

fn patch_claim_order(statements: &mut StatementList, order: &ClaimOrder, conflicts: &mut Vec<DiffConflict>) {
    let (old, new) = order.kept_order(|g| statements.index_of_guid(g).is_some());
    let current: Vec<&str> = statements.guids().filter(|g| new.contains(g)).collect();
    if current == new {
        return;
    }
    if current != old {
        conflicts.push(DiffConflict::new(DiffField::ClaimOrder, ""));
        return;
    }
    statements.reorder(&new);
}

fn patch_site_links(
    links: &mut SiteLinkList,
    diff: &MapDiff<String, SiteLink>,
    conflicts: &mut Vec<DiffConflict>,
) {
    for (site, op) in diff.iter() {
        match patch_step(links.get(site), op) {
            PatchStep::Keep => {}
            PatchStep::Set(link) => {
                links.set(link.clone());
            }
            PatchStep::Remove => {
                links.remove(site);
            }
            PatchStep::Conflict => conflicts.push(DiffConflict::new(DiffField::SiteLink, site.as_str())),
        }
    }
}
