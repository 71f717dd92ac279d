//! Merging the content of one entity into another.
//!
//! Content is moved by building two [`ChangeOps`] sequences, one removing
//! from the source and one adding to the target, and applying them in that
//! order. Conflicting labels, descriptions and site links stay on the source
//! for manual resolution and are listed in the [`MergeReport`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::changeop::{
    AliasAction, ChangeOp, ChangeOpAliases, ChangeOpClaimRemove, ChangeOpFactory, ChangeOpSiteLink,
    ChangeOps,
};
use crate::error::{ChangeOpError, InvalidArgument};
use crate::model::{dedup_badges, Entity, SiteLink};

/// Conflict kinds a merge may be told to ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConflictType {
    Label,
    Description,
}

impl ConflictType {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictType::Label => "label",
            ConflictType::Description => "description",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictType {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label" => Ok(ConflictType::Label),
            "description" => Ok(ConflictType::Description),
            other => Err(InvalidArgument::InvalidIgnoreConflict {
                value: other.to_string(),
            }),
        }
    }
}

/// A value left on the source because the target holds a different one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeConflict {
    Label {
        language: String,
        from: String,
        to: String,
    },
    Description {
        language: String,
        from: String,
        to: String,
    },
    SiteLink {
        site_id: String,
        from: String,
        to: String,
    },
}

/// Outcome of a merge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeReport {
    /// Conflicts not covered by the ignore list.
    pub conflicts: Vec<MergeConflict>,
    /// Statements moved to the target under new guids.
    pub moved_statements: usize,
    /// Statements dropped because the target already had the same content.
    pub dropped_statements: usize,
}

impl MergeReport {
    /// True if nothing was left for manual resolution.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Moves the content of `from` into `to`.
#[derive(Debug)]
pub struct ChangeOpsMerge<'a> {
    from: &'a mut Entity,
    to: &'a mut Entity,
    ignore_conflicts: BTreeSet<ConflictType>,
    factory: &'a ChangeOpFactory,
}

impl<'a> ChangeOpsMerge<'a> {
    /// Checks the merge arguments.
    ///
    /// `ignore_conflicts` may only contain `"label"` and `"description"`.
    /// Both entities need ids, must differ and must be of the same type.
    pub fn new(
        from: &'a mut Entity,
        to: &'a mut Entity,
        ignore_conflicts: &[&str],
        factory: &'a ChangeOpFactory,
    ) -> Result<Self, InvalidArgument> {
        let ignore_conflicts = ignore_conflicts
            .iter()
            .map(|c| c.parse::<ConflictType>())
            .collect::<Result<BTreeSet<_>, _>>()?;

        let from_id = from
            .id()
            .ok_or(InvalidArgument::MissingEntityId { role: "source" })?;
        let to_id = to
            .id()
            .ok_or(InvalidArgument::MissingEntityId { role: "target" })?;
        if from_id == to_id {
            return Err(InvalidArgument::SameEntity { id: from_id });
        }
        if from.entity_type() != to.entity_type() {
            return Err(InvalidArgument::EntityTypeMismatch {
                from: from.entity_type(),
                to: to.entity_type(),
            });
        }

        Ok(Self {
            from,
            to,
            ignore_conflicts,
            factory,
        })
    }

    fn is_ignored(&self, conflict: ConflictType) -> bool {
        self.ignore_conflicts.contains(&conflict)
    }

    /// Performs the merge, mutating both entities.
    pub fn apply(self) -> Result<MergeReport, ChangeOpError> {
        let mut from_ops = ChangeOps::new();
        let mut to_ops = ChangeOps::new();
        let mut report = MergeReport::default();

        self.merge_terms(ConflictType::Label, &mut from_ops, &mut to_ops, &mut report);
        self.merge_terms(ConflictType::Description, &mut from_ops, &mut to_ops, &mut report);
        self.merge_aliases(&mut from_ops, &mut to_ops);
        self.merge_site_links(&mut from_ops, &mut to_ops, &mut report);
        self.merge_statements(&mut from_ops, &mut to_ops, &mut report);

        let Self { from, to, .. } = self;
        from_ops.apply(from, None)?;
        // no op can address a statement without a guid
        from.statements_mut().retain(|s| s.guid().is_some());
        to_ops.apply(to, None)?;

        info!(
            from = ?from.id(),
            to = ?to.id(),
            conflicts = report.conflicts.len(),
            moved = report.moved_statements,
            dropped = report.dropped_statements,
            "merged entities"
        );
        Ok(report)
    }

    fn merge_terms(
        &self,
        kind: ConflictType,
        from_ops: &mut ChangeOps,
        to_ops: &mut ChangeOps,
        report: &mut MergeReport,
    ) {
        let (from_terms, to_terms) = match kind {
            ConflictType::Label => (&self.from.fingerprint().labels, &self.to.fingerprint().labels),
            ConflictType::Description => (
                &self.from.fingerprint().descriptions,
                &self.to.fingerprint().descriptions,
            ),
        };

        for (language, value) in from_terms.iter() {
            match to_terms.get(language) {
                None => {
                    to_ops.add_all([self.set_term_op(kind, language, Some(value))]);
                    from_ops.add_all([self.set_term_op(kind, language, None)]);
                }
                Some(existing) if existing == value => {
                    from_ops.add_all([self.set_term_op(kind, language, None)]);
                }
                Some(existing) => {
                    debug!(%kind, language, "conflicting term left on source");
                    if self.is_ignored(kind) {
                        continue;
                    }
                    let (language, from, to) =
                        (language.to_string(), value.to_string(), existing.to_string());
                    report.conflicts.push(match kind {
                        ConflictType::Label => MergeConflict::Label { language, from, to },
                        ConflictType::Description => MergeConflict::Description { language, from, to },
                    });
                }
            }
        }
    }

    fn set_term_op(&self, kind: ConflictType, language: &str, value: Option<&str>) -> Box<dyn ChangeOp> {
        match (kind, value) {
            (ConflictType::Label, Some(v)) => Box::new(self.factory.new_set_label_op(language, v)),
            (ConflictType::Label, None) => Box::new(self.factory.new_remove_label_op(language)),
            (ConflictType::Description, Some(v)) => {
                Box::new(self.factory.new_set_description_op(language, v))
            }
            (ConflictType::Description, None) => {
                Box::new(self.factory.new_remove_description_op(language))
            }
        }
    }

    fn merge_aliases(&self, from_ops: &mut ChangeOps, to_ops: &mut ChangeOps) {
        let terms = self.factory.term_validators();
        for (language, aliases) in self.from.fingerprint().aliases.iter() {
            let aliases = aliases.to_vec();
            to_ops.add(ChangeOpAliases::with_action(
                language,
                aliases.clone(),
                AliasAction::Add,
                terms.clone(),
            ));
            from_ops.add(ChangeOpAliases::with_action(
                language,
                aliases,
                AliasAction::Remove,
                terms.clone(),
            ));
        }
    }

    fn merge_site_links(&self, from_ops: &mut ChangeOps, to_ops: &mut ChangeOps, report: &mut MergeReport) {
        let (Some(from_links), Some(to_links)) = (self.from.site_links(), self.to.site_links()) else {
            return;
        };

        for link in from_links.iter() {
            let merged = match to_links.get(&link.site_id) {
                None => link.clone(),
                Some(existing) if existing.page_title == link.page_title => {
                    let badges = existing.badges.iter().chain(&link.badges).copied();
                    SiteLink::new(&link.site_id, &existing.page_title).with_badges(dedup_badges(badges))
                }
                Some(existing) => {
                    debug!(site = %link.site_id, "conflicting site link left on source");
                    report.conflicts.push(MergeConflict::SiteLink {
                        site_id: link.site_id.clone(),
                        from: link.page_title.clone(),
                        to: existing.page_title.clone(),
                    });
                    continue;
                }
            };
            from_ops.add(ChangeOpSiteLink::removal(&link.site_id));
            to_ops.add(ChangeOpSiteLink::from_existing(merged));
        }
    }

    /// Statements already on the target, or repeated on the source, are
    /// dropped instead of moved.
    fn merge_statements(&self, from_ops: &mut ChangeOps, to_ops: &mut ChangeOps, report: &mut MergeReport) {
        let to_statements = self.to.statements();
        let mut seen = BTreeSet::new();
        for statement in self.from.statements() {
            let hash = statement.hash();
            if to_statements.contains_hash(&hash) || !seen.insert(hash) {
                report.dropped_statements += 1;
            } else {
                let mut moved = statement.clone();
                moved.claim.guid = None;
                to_ops.add(self.factory.new_claim_op(moved, None));
                report.moved_statements += 1;
            }

            if let Some(guid) = statement.guid() {
                if let Ok(op) = ChangeOpClaimRemove::new(guid) {
                    from_ops.add(op);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Settings;
    use crate::model::builder::{ItemBuilder, PropertyBuilder, StatementBuilder};
    use crate::model::{DataType, DataValue, ItemId, PropertyId, Snak};
    use crate::validate::PropertyDataTypes;

    fn factory() -> ChangeOpFactory {
        ChangeOpFactory::new(Settings::default(), Arc::new(PropertyDataTypes::new()))
    }

    fn item(id: u64) -> ItemBuilder {
        ItemBuilder::new().id(ItemId::new(id))
    }

    fn merge(from: &mut Entity, to: &mut Entity, ignore: &[&str]) -> MergeReport {
        let factory = factory();
        ChangeOpsMerge::new(from, to, ignore, &factory)
            .unwrap()
            .apply()
            .unwrap()
    }

    #[test]
    fn test_label_moves_to_empty_target() {
        let mut from = item(1).label("en", "foo").build();
        let mut to = item(2).build();
        let report = merge(&mut from, &mut to, &[]);
        assert!(report.is_clean());
        assert!(from.fingerprint().labels.is_empty());
        assert_eq!(to.fingerprint().labels.get("en"), Some("foo"));
    }

    #[test]
    fn test_identical_label_dropped_from_source() {
        let mut from = item(1).description("en", "same").build();
        let mut to = item(2).description("en", "same").build();
        merge(&mut from, &mut to, &[]);
        assert!(from.fingerprint().descriptions.is_empty());
        assert_eq!(to.fingerprint().descriptions.get("en"), Some("same"));
    }

    #[test]
    fn test_conflicting_label_left_in_place() {
        let mut from = item(1).label("en", "foo").build();
        let mut to = item(2).label("en", "bar").build();
        let report = merge(&mut from, &mut to, &[]);
        assert_eq!(
            report.conflicts,
            vec![MergeConflict::Label {
                language: "en".to_string(),
                from: "foo".to_string(),
                to: "bar".to_string(),
            }]
        );
        assert_eq!(from.fingerprint().labels.get("en"), Some("foo"));
        assert_eq!(to.fingerprint().labels.get("en"), Some("bar"));
    }

    #[test]
    fn test_ignored_label_conflict() {
        let mut from = item(1).label("en", "foo").build();
        let mut to = item(2).label("en", "bar").build();
        let report = merge(&mut from, &mut to, &["label"]);
        assert!(report.is_clean());
        assert_eq!(from.fingerprint().labels.get("en"), Some("foo"));
        assert_eq!(to.fingerprint().labels.get("en"), Some("bar"));
    }

    #[test]
    fn test_aliases_union() {
        let mut from = item(1).aliases("en", ["a", "b"]).build();
        let mut to = item(2).aliases("en", ["b", "c"]).build();
        merge(&mut from, &mut to, &[]);
        assert!(from.fingerprint().aliases.is_empty());
        let expected: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert!(to.fingerprint().aliases.same_aliases("en", &expected));
    }

    #[test]
    fn test_site_links() {
        let (q1, q2) = (ItemId::new(100), ItemId::new(200));
        let mut from = item(1)
            .site_link("enwiki", "Foo", [q1])
            .site_link("dewiki", "Foo", Vec::<ItemId>::new())
            .site_link("plwiki", "Foo", Vec::<ItemId>::new())
            .build();
        let mut to = item(2)
            .site_link("enwiki", "Foo", [q2])
            .site_link("plwiki", "Bar", Vec::<ItemId>::new())
            .build();
        let report = merge(&mut from, &mut to, &["label", "description"]);

        let to_links = to.site_links().unwrap();
        assert_eq!(to_links.get("enwiki").map(|l| l.badges.clone()), Some(vec![q2, q1]));
        assert_eq!(to_links.get("dewiki").map(|l| l.page_title.as_str()), Some("Foo"));
        assert_eq!(to_links.get("plwiki").map(|l| l.page_title.as_str()), Some("Bar"));

        let from_links = from.site_links().unwrap();
        assert_eq!(from_links.site_ids().collect::<Vec<_>>(), vec!["plwiki"]);
        assert!(matches!(report.conflicts.as_slice(), [MergeConflict::SiteLink { .. }]));
    }

    #[test]
    fn test_statements_moved_with_new_guids() {
        let p = PropertyId::new(5);
        let mut from = item(1)
            .statement(StatementBuilder::string(p, "moved").guid("Q1$D8404BAC-0C49-4D1B-8EC4-5DD9CA8AE4B8"))
            .statement(StatementBuilder::string(p, "dup").guid("Q1$0B1A4CBB-5D4E-4A9C-9A0B-52B2E1B3C4D5"))
            .build();
        let mut to = item(2)
            .statement(StatementBuilder::string(p, "dup").guid("Q2$6F0B1B3E-2C7A-4B5B-8F7E-1C2D3E4F5A6B"))
            .build();

        let report = merge(&mut from, &mut to, &[]);
        assert_eq!(report.moved_statements, 1);
        assert_eq!(report.dropped_statements, 1);
        assert!(from.statements().is_empty());
        assert_eq!(to.statements().len(), 2);
        for statement in to.statements() {
            assert!(statement.guid().unwrap().starts_with("Q2$"));
        }
        let moved = Snak::value(p, DataValue::String("moved".to_string()));
        assert!(to.statements().iter().any(|s| s.main_snak() == &moved));
    }

    #[test]
    fn test_repeated_and_unaddressed_statements() {
        let p = PropertyId::new(5);
        let mut from = item(1)
            .statement(StatementBuilder::string(p, "twice").guid("Q1$D8404BAC-0C49-4D1B-8EC4-5DD9CA8AE4B8"))
            .statement(StatementBuilder::string(p, "twice").guid("Q1$0B1A4CBB-5D4E-4A9C-9A0B-52B2E1B3C4D5"))
            .statement(StatementBuilder::string(p, "no guid"))
            .build();
        let mut to = item(2).build();

        let report = merge(&mut from, &mut to, &[]);
        assert_eq!(report.moved_statements, 2);
        assert_eq!(report.dropped_statements, 1);
        assert!(from.statements().is_empty());
        assert_eq!(to.statements().len(), 2);
        let twice = Snak::value(p, DataValue::String("twice".to_string()));
        assert_eq!(to.statements().iter().filter(|s| s.main_snak() == &twice).count(), 1);
    }

    #[test]
    fn test_invalid_arguments() {
        let factory = factory();
        let mut a = item(1).build();
        let mut b = item(2).build();
        assert_eq!(
            ChangeOpsMerge::new(&mut a, &mut b, &["aliases"], &factory).unwrap_err(),
            InvalidArgument::InvalidIgnoreConflict {
                value: "aliases".to_string()
            }
        );

        let mut same = item(1).build();
        assert!(matches!(
            ChangeOpsMerge::new(&mut a, &mut same, &[], &factory),
            Err(InvalidArgument::SameEntity { .. })
        ));

        let mut property = PropertyBuilder::new(DataType::String).id(PropertyId::new(3)).build();
        assert!(matches!(
            ChangeOpsMerge::new(&mut a, &mut property, &[], &factory),
            Err(InvalidArgument::EntityTypeMismatch { .. })
        ));

        let mut anonymous = ItemBuilder::new().build();
        assert!(matches!(
            ChangeOpsMerge::new(&mut anonymous, &mut b, &[], &factory),
            Err(InvalidArgument::MissingEntityId { role: "source" })
        ));
    }
}
