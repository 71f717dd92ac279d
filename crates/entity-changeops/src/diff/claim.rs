//! Claim diffing.

use crate::diff::{DiffOp, ListDiff};
use crate::model::{AsClaim, Rank, Reference, ReferenceList, Snak};

/// Structural difference between two versions of one claim.
///
/// Each part is `None` when unchanged. A difference with every part `None`
/// equals `ClaimDifference::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClaimDifference {
    pub main_snak_change: Option<DiffOp<Snak>>,
    pub qualifier_changes: Option<ListDiff<Snak>>,
    pub reference_changes: Option<ListDiff<Reference>>,
    pub rank_change: Option<DiffOp<Rank>>,
}

impl ClaimDifference {
    pub fn is_empty(&self) -> bool {
        self.main_snak_change.is_none()
            && self.qualifier_changes.is_none()
            && self.reference_changes.is_none()
            && self.rank_change.is_none()
    }
}

/// Computes [`ClaimDifference`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimDiffer;

impl ClaimDiffer {
    pub fn new() -> Self {
        Self
    }

    /// Diffs `old` against `new`.
    ///
    /// Qualifiers and references are compared as sets. Rank is only compared
    /// when both sides are statements.
    pub fn diff_claims<O, N>(&self, old: &O, new: &N) -> ClaimDifference
    where
        O: AsClaim + ?Sized,
        N: AsClaim + ?Sized,
    {
        let (old_claim, new_claim) = (old.as_claim(), new.as_claim());

        let main_snak_change = DiffOp::between(
            Some(old_claim.main_snak.clone()),
            Some(new_claim.main_snak.clone()),
        );
        let qualifier_changes =
            ListDiff::non_empty_between(old_claim.qualifiers.iter(), new_claim.qualifiers.iter());

        let no_references = ReferenceList::new();
        let old_refs = old.references().unwrap_or(&no_references);
        let new_refs = new.references().unwrap_or(&no_references);
        let reference_changes = ListDiff::non_empty_between(old_refs.iter(), new_refs.iter());

        let rank_change = match (old.rank(), new.rank()) {
            (Some(old), Some(new)) => DiffOp::between(Some(old), Some(new)),
            _ => None,
        };

        ClaimDifference {
            main_snak_change,
            qualifier_changes,
            reference_changes,
            rank_change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builder::StatementBuilder;
    use crate::model::{Claim, DataValue, PropertyId, Statement};

    fn snak(prop: u64, s: &str) -> Snak {
        Snak::value(PropertyId::new(prop), DataValue::String(s.to_string()))
    }

    fn statement() -> Statement {
        StatementBuilder::new(snak(1, "main"))
            .qualifier(snak(2, "q"))
            .reference([snak(3, "r")])
            .build()
    }

    #[test]
    fn test_identical_claims_have_empty_diff() {
        let s = statement();
        let diff = ClaimDiffer::new().diff_claims(&s, &s);
        assert!(diff.is_empty());
        assert_eq!(diff, ClaimDifference::default());
    }

    #[test]
    fn test_main_snak_change() {
        let old = Claim::new(snak(1, "a"));
        let new = Claim::new(snak(1, "b"));
        let diff = ClaimDiffer::new().diff_claims(&old, &new);
        assert_eq!(
            diff.main_snak_change,
            Some(DiffOp::Change {
                old: snak(1, "a"),
                new: snak(1, "b")
            })
        );
        assert!(diff.rank_change.is_none());
    }

    #[test]
    fn test_qualifier_order_ignored() {
        let mut old = Claim::new(snak(1, "a"));
        old.qualifiers.add(snak(2, "x"));
        old.qualifiers.add(snak(2, "y"));
        let mut new = Claim::new(snak(1, "a"));
        new.qualifiers.add(snak(2, "y"));
        new.qualifiers.add(snak(2, "x"));
        assert!(ClaimDiffer::new().diff_claims(&old, &new).is_empty());

        new.qualifiers.add(snak(2, "z"));
        let diff = ClaimDiffer::new().diff_claims(&old, &new);
        assert_eq!(diff.qualifier_changes.map(|d| d.added), Some(vec![snak(2, "z")]));
    }

    #[test]
    fn test_rank_and_references() {
        let old = statement();
        let mut new = statement();
        new.rank = Rank::Preferred;
        new.references.add([snak(3, "other")].into_iter().collect(), None);

        let diff = ClaimDiffer::new().diff_claims(&old, &new);
        assert_eq!(
            diff.rank_change,
            Some(DiffOp::Change {
                old: Rank::Normal,
                new: Rank::Preferred
            })
        );
        assert_eq!(diff.reference_changes.map(|d| d.added.len()), Some(1));
        assert!(diff.main_snak_change.is_none());
    }

    #[test]
    fn test_bare_claim_has_no_rank_change() {
        let mut new = statement();
        new.rank = Rank::Deprecated;
        let old = new.claim.clone();
        let diff = ClaimDiffer::new().diff_claims(&old, &new);
        assert!(diff.rank_change.is_none());
        assert!(diff.reference_changes.is_some());
    }
}
