//! Property tests for claim diffing, alias edits and snak hashing.

use std::sync::Arc;

use entity_changeops::changeop::{ChangeOp, ChangeOpFactory};
use entity_changeops::model::builder::ItemBuilder;
use entity_changeops::model::SnakList;
use entity_changeops::validate::PropertyDataTypes;
use entity_changeops::{
    ClaimDiffer, DataValue, ItemId, PropertyId, Rank, Settings, Snak, Statement,
};
use proptest::prelude::*;

fn snak_strategy() -> impl Strategy<Value = Snak> {
    let property = (1u64..50).prop_map(PropertyId::new);
    prop_oneof![
        property.clone().prop_map(|property| Snak::NoValue { property }),
        property.clone().prop_map(|property| Snak::SomeValue { property }),
        (property, "[a-z]{1,12}").prop_map(|(p, s)| Snak::value(p, DataValue::String(s))),
    ]
}

fn rank_strategy() -> impl Strategy<Value = Rank> {
    prop_oneof![Just(Rank::Deprecated), Just(Rank::Normal), Just(Rank::Preferred)]
}

fn statement_strategy() -> impl Strategy<Value = Statement> {
    (
        snak_strategy(),
        prop::collection::vec(snak_strategy(), 0..5),
        prop::collection::vec(prop::collection::vec(snak_strategy(), 1..3), 0..3),
        rank_strategy(),
    )
        .prop_map(|(main, qualifiers, references, rank)| {
            let mut statement = Statement::new(main);
            for q in qualifiers {
                statement.claim.qualifiers.add(q);
            }
            for r in references {
                statement.references.add(r.into_iter().collect(), None);
            }
            statement.rank = rank;
            statement
        })
}

fn factory() -> ChangeOpFactory {
    ChangeOpFactory::new(Settings::default(), Arc::new(PropertyDataTypes::new()))
}

proptest! {
    #[test]
    fn test_diff_of_claim_with_itself_is_empty(statement in statement_strategy()) {
        let differ = ClaimDiffer::new();
        prop_assert!(differ.diff_claims(&statement, &statement).is_empty());
        prop_assert!(differ.diff_claims(&statement.claim, &statement.claim).is_empty());
    }

    #[test]
    fn test_adding_present_aliases_is_idempotent(
        existing in prop::collection::btree_set("[a-z]{1,8}", 1..8),
        pick in prop::collection::vec(any::<prop::sample::Index>(), 1..5),
    ) {
        let existing: Vec<String> = existing.into_iter().collect();
        let subset: Vec<&str> = pick.iter().map(|i| existing[i.index(existing.len())].as_str()).collect();

        let mut item = ItemBuilder::new()
            .id(ItemId::new(1))
            .aliases("en", existing.iter().map(String::as_str))
            .build();
        let before = item.fingerprint().aliases.get("en").to_vec();

        let mut op = factory().new_add_aliases_op("en", &subset).unwrap();
        op.apply(&mut item, None).unwrap();

        prop_assert!(item.fingerprint().aliases.same_aliases("en", &before));
    }

    #[test]
    fn test_snak_list_hash_ignores_order(snaks in prop::collection::vec(snak_strategy(), 0..8)) {
        let forward: SnakList = snaks.iter().cloned().collect();
        let backward: SnakList = snaks.iter().rev().cloned().collect();
        prop_assert_eq!(forward.hash(), backward.hash());
        prop_assert_eq!(forward, backward);
    }
}
