//! Property tests for conflict resolution and invalidation.

#[path = "../common/mod.rs"]
mod common;

use proptest::prelude::*;

use factgraph_core::models::{FactId, FactKind, InvalidationReason, TemporalKind};
use factgraph_temporal::conflict::ConflictOutcome;
use factgraph_temporal::{find_conflicts, invalidate, InvalidationOutcome};

use common::*;

fn fact_kind() -> impl Strategy<Value = FactKind> {
    prop_oneof![
        Just(FactKind::Fact),
        Just(FactKind::Opinion),
        Just(FactKind::Prediction)
    ]
}

fn temporal_kind() -> impl Strategy<Value = TemporalKind> {
    prop_oneof![
        Just(TemporalKind::Static),
        Just(TemporalKind::Dynamic),
        Just(TemporalKind::Atemporal)
    ]
}

proptest! {
    #[test]
    fn same_chunk_never_invalidates(
        fk in fact_kind(), tk in temporal_kind(),
        old_conf in 0.0f64..=1.0, new_conf in 0.0f64..=1.0,
        minutes in -600i64..600
    ) {
        let old = fact("Acme", "CEO", "Bob", 1, FactKind::Fact, TemporalKind::Static, old_conf, at_minutes(0));
        let new = fact("Acme", "CEO", "Eve", 1, fk, tk, new_conf, at_minutes(minutes));
        let r = find_conflicts(&new, &[old]);
        prop_assert!(r.to_invalidate.is_empty());
        prop_assert_eq!(r.conflicts_found(), 0);
    }

    #[test]
    fn volatile_or_subjective_facts_never_invalidate(
        new_fk in fact_kind(), new_tk in temporal_kind(),
        old_fk in fact_kind(), old_tk in temporal_kind(),
        old_conf in 0.0f64..=1.0, new_conf in 0.0f64..=1.0
    ) {
        let coexist = |fk: FactKind, tk: TemporalKind| {
            fk == FactKind::Opinion || tk != TemporalKind::Static
        };
        prop_assume!(coexist(new_fk, new_tk) || coexist(old_fk, old_tk));

        let old = fact("Acme", "CEO", "Bob", 1, old_fk, old_tk, old_conf, at_minutes(0));
        let new = fact("Acme", "CEO", "Eve", 2, new_fk, new_tk, new_conf, at_minutes(5));
        let r = find_conflicts(&new, &[old]);
        prop_assert!(r.to_invalidate.is_empty());
        prop_assert!(r.outranked_by.is_none());
    }

    #[test]
    fn weaker_new_fact_never_invalidates(
        old_conf in 0.01f64..=1.0, gap in 0.0001f64..1.0, minutes in -600i64..600
    ) {
        let new_conf = (old_conf - gap).max(0.0);
        prop_assume!(new_conf < old_conf);

        let old = fact("Acme", "CEO", "Bob", 1, FactKind::Fact, TemporalKind::Static, old_conf, at_minutes(0));
        let new = fact("Acme", "CEO", "Eve", 2, FactKind::Fact, TemporalKind::Static, new_conf, at_minutes(minutes));
        let r = find_conflicts(&new, &[old.clone()]);
        prop_assert!(r.to_invalidate.is_empty());
        prop_assert_eq!(r.outranked_by, Some(old.id()));
    }

    #[test]
    fn competing_static_facts_have_exactly_one_winner(
        a_conf in 0.0f64..=1.0, b_conf in 0.0f64..=1.0,
        a_min in -5i64..5, b_min in -5i64..5
    ) {
        let a = fact("Acme", "CEO", "Bob", 1, FactKind::Fact, TemporalKind::Static, a_conf, at_minutes(a_min));
        let b = fact("Acme", "CEO", "Eve", 2, FactKind::Fact, TemporalKind::Static, b_conf, at_minutes(b_min));
        let a_wins = matches!(find_conflicts(&a, &[b.clone()]).decisions[0].outcome, ConflictOutcome::Invalidates(_));
        let b_wins = matches!(find_conflicts(&b, &[a.clone()]).decisions[0].outcome, ConflictOutcome::Invalidates(_));
        prop_assert!(a_wins != b_wins);
    }

    #[test]
    fn second_invalidation_changes_nothing(first in -600i64..600, second in -600i64..600) {
        let old = fact("Acme", "CEO", "Bob", 1, FactKind::Fact, TemporalKind::Static, 0.5, at_minutes(0));
        let winner = FactId::new();
        let done = invalidate(&old, winner, InvalidationReason::ConfidenceOverride, at_minutes(first)).unwrap();
        let once = done.fact().clone();

        let again = invalidate(&once, FactId::new(), InvalidationReason::Superseded, at_minutes(second)).unwrap();
        let already_invalidated = matches!(again, InvalidationOutcome::AlreadyInvalidated { .. });
        prop_assert!(already_invalidated);
        prop_assert_eq!(again.fact(), &once);
        prop_assert_eq!(once.invalidated_by(), Some(winner));
        prop_assert!(once.valid_until().unwrap() >= once.core().valid_from());
    }
}
