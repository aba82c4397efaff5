//! Behaviour every `IFactStore` must share, run against both backends.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use factgraph_core::errors::{StoreError, ValidationError};
use factgraph_core::models::{
    AtomicFact, FactId, FactKey, FactKind, InvalidationEdge, InvalidationReason, LifecycleDelta,
    NewFact, TemporalKind,
};
use factgraph_core::traits::{FactScope, IFactStore, UpdateOutcome};
use factgraph_core::FactGraphError;
use factgraph_storage::{InMemoryFactStore, SqliteFactStore};

fn fact_at(subject: &str, predicate: &str, object: &str, extracted_at: DateTime<Utc>) -> AtomicFact {
    AtomicFact::create(NewFact {
        id: FactId::new(),
        subject: subject.into(),
        predicate: predicate.into(),
        object: object.into(),
        source_chunk_id: Uuid::new_v4(),
        source_text: format!("{subject} {predicate} {object}"),
        fact_kind: FactKind::Fact,
        temporal_kind: TemporalKind::Static,
        valid_from: extracted_at,
        valid_until: None,
        is_open_interval: true,
        confidence: 0.8,
        extracted_at,
    })
    .unwrap()
}

fn delta(by: FactId, at: DateTime<Utc>) -> LifecycleDelta {
    LifecycleDelta {
        invalidated_by: by,
        invalidated_at: at,
        expired_at: at,
        valid_until: Some(at),
        reason: InvalidationReason::ConfidenceOverride,
    }
}

fn stores() -> Vec<(&'static str, Box<dyn IFactStore>)> {
    vec![
        ("memory", Box::new(InMemoryFactStore::new())),
        ("sqlite", Box::new(SqliteFactStore::open_in_memory().unwrap())),
    ]
}

#[test]
fn append_then_get_returns_equal_fact() {
    for (name, store) in stores() {
        let fact = fact_at("TechCorp", "CEO", "John", Utc::now());
        store.append(&fact).unwrap();
        assert_eq!(store.get(fact.id()).unwrap().as_ref(), Some(&fact), "{name}");
        assert_eq!(store.fact_count().unwrap(), 1, "{name}");
    }
}

#[test]
fn duplicate_id_is_a_validation_error() {
    for (name, store) in stores() {
        let fact = fact_at("TechCorp", "CEO", "John", Utc::now());
        store.append(&fact).unwrap();
        let err = store.append(&fact).unwrap_err();
        assert!(
            matches!(
                err,
                FactGraphError::Validation(ValidationError::DuplicateFactId { .. })
            ),
            "{name}: {err}"
        );
        assert_eq!(store.fact_count().unwrap(), 1, "{name}");
    }
}

#[test]
fn lookup_is_by_normalized_key_and_ordered() {
    for (name, store) in stores() {
        let t0 = Utc::now();
        let later = fact_at("techcorp's", "ceo", "Jane", t0 + Duration::seconds(5));
        let earlier = fact_at("TechCorp", "CEO", "John", t0);
        let other = fact_at("TechCorp", "CFO", "Ann", t0);
        for f in [&later, &earlier, &other] {
            store.append(f).unwrap();
        }

        let found = store
            .find_by_subject_predicate(&FactKey::from_raw("TECHCORP", "Ceo"), FactScope::Active)
            .unwrap();
        let ids: Vec<_> = found.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec![earlier.id(), later.id()], "{name}");
    }
}

#[test]
fn update_invalidates_once_and_scopes_split() {
    for (name, store) in stores() {
        let t0 = Utc::now();
        let old = fact_at("TechCorp", "CEO", "John", t0);
        let new = fact_at("TechCorp", "CEO", "Jane", t0 + Duration::seconds(1));
        store.append(&old).unwrap();
        store.append(&new).unwrap();

        let at = t0 + Duration::seconds(2);
        let UpdateOutcome::Applied(updated) = store.update(old.id(), &delta(new.id(), at)).unwrap()
        else {
            panic!("{name}: expected Applied");
        };
        assert_eq!(updated.invalidated_by(), Some(new.id()), "{name}");
        assert_eq!(updated.expired_at(), Some(at), "{name}");
        assert_eq!(updated.core(), old.core(), "{name}: core must not change");

        // Second attempt must not overwrite the first.
        let third = FactId::new();
        match store.update(old.id(), &delta(third, at + Duration::seconds(1))).unwrap() {
            UpdateOutcome::AlreadyInvalidated { current } => {
                assert_eq!(current.invalidated_by(), Some(new.id()), "{name}")
            }
            UpdateOutcome::Applied(_) => panic!("{name}: double invalidation applied"),
        }
        assert_eq!(store.get(old.id()).unwrap(), Some(updated), "{name}");

        let key = old.key().clone();
        let active = store.find_by_subject_predicate(&key, FactScope::Active).unwrap();
        let history = store.find_by_subject_predicate(&key, FactScope::History).unwrap();
        assert_eq!(active.len(), 1, "{name}");
        assert_eq!(active[0].id(), new.id(), "{name}");
        assert_eq!(history.len(), 2, "{name}");
    }
}

#[test]
fn update_of_missing_fact_is_not_found() {
    for (name, store) in stores() {
        let err = store
            .update(FactId::new(), &delta(FactId::new(), Utc::now()))
            .unwrap_err();
        assert!(
            matches!(err, FactGraphError::Store(StoreError::FactNotFound { .. })),
            "{name}: {err}"
        );
    }
}

#[test]
fn self_invalidation_is_rejected() {
    for (name, store) in stores() {
        let fact = fact_at("a", "is", "b", Utc::now());
        store.append(&fact).unwrap();
        let err = store.update(fact.id(), &delta(fact.id(), Utc::now())).unwrap_err();
        assert!(
            matches!(
                err,
                FactGraphError::Validation(ValidationError::SelfInvalidation { .. })
            ),
            "{name}: {err}"
        );
        assert!(store.get(fact.id()).unwrap().unwrap().is_active(), "{name}");
    }
}

#[test]
fn edges_are_indexed_both_ways() {
    for (name, store) in stores() {
        let t0 = Utc::now();
        let old = fact_at("TechCorp", "CEO", "John", t0);
        let new = fact_at("TechCorp", "CEO", "Jane", t0);
        store.append(&old).unwrap();
        store.append(&new).unwrap();

        let edge = InvalidationEdge {
            from_fact_id: old.id(),
            to_fact_id: new.id(),
            reason: InvalidationReason::RecencyTiebreak,
            recorded_at: t0,
        };
        store.append_edge(&edge).unwrap();

        assert_eq!(store.edges_from(old.id()).unwrap(), vec![edge.clone()], "{name}");
        assert_eq!(store.edges_to(new.id()).unwrap(), vec![edge], "{name}");
        assert!(store.edges_from(new.id()).unwrap().is_empty(), "{name}");
    }
}

#[test]
fn unavailable_memory_store_fails_retryably() {
    let store = InMemoryFactStore::new();
    store.set_available(false);
    let err = store.append(&fact_at("a", "is", "b", Utc::now())).unwrap_err();
    assert!(err.is_retryable());
    store.set_available(true);
    assert_eq!(store.fact_count().unwrap(), 0);
}
