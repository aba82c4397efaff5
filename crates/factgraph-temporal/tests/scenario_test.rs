//! End-to-end ingestion scenarios, run against both store backends.

mod common;

use factgraph_core::config::LosingFactPolicy;
use factgraph_core::normalize;
use factgraph_core::models::{FactKind, InvalidationReason, TemporalKind, INVALIDATED_BY_LABEL};
use factgraph_temporal::IngestOutcome;

use common::*;

#[test]
fn higher_confidence_replacement_invalidates_the_old_ceo() {
    for h in harnesses(LosingFactPolicy::RetainAsHistory) {
        let john = h
            .engine
            .ingest_at(&candidate("TechCorp", "CEO", "John", 1), Some(static_fact(0.9)), at_minutes(0))
            .unwrap();
        let jane = h
            .engine
            .ingest_at(&candidate("TechCorp", "CEO", "Jane", 2), Some(static_fact(0.95)), at_minutes(5))
            .unwrap();

        let (john_id, jane_id) = (john.fact_id().unwrap(), jane.fact_id().unwrap());
        assert_eq!(jane.invalidated(), &[john_id], "{}", h.name);

        let john_now = h.store.get(john_id).unwrap().unwrap();
        assert_eq!(john_now.invalidated_by(), Some(jane_id), "{}", h.name);
        assert!(john_now.invalidated_at().is_some() && john_now.expired_at().is_some());

        let active = h.engine.active_facts("TechCorp", "CEO").unwrap();
        assert_eq!(active.len(), 1, "{}", h.name);
        assert_eq!(active[0].id(), jane_id);
        assert!(active[0].core().is_open_interval());

        let edges = h.store.edges_from(john_id).unwrap();
        assert_eq!(edges.len(), 1, "{}", h.name);
        assert_eq!(edges[0].to_fact_id, jane_id);
        assert_eq!(edges[0].reason, InvalidationReason::ConfidenceOverride);

        let link = h
            .graph
            .edge(&john_id.to_string(), &jane_id.to_string(), INVALIDATED_BY_LABEL)
            .unwrap()
            .expect("invalidation edge in graph");
        assert_eq!(link["reason"], "confidence_override");
        let john_node = h.graph.node(&john_id.to_string()).unwrap().unwrap();
        assert_eq!(john_node["invalidated_by"], jane_id.to_string());

        let techcorp = normalize("TechCorp").id.to_string();
        let john_edge = h
            .graph
            .edge(&techcorp, &normalize("John").id.to_string(), "ceo")
            .unwrap()
            .expect("john predicate edge");
        assert_eq!(john_edge["fact_id"], john_id.to_string());
        assert!(john_edge["valid_until"].is_string(), "{}: {john_edge:?}", h.name);
        let jane_edge = h
            .graph
            .edge(&techcorp, &normalize("Jane").id.to_string(), "ceo")
            .unwrap()
            .expect("jane predicate edge");
        assert!(jane_edge["valid_until"].is_null());
    }
}

#[test]
fn dynamic_prices_coexist() {
    for h in harnesses(LosingFactPolicy::RetainAsHistory) {
        let dynamic = classified(FactKind::Fact, TemporalKind::Dynamic, 0.9);
        h.engine
            .ingest_at(&candidate("TSLA", "price", "$250", 1), Some(dynamic.clone()), at_minutes(0))
            .unwrap();
        let second = h
            .engine
            .ingest_at(&candidate("TSLA", "price", "$255", 2), Some(dynamic), at_minutes(30))
            .unwrap();

        assert!(second.invalidated().is_empty(), "{}", h.name);
        assert_eq!(h.engine.active_facts("TSLA", "price").unwrap().len(), 2, "{}", h.name);
        assert_eq!(
            h.graph.count_edges_labelled(INVALIDATED_BY_LABEL).unwrap(),
            0,
            "{}",
            h.name
        );
    }
}

#[test]
fn resubmission_from_the_same_chunk_is_a_duplicate() {
    for h in harnesses(LosingFactPolicy::RetainAsHistory) {
        let c = candidate("TechCorp", "CEO", "John", 1);
        let first = h.engine.ingest_at(&c, Some(static_fact(0.9)), at_minutes(0)).unwrap();
        let again = h.engine.ingest_at(&c, Some(static_fact(0.9)), at_minutes(1)).unwrap();

        assert_eq!(
            again,
            IngestOutcome::Duplicate {
                existing: first.fact_id().unwrap(),
                invalidated: Vec::new(),
            },
            "{}",
            h.name
        );
        assert_eq!(h.store.fact_count().unwrap(), 1, "{}", h.name);
        assert_eq!(h.engine.active_facts("TechCorp", "CEO").unwrap().len(), 1);
        assert!(h.store.edges_from(first.fact_id().unwrap()).unwrap().is_empty());
    }
}

#[test]
fn weaker_fact_is_kept_as_history_by_default() {
    for h in harnesses(LosingFactPolicy::RetainAsHistory) {
        let strong = h
            .engine
            .ingest_at(&candidate("TechCorp", "CEO", "John", 1), Some(static_fact(0.9)), at_minutes(0))
            .unwrap();
        let weak = h
            .engine
            .ingest_at(&candidate("TechCorp", "CEO", "Jane", 2), Some(static_fact(0.6)), at_minutes(5))
            .unwrap();

        let strong_id = strong.fact_id().unwrap();
        let IngestOutcome::Ingested { fact, invalidated, outranked_by, .. } = &weak else {
            panic!("{}: expected Ingested, got {weak:?}", h.name);
        };
        assert!(invalidated.is_empty());
        assert_eq!(*outranked_by, Some(strong_id));
        assert_eq!(fact.invalidated_by(), Some(strong_id));
        assert_eq!(
            fact.invalidation().map(|i| i.reason),
            Some(InvalidationReason::ConfidenceFloor)
        );

        assert!(h.store.get(strong_id).unwrap().unwrap().is_active(), "{}", h.name);
        let active = h.engine.active_facts("TechCorp", "CEO").unwrap();
        assert_eq!(active.iter().map(|f| f.id()).collect::<Vec<_>>(), vec![strong_id]);
        assert_eq!(h.engine.history("TechCorp", "CEO").unwrap().len(), 2, "{}", h.name);
    }
}

#[test]
fn weaker_fact_is_dropped_under_discard() {
    for h in harnesses(LosingFactPolicy::Discard) {
        let strong = h
            .engine
            .ingest_at(&candidate("TechCorp", "CEO", "John", 1), Some(static_fact(0.9)), at_minutes(0))
            .unwrap();
        let weak = h
            .engine
            .ingest_at(&candidate("TechCorp", "CEO", "Jane", 2), Some(static_fact(0.6)), at_minutes(5))
            .unwrap();

        assert_eq!(
            weak,
            IngestOutcome::Rejected {
                outranked_by: strong.fact_id().unwrap()
            },
            "{}",
            h.name
        );
        assert_eq!(h.store.fact_count().unwrap(), 1, "{}", h.name);
        assert!(h.store.get(strong.fact_id().unwrap()).unwrap().unwrap().is_active());
    }
}
