//! Shared builders for factgraph-temporal integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use factgraph_core::config::{EngineConfig, LosingFactPolicy, ObservabilityConfig};
use factgraph_core::models::{
    Attributes, AtomicFact, CandidateFact, Classification, FactId, FactKey, FactKind,
    InvalidationEdge, LifecycleDelta, NewFact, TemporalKind,
};
use factgraph_core::observability::init_tracing;
use factgraph_core::traits::{FactScope, IFactStore, IGraphSink, UpdateOutcome};
use factgraph_core::{FactGraphError, FactGraphResult, KeyLocks};
use factgraph_storage::{InMemoryFactStore, SqliteFactStore};
use factgraph_temporal::{FactEngine, InMemoryGraph};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
}

pub fn at_minutes(minutes: i64) -> DateTime<Utc> {
    t0() + Duration::minutes(minutes)
}

pub fn chunk(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn candidate(subject: &str, predicate: &str, object: &str, chunk_no: u128) -> CandidateFact {
    CandidateFact::new(subject, predicate, object, chunk(chunk_no))
        .with_source_text(format!("{subject} {predicate} {object}"))
}

pub fn classified(
    fact_kind: FactKind,
    temporal_kind: TemporalKind,
    confidence: f64,
) -> Classification {
    Classification {
        fact_kind,
        temporal_kind,
        confidence,
        valid_from: t0(),
        valid_until: None,
        is_open_interval: true,
    }
}

pub fn static_fact(confidence: f64) -> Classification {
    classified(FactKind::Fact, TemporalKind::Static, confidence)
}

/// A stored-fact value for pure resolver tests.
pub fn fact(
    subject: &str,
    predicate: &str,
    object: &str,
    chunk_no: u128,
    fact_kind: FactKind,
    temporal_kind: TemporalKind,
    confidence: f64,
    extracted_at: DateTime<Utc>,
) -> AtomicFact {
    AtomicFact::create(NewFact {
        id: FactId::new(),
        subject: subject.into(),
        predicate: predicate.into(),
        object: object.into(),
        source_chunk_id: chunk(chunk_no),
        source_text: String::new(),
        fact_kind,
        temporal_kind,
        valid_from: t0(),
        valid_until: None,
        is_open_interval: true,
        confidence,
        extracted_at,
    })
    .unwrap()
}

pub struct Harness {
    pub name: &'static str,
    pub engine: FactEngine,
    pub store: Arc<dyn IFactStore>,
    pub graph: Arc<InMemoryGraph>,
}

pub fn harness_with(name: &'static str, store: Arc<dyn IFactStore>, config: EngineConfig) -> Harness {
    init_tracing(&ObservabilityConfig {
        log_level: "warn".into(),
        json: false,
    });
    let graph = Arc::new(InMemoryGraph::new());
    Harness {
        name,
        engine: FactEngine::new(store.clone(), graph.clone(), config).unwrap(),
        store,
        graph,
    }
}

/// One harness per store backend.
pub fn harnesses(policy: LosingFactPolicy) -> Vec<Harness> {
    let config = EngineConfig {
        losing_fact_policy: policy,
        ..EngineConfig::default()
    };
    vec![
        harness_with("memory", Arc::new(InMemoryFactStore::new()), config.clone()),
        harness_with(
            "sqlite",
            Arc::new(SqliteFactStore::open_in_memory().unwrap()),
            config,
        ),
    ]
}

fn trip(flag: &AtomicBool, what: &str) -> FactGraphResult<()> {
    if flag.swap(false, Ordering::SeqCst) {
        Err(FactGraphError::unavailable(format!("{what} interrupted")))
    } else {
        Ok(())
    }
}

/// Store that fails the next `update` or `append_edge` once, before the
/// wrapped store sees it.
pub struct FlakyStore {
    inner: Arc<dyn IFactStore>,
    fail_update: AtomicBool,
    fail_edge: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn IFactStore>) -> Self {
        Self {
            inner,
            fail_update: AtomicBool::new(false),
            fail_edge: AtomicBool::new(false),
        }
    }

    pub fn fail_next_update(&self) {
        self.fail_update.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_edge(&self) {
        self.fail_edge.store(true, Ordering::SeqCst);
    }
}

impl IFactStore for FlakyStore {
    fn key_locks(&self) -> &KeyLocks {
        self.inner.key_locks()
    }

    fn append(&self, fact: &AtomicFact) -> FactGraphResult<()> {
        self.inner.append(fact)
    }

    fn get(&self, id: FactId) -> FactGraphResult<Option<AtomicFact>> {
        self.inner.get(id)
    }

    fn find_by_subject_predicate(
        &self,
        key: &FactKey,
        scope: FactScope,
    ) -> FactGraphResult<Vec<AtomicFact>> {
        self.inner.find_by_subject_predicate(key, scope)
    }

    fn update(&self, id: FactId, delta: &LifecycleDelta) -> FactGraphResult<UpdateOutcome> {
        trip(&self.fail_update, "update")?;
        self.inner.update(id, delta)
    }

    fn append_edge(&self, edge: &InvalidationEdge) -> FactGraphResult<()> {
        trip(&self.fail_edge, "append_edge")?;
        self.inner.append_edge(edge)
    }

    fn edges_from(&self, id: FactId) -> FactGraphResult<Vec<InvalidationEdge>> {
        self.inner.edges_from(id)
    }

    fn edges_to(&self, id: FactId) -> FactGraphResult<Vec<InvalidationEdge>> {
        self.inner.edges_to(id)
    }

    fn fact_count(&self) -> FactGraphResult<usize> {
        self.inner.fact_count()
    }
}

/// One harness per backend, each behind a `FlakyStore`.
pub fn flaky_harnesses(policy: LosingFactPolicy) -> Vec<(Harness, Arc<FlakyStore>)> {
    let config = EngineConfig {
        losing_fact_policy: policy,
        ..EngineConfig::default()
    };
    let backends: Vec<(&'static str, Arc<dyn IFactStore>)> = vec![
        ("memory", Arc::new(InMemoryFactStore::new())),
        ("sqlite", Arc::new(SqliteFactStore::open_in_memory().unwrap())),
    ];
    backends
        .into_iter()
        .map(|(name, inner)| {
            let flaky = Arc::new(FlakyStore::new(inner));
            (harness_with(name, flaky.clone(), config.clone()), flaky)
        })
        .collect()
}

/// Graph sink that fails the next edge with a given label once.
pub struct FlakySink {
    pub graph: InMemoryGraph,
    fail_label: std::sync::Mutex<Option<String>>,
}

impl FlakySink {
    pub fn new() -> Self {
        Self {
            graph: InMemoryGraph::new(),
            fail_label: std::sync::Mutex::new(None),
        }
    }

    pub fn fail_next_edge_labelled(&self, label: &str) {
        *self.fail_label.lock().unwrap() = Some(label.to_string());
    }
}

impl IGraphSink for FlakySink {
    fn upsert_node(&self, id: &str, attrs: &Attributes) -> FactGraphResult<()> {
        self.graph.upsert_node(id, attrs)
    }

    fn upsert_edge(&self, from: &str, to: &str, label: &str, attrs: &Attributes) -> FactGraphResult<()> {
        let mut pending = self.fail_label.lock().unwrap();
        if pending.as_deref() == Some(label) {
            *pending = None;
            return Err(FactGraphError::GraphSinkError(format!("{label} edge rejected")));
        }
        drop(pending);
        self.graph.upsert_edge(from, to, label, attrs)
    }
}
