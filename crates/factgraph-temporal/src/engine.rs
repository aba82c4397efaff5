//! FactEngine: ingestion orchestrator.
//!
//! Per candidate: validate, normalize, build the fact, then under the key lock
//! load same-key facts, resolve conflicts, append and invalidate. Graph
//! assembly runs after the lock is released.
//!
//! The store commits each write separately. A re-submitted fact is therefore
//! re-settled rather than skipped, which completes a commit that failed part
//! way through.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use factgraph_core::config::{EngineConfig, LosingFactPolicy};
use factgraph_core::errors::StoreError;
use factgraph_core::models::{
    AtomicFact, CandidateFact, Classification, FactId, FactKey, InvalidationEdge,
    InvalidationReason, NewFact,
};
use factgraph_core::traits::{FactScope, IFactStore, IGraphSink};
use factgraph_core::{FactGraphError, FactGraphResult};

use crate::conflict::{self, ConflictResolution};
use crate::graph::{AssembledFact, GraphAssembler};
use crate::invalidation::{ensure_edge, persist_invalidation, InvalidationOutcome};
use crate::outcome::IngestOutcome;

/// What happened inside the key lock.
enum Committed {
    /// Already stored; resolution was re-run for the stored fact.
    Duplicate(Settled),
    Rejected { outranked_by: FactId },
    Stored(Settled),
}

/// A stored fact after its conflicts were resolved.
struct Settled {
    fact: AtomicFact,
    invalidated: Vec<FactId>,
    outranked_by: Option<FactId>,
    /// Invalidation edges touching `fact`, with the source fact's current
    /// version, for graph emission.
    links: Vec<(InvalidationEdge, AtomicFact)>,
}

pub struct FactEngine {
    store: Arc<dyn IFactStore>,
    assembler: GraphAssembler,
    config: EngineConfig,
}

impl FactEngine {
    pub fn new(
        store: Arc<dyn IFactStore>,
        sink: Arc<dyn IGraphSink>,
        config: EngineConfig,
    ) -> FactGraphResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            assembler: GraphAssembler::new(sink),
            config,
        })
    }

    pub fn store(&self) -> &Arc<dyn IFactStore> {
        &self.store
    }

    pub fn assembler(&self) -> &GraphAssembler {
        &self.assembler
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ingest one candidate extracted now.
    pub fn ingest(
        &self,
        candidate: &CandidateFact,
        classification: Option<Classification>,
    ) -> FactGraphResult<IngestOutcome> {
        self.ingest_at(candidate, classification, Utc::now())
    }

    /// Ingest one candidate with an explicit extraction time.
    ///
    /// A retryable error may leave the fact stored with its conflicts only
    /// partly applied. Ingesting the same candidate again finishes the work
    /// and reports a duplicate.
    pub fn ingest_at(
        &self,
        candidate: &CandidateFact,
        classification: Option<Classification>,
        extracted_at: DateTime<Utc>,
    ) -> FactGraphResult<IngestOutcome> {
        candidate.check_complete()?;

        let classification = classification.unwrap_or_else(|| {
            warn!(
                subject = %candidate.subject,
                predicate = %candidate.predicate,
                source_chunk_id = %candidate.source_chunk_id,
                "candidate has no classification, using defaults"
            );
            Classification::unclassified(extracted_at, self.config.default_confidence)
        });

        let fact = AtomicFact::create(NewFact {
            id: FactId::new(),
            subject: candidate.subject.clone(),
            predicate: candidate.predicate.clone(),
            object: candidate.object.clone(),
            source_chunk_id: candidate.source_chunk_id,
            source_text: candidate.source_text.clone(),
            fact_kind: classification.fact_kind,
            temporal_kind: classification.temporal_kind,
            valid_from: classification.valid_from,
            valid_until: classification.valid_until,
            is_open_interval: classification.is_open_interval,
            confidence: classification.confidence,
            extracted_at,
        })?;

        let key = fact.key().clone();
        let committed = self
            .store
            .key_locks()
            .with_key(&key, || self.resolve_and_commit(fact))?;

        match committed {
            Committed::Duplicate(settled) => {
                // Re-emitting is idempotent and heals graph writes that
                // failed on an earlier attempt.
                self.emit(&settled)?;
                Ok(IngestOutcome::Duplicate {
                    existing: settled.fact.id(),
                    invalidated: settled.invalidated,
                })
            }
            Committed::Rejected { outranked_by } => Ok(IngestOutcome::Rejected { outranked_by }),
            Committed::Stored(settled) => {
                let assembled = self.emit(&settled)?;
                Ok(IngestOutcome::Ingested {
                    fact: settled.fact,
                    invalidated: settled.invalidated,
                    outranked_by: settled.outranked_by,
                    assembled,
                })
            }
        }
    }

    /// Runs under the key lock.
    fn resolve_and_commit(&self, fact: AtomicFact) -> FactGraphResult<Committed> {
        let store = self.store.as_ref();
        let history = store.find_by_subject_predicate(fact.key(), FactScope::History)?;

        let core = fact.core();
        if let Some(existing) = history.iter().find(|f| {
            f.core().object_id() == core.object_id()
                && f.core().source_chunk_id() == core.source_chunk_id()
        }) {
            debug!(
                existing_fact_id = %existing.id(),
                key = %fact.key(),
                "same object from the same chunk already stored"
            );
            return self.settle(existing.clone(), &history).map(Committed::Duplicate);
        }

        let candidates: Vec<AtomicFact> = history.into_iter().filter(|f| f.is_active()).collect();
        let resolution = conflict::find_conflicts(&fact, &candidates);

        if let (Some(winner), LosingFactPolicy::Discard) =
            (resolution.outranked_by, self.config.losing_fact_policy)
        {
            info!(
                outranked_by = %winner,
                key = %fact.key(),
                confidence = fact.core().confidence().value(),
                "new fact outranked, discarded"
            );
            return Ok(Committed::Rejected {
                outranked_by: winner,
            });
        }

        store.append(&fact)?;
        let settled = self.apply_resolution(fact, &candidates, &resolution)?;

        info!(
            fact_id = %settled.fact.id(),
            subject_id = %settled.fact.key().subject_id,
            predicate = %settled.fact.key().predicate,
            conflicts_found = resolution.conflicts_found(),
            conflicts_resolved = settled.invalidated.len(),
            "fact ingested"
        );
        Ok(Committed::Stored(settled))
    }

    /// Write the invalidations `resolution` calls for. Candidates the fact
    /// beats go first; a fact outranked itself is then closed by the winner.
    fn apply_resolution(
        &self,
        fact: AtomicFact,
        candidates: &[AtomicFact],
        resolution: &ConflictResolution,
    ) -> FactGraphResult<Settled> {
        let store = self.store.as_ref();
        let now = Utc::now();
        let mut invalidated = Vec::new();
        let mut links = Vec::new();

        for (old_id, reason) in &resolution.to_invalidate {
            let Some(old) = candidates.iter().find(|c| c.id() == *old_id) else {
                continue;
            };
            if let InvalidationOutcome::Invalidated { fact: updated, edge, .. } =
                persist_invalidation(store, old, fact.id(), *reason, now)?
            {
                invalidated.push(*old_id);
                links.push((edge, updated));
            }
        }

        let mut fact = fact;
        if let Some(winner) = resolution.outranked_by {
            match persist_invalidation(store, &fact, winner, InvalidationReason::ConfidenceFloor, now)? {
                InvalidationOutcome::Invalidated { fact: updated, edge, .. } => {
                    info!(
                        fact_id = %updated.id(),
                        outranked_by = %winner,
                        "new fact outranked, retained as history"
                    );
                    links.push((edge, updated.clone()));
                    fact = updated;
                }
                InvalidationOutcome::AlreadyInvalidated { fact: current } => fact = current,
            }
        }

        Ok(Settled {
            fact,
            invalidated,
            outranked_by: resolution.outranked_by,
            links,
        })
    }

    /// Bring an already-stored fact to the state a completed commit leaves:
    /// pending invalidations applied and every audit edge present.
    fn settle(&self, existing: AtomicFact, history: &[AtomicFact]) -> FactGraphResult<Settled> {
        let store = self.store.as_ref();
        let mut settled = if existing.is_active() {
            let candidates: Vec<AtomicFact> = history
                .iter()
                .filter(|f| f.is_active() && f.id() != existing.id())
                .cloned()
                .collect();
            let resolution = conflict::find_conflicts(&existing, &candidates);
            self.apply_resolution(existing, &candidates, &resolution)?
        } else {
            Settled {
                fact: existing,
                invalidated: Vec::new(),
                outranked_by: None,
                links: Vec::new(),
            }
        };

        let id = settled.fact.id();
        for old in history.iter().filter(|f| f.invalidated_by() == Some(id)) {
            if let Some(edge) = ensure_edge(store, old)? {
                settled.links.push((edge, old.clone()));
            }
        }
        if !settled.links.iter().any(|(e, _)| e.from_fact_id == id) {
            if let Some(edge) = ensure_edge(store, &settled.fact)? {
                settled.links.push((edge, settled.fact.clone()));
            }
        }
        if !settled.invalidated.is_empty() {
            info!(
                fact_id = %id,
                conflicts_resolved = settled.invalidated.len(),
                "pending invalidations applied"
            );
        }
        Ok(settled)
    }

    /// Graph output for a settled fact. Superseded facts go out before the
    /// fact itself, so a subject/object/predicate edge shared by two versions
    /// ends up describing the newer one.
    fn emit(&self, settled: &Settled) -> FactGraphResult<AssembledFact> {
        let fact = &settled.fact;
        let (own, older): (Vec<_>, Vec<_>) = settled
            .links
            .iter()
            .partition(|(edge, _)| edge.from_fact_id == fact.id());

        for (edge, old) in older {
            self.assembler.link_invalidation(edge, old)?;
        }
        let assembled = self.assembler.assemble(fact)?;
        for (edge, _) in own {
            self.assembler.link_invalidation(edge, fact)?;
            if let Some(winner) = self.store.get(edge.to_fact_id)? {
                if winner.is_active() && winner.core().object_id() == fact.core().object_id() {
                    self.assembler.assemble(&winner)?;
                }
            }
        }
        Ok(assembled)
    }

    /// Currently valid facts for a raw (subject, predicate).
    pub fn active_facts(&self, subject: &str, predicate: &str) -> FactGraphResult<Vec<AtomicFact>> {
        self.store
            .find_by_subject_predicate(&FactKey::from_raw(subject, predicate), FactScope::Active)
    }

    /// Every version ever stored for a raw (subject, predicate).
    pub fn history(&self, subject: &str, predicate: &str) -> FactGraphResult<Vec<AtomicFact>> {
        self.store
            .find_by_subject_predicate(&FactKey::from_raw(subject, predicate), FactScope::History)
    }

    /// Follow `invalidated_by` links from `fact_id` to the current head.
    /// The first element is the requested fact, the last is the head.
    pub fn invalidation_chain(&self, fact_id: FactId) -> FactGraphResult<Vec<AtomicFact>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(fact_id);

        while let Some(id) = next {
            if !seen.insert(id) {
                warn!(fact_id = %id, "cycle in invalidation chain");
                break;
            }
            let fact = match self.store.get(id)? {
                Some(fact) => fact,
                None if chain.is_empty() => {
                    return Err(FactGraphError::Store(StoreError::FactNotFound {
                        fact_id: id.to_string(),
                    }))
                }
                None => {
                    warn!(fact_id = %id, "invalidation chain points at a missing fact");
                    break;
                }
            };
            next = fact.invalidated_by();
            chain.push(fact);
        }
        Ok(chain)
    }
}
