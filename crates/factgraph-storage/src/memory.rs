//! DashMap-backed fact store.
//!
//! Facts live in one map keyed by id with a secondary index by fact key.
//! Each mutation touches a single map entry, so it is atomic on its own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use factgraph_core::errors::{StoreError, ValidationError};
use factgraph_core::models::{
    AtomicFact, FactId, FactKey, InvalidationEdge, LifecycleDelta, Transition,
};
use factgraph_core::traits::{FactScope, IFactStore, UpdateOutcome};
use factgraph_core::{FactGraphError, FactGraphResult, KeyLocks};

#[derive(Debug)]
pub struct InMemoryFactStore {
    facts: DashMap<FactId, AtomicFact>,
    by_key: DashMap<FactKey, Vec<FactId>>,
    edges: RwLock<Vec<InvalidationEdge>>,
    locks: KeyLocks,
    available: AtomicBool,
}

impl Default for InMemoryFactStore {
    fn default() -> Self {
        Self {
            facts: DashMap::new(),
            by_key: DashMap::new(),
            edges: RwLock::new(Vec::new()),
            locks: KeyLocks::new(),
            available: AtomicBool::new(true),
        }
    }
}

impl InMemoryFactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: while unavailable every operation fails with
    /// `StoreError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> FactGraphResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(FactGraphError::unavailable("in-memory store marked unavailable"))
        }
    }

    fn poisoned(what: &str) -> FactGraphError {
        FactGraphError::ConcurrencyError(format!("{what} lock poisoned"))
    }
}

impl IFactStore for InMemoryFactStore {
    fn key_locks(&self) -> &KeyLocks {
        &self.locks
    }

    fn append(&self, fact: &AtomicFact) -> FactGraphResult<()> {
        self.check_available()?;
        fact.validate()?;

        match self.facts.entry(fact.id()) {
            Entry::Occupied(_) => {
                return Err(ValidationError::DuplicateFactId {
                    fact_id: fact.id().to_string(),
                }
                .into())
            }
            Entry::Vacant(slot) => {
                slot.insert(fact.clone());
            }
        }
        self.by_key
            .entry(fact.key().clone())
            .or_default()
            .push(fact.id());
        debug!(fact_id = %fact.id(), key = %fact.key(), "fact appended");
        Ok(())
    }

    fn get(&self, id: FactId) -> FactGraphResult<Option<AtomicFact>> {
        self.check_available()?;
        Ok(self.facts.get(&id).map(|f| f.value().clone()))
    }

    fn find_by_subject_predicate(
        &self,
        key: &FactKey,
        scope: FactScope,
    ) -> FactGraphResult<Vec<AtomicFact>> {
        self.check_available()?;
        let ids = match self.by_key.get(key) {
            Some(ids) => ids.value().clone(),
            None => return Ok(Vec::new()),
        };
        let mut facts: Vec<AtomicFact> = ids
            .iter()
            .filter_map(|id| self.facts.get(id).map(|f| f.value().clone()))
            .filter(|f| scope == FactScope::History || f.is_active())
            .collect();
        facts.sort_by(|a, b| {
            a.core()
                .extracted_at()
                .cmp(&b.core().extracted_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(facts)
    }

    fn update(&self, id: FactId, delta: &LifecycleDelta) -> FactGraphResult<UpdateOutcome> {
        self.check_available()?;
        let mut entry = self.facts.get_mut(&id).ok_or_else(|| {
            FactGraphError::Store(StoreError::FactNotFound {
                fact_id: id.to_string(),
            })
        })?;

        match entry.apply(delta)? {
            Transition::Applied(next) => {
                *entry = next.clone();
                Ok(UpdateOutcome::Applied(next))
            }
            Transition::AlreadyInvalidated(_) => Ok(UpdateOutcome::AlreadyInvalidated {
                current: entry.value().clone(),
            }),
        }
    }

    fn append_edge(&self, edge: &InvalidationEdge) -> FactGraphResult<()> {
        self.check_available()?;
        self.edges
            .write()
            .map_err(|_| Self::poisoned("edge"))?
            .push(edge.clone());
        Ok(())
    }

    fn edges_from(&self, id: FactId) -> FactGraphResult<Vec<InvalidationEdge>> {
        self.check_available()?;
        let edges = self.edges.read().map_err(|_| Self::poisoned("edge"))?;
        Ok(edges.iter().filter(|e| e.from_fact_id == id).cloned().collect())
    }

    fn edges_to(&self, id: FactId) -> FactGraphResult<Vec<InvalidationEdge>> {
        self.check_available()?;
        let edges = self.edges.read().map_err(|_| Self::poisoned("edge"))?;
        Ok(edges.iter().filter(|e| e.to_fact_id == id).cloned().collect())
    }

    fn fact_count(&self) -> FactGraphResult<usize> {
        self.check_available()?;
        Ok(self.facts.len())
    }
}
