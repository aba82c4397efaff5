use crate::errors::FactGraphResult;
use crate::locks::KeyLocks;
use crate::models::{AtomicFact, FactId, FactKey, InvalidationEdge, LifecycleDelta};

/// Which versions a key lookup returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FactScope {
    /// Facts never invalidated.
    #[default]
    Active,
    /// Every fact ever stored under the key.
    History,
}

/// Result of a lifecycle update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The stored fact after the update.
    Applied(AtomicFact),
    /// The fact was already invalidated; nothing was written.
    AlreadyInvalidated { current: AtomicFact },
}

/// Persistent fact storage.
///
/// Facts are append-only: `update` may only fill in lifecycle fields of an
/// active fact, and no operation deletes a fact or an invalidation edge.
pub trait IFactStore: Send + Sync {
    /// Locks used to serialize conflict resolution per key.
    fn key_locks(&self) -> &KeyLocks;

    /// Insert a new fact. A duplicate id is a validation error.
    fn append(&self, fact: &AtomicFact) -> FactGraphResult<()>;

    fn get(&self, id: FactId) -> FactGraphResult<Option<AtomicFact>>;

    /// Facts under `key`, ordered by `extracted_at` then id.
    fn find_by_subject_predicate(
        &self,
        key: &FactKey,
        scope: FactScope,
    ) -> FactGraphResult<Vec<AtomicFact>>;

    /// Apply a lifecycle delta. First invalidation wins.
    fn update(&self, id: FactId, delta: &LifecycleDelta) -> FactGraphResult<UpdateOutcome>;

    fn append_edge(&self, edge: &InvalidationEdge) -> FactGraphResult<()>;

    /// Edges whose `from_fact_id` is `id` (what invalidated it).
    fn edges_from(&self, id: FactId) -> FactGraphResult<Vec<InvalidationEdge>>;

    /// Edges whose `to_fact_id` is `id` (what it invalidated).
    fn edges_to(&self, id: FactId) -> FactGraphResult<Vec<InvalidationEdge>>;

    fn fact_count(&self) -> FactGraphResult<usize>;
}
