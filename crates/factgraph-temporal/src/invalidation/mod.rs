//! Invalidation manager: lifecycle transitions for superseded facts.
//!
//! [`invalidate`] is the pure transition; [`apply::persist_invalidation`]
//! writes it through an `IFactStore` and records the audit edge.

pub mod apply;

use chrono::{DateTime, Utc};
use tracing::info;

use factgraph_core::errors::ValidationError;
use factgraph_core::models::{
    AtomicFact, FactId, InvalidationEdge, InvalidationReason, LifecycleDelta, Transition,
};

pub use apply::{ensure_edge, persist_invalidation};

#[derive(Debug, Clone, PartialEq)]
pub enum InvalidationOutcome {
    Invalidated {
        fact: AtomicFact,
        delta: LifecycleDelta,
        edge: InvalidationEdge,
    },
    /// First invalidation already happened; `fact` is unchanged.
    AlreadyInvalidated { fact: AtomicFact },
}

impl InvalidationOutcome {
    pub fn fact(&self) -> &AtomicFact {
        match self {
            InvalidationOutcome::Invalidated { fact, .. } => fact,
            InvalidationOutcome::AlreadyInvalidated { fact } => fact,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, InvalidationOutcome::Invalidated { .. })
    }
}

/// Lifecycle fields written when `new_id` supersedes `old` at `now`.
///
/// `valid_until` never precedes `valid_from`, so a fact whose validity starts
/// in the future closes at its own start.
pub fn lifecycle_delta(
    old: &AtomicFact,
    new_id: FactId,
    reason: InvalidationReason,
    now: DateTime<Utc>,
) -> LifecycleDelta {
    LifecycleDelta {
        invalidated_by: new_id,
        invalidated_at: now,
        expired_at: now,
        valid_until: Some(now.max(old.core().valid_from())),
        reason,
    }
}

/// Pure transition. The input fact is never modified.
pub fn invalidate(
    old: &AtomicFact,
    new_id: FactId,
    reason: InvalidationReason,
    now: DateTime<Utc>,
) -> Result<InvalidationOutcome, ValidationError> {
    let delta = lifecycle_delta(old, new_id, reason, now);
    match old.apply(&delta)? {
        Transition::Applied(fact) => Ok(InvalidationOutcome::Invalidated {
            edge: InvalidationEdge {
                from_fact_id: old.id(),
                to_fact_id: new_id,
                reason,
                recorded_at: now,
            },
            fact,
            delta,
        }),
        Transition::AlreadyInvalidated(existing) => {
            info!(
                fact_id = %old.id(),
                new_fact_id = %new_id,
                invalidated_by = %existing.by,
                "double invalidation attempt ignored"
            );
            Ok(InvalidationOutcome::AlreadyInvalidated { fact: old.clone() })
        }
    }
}
