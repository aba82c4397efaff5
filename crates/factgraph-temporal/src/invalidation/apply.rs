use chrono::{DateTime, Utc};
use tracing::info;

use factgraph_core::models::{AtomicFact, FactId, InvalidationEdge, InvalidationReason};
use factgraph_core::traits::{IFactStore, UpdateOutcome};
use factgraph_core::FactGraphResult;

use super::{lifecycle_delta, InvalidationOutcome};

/// Invalidate `old` in the store and record the audit edge.
///
/// The store decides atomically whether this is the first invalidation; the
/// edge is written only when it is.
pub fn persist_invalidation(
    store: &dyn IFactStore,
    old: &AtomicFact,
    new_id: FactId,
    reason: InvalidationReason,
    now: DateTime<Utc>,
) -> FactGraphResult<InvalidationOutcome> {
    let delta = lifecycle_delta(old, new_id, reason, now);

    match store.update(old.id(), &delta)? {
        UpdateOutcome::Applied(fact) => {
            let edge = InvalidationEdge {
                from_fact_id: old.id(),
                to_fact_id: new_id,
                reason,
                recorded_at: now,
            };
            store.append_edge(&edge)?;
            info!(
                fact_id = %old.id(),
                new_fact_id = %new_id,
                reason = reason.as_str(),
                "fact invalidated"
            );
            Ok(InvalidationOutcome::Invalidated { fact, delta, edge })
        }
        UpdateOutcome::AlreadyInvalidated { current } => {
            info!(
                fact_id = %old.id(),
                new_fact_id = %new_id,
                invalidated_by = ?current.invalidated_by(),
                "double invalidation attempt ignored"
            );
            Ok(InvalidationOutcome::AlreadyInvalidated { fact: current })
        }
    }
}

/// Audit edge recorded for an invalidated fact, written now if the store
/// lacks it. `None` for an active fact.
pub fn ensure_edge(
    store: &dyn IFactStore,
    fact: &AtomicFact,
) -> FactGraphResult<Option<InvalidationEdge>> {
    let Some(inv) = fact.invalidation() else {
        return Ok(None);
    };
    if let Some(edge) = store
        .edges_from(fact.id())?
        .into_iter()
        .find(|e| e.to_fact_id == inv.by)
    {
        return Ok(Some(edge));
    }

    let edge = InvalidationEdge {
        from_fact_id: fact.id(),
        to_fact_id: inv.by,
        reason: inv.reason,
        recorded_at: inv.at,
    };
    store.append_edge(&edge)?;
    info!(
        fact_id = %fact.id(),
        new_fact_id = %inv.by,
        reason = inv.reason.as_str(),
        "missing invalidation edge restored"
    );
    Ok(Some(edge))
}
