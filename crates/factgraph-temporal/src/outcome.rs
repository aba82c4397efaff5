use factgraph_core::models::{AtomicFact, FactId};

use crate::graph::AssembledFact;

/// Result of ingesting one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// The fact was stored.
    Ingested {
        /// Stored version. Already invalidated when the fact lost to an
        /// existing one and was kept as history.
        fact: AtomicFact,
        /// Facts this one superseded.
        invalidated: Vec<FactId>,
        /// Existing fact that outranks this one, if any.
        outranked_by: Option<FactId>,
        assembled: AssembledFact,
    },
    /// Same object from the same chunk is already stored. No new fact was
    /// written; invalidations an interrupted earlier attempt left pending
    /// were applied and are listed in `invalidated`.
    Duplicate {
        existing: FactId,
        invalidated: Vec<FactId>,
    },
    /// Lost to an existing fact and was dropped.
    Rejected { outranked_by: FactId },
}

impl IngestOutcome {
    pub fn fact_id(&self) -> Option<FactId> {
        match self {
            IngestOutcome::Ingested { fact, .. } => Some(fact.id()),
            IngestOutcome::Duplicate { existing, .. } => Some(*existing),
            IngestOutcome::Rejected { .. } => None,
        }
    }

    pub fn invalidated(&self) -> &[FactId] {
        match self {
            IngestOutcome::Ingested { invalidated, .. }
            | IngestOutcome::Duplicate { invalidated, .. } => invalidated,
            IngestOutcome::Rejected { .. } => &[],
        }
    }

    /// Stored and still active.
    pub fn is_active_ingest(&self) -> bool {
        matches!(self, IngestOutcome::Ingested { fact, .. } if fact.is_active())
    }
}
