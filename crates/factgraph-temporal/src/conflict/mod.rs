//! Conflict resolution: decide which active same-key facts a new fact
//! supersedes.
//!
//! Each candidate is checked against an ordered rule list; the first rule
//! that matches decides. Only the final precedence rule can produce an
//! invalidation, and it never lets a strictly weaker new fact win.

pub mod rules;
pub mod tiebreak;

use tracing::debug;

use factgraph_core::models::{AtomicFact, FactId, InvalidationReason};

pub use rules::ConflictRule;
pub use tiebreak::Precedence;

/// What a rule decided for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictOutcome {
    /// The two facts coexist.
    NoConflict,
    /// The new fact supersedes the candidate.
    Invalidates(InvalidationReason),
    /// The candidate outranks the new fact; nothing is invalidated.
    Outranks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictDecision {
    pub candidate_id: FactId,
    pub rule: ConflictRule,
    pub outcome: ConflictOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictResolution {
    /// One entry per candidate, in input order.
    pub decisions: Vec<ConflictDecision>,
    /// Candidates the new fact supersedes, with the reason.
    pub to_invalidate: Vec<(FactId, InvalidationReason)>,
    /// Strongest candidate that outranks the new fact, if any.
    pub outranked_by: Option<FactId>,
}

impl ConflictResolution {
    pub fn conflicts_found(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| d.outcome != ConflictOutcome::NoConflict)
            .count()
    }

    /// True when some existing fact beats the new one.
    pub fn is_dominated(&self) -> bool {
        self.outranked_by.is_some()
    }
}

/// Evaluate `new` against every candidate. Pure: no I/O, no mutation.
pub fn find_conflicts(new: &AtomicFact, candidates: &[AtomicFact]) -> ConflictResolution {
    let mut resolution = ConflictResolution::default();
    let mut strongest: Option<&AtomicFact> = None;

    for candidate in candidates {
        let (rule, outcome) = match rules::coexistence_rule(new, candidate) {
            Some(rule) => (rule, ConflictOutcome::NoConflict),
            None => match tiebreak::precedence(new, candidate) {
                Precedence::NewWins(reason) => {
                    resolution.to_invalidate.push((candidate.id(), reason));
                    (ConflictRule::Precedence, ConflictOutcome::Invalidates(reason))
                }
                Precedence::ExistingWins => {
                    if strongest.map_or(true, |s| tiebreak::outranks(candidate, s)) {
                        strongest = Some(candidate);
                    }
                    (ConflictRule::Precedence, ConflictOutcome::Outranks)
                }
            },
        };

        debug!(
            new_fact_id = %new.id(),
            candidate_id = %candidate.id(),
            rule = rule.as_str(),
            ?outcome,
            "conflict rule evaluated"
        );
        resolution.decisions.push(ConflictDecision {
            candidate_id: candidate.id(),
            rule,
            outcome,
        });
    }

    resolution.outranked_by = strongest.map(AtomicFact::id);
    resolution
}
