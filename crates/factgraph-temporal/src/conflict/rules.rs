//! Coexistence rules 0 through 5.

use factgraph_core::models::{AtomicFact, FactKind, TemporalKind};

/// The rule that decided a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictRule {
    /// The candidate is the new fact itself or already invalidated.
    Skipped,
    DifferentKey,
    /// Same source chunk: re-ingestion, never a conflict.
    SameChunk,
    Dynamic,
    Atemporal,
    Opinion,
    /// Both STATIC, both FACT or PREDICTION: confidence, then recency, then id.
    Precedence,
}

impl ConflictRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictRule::Skipped => "skipped",
            ConflictRule::DifferentKey => "different_key",
            ConflictRule::SameChunk => "same_chunk",
            ConflictRule::Dynamic => "dynamic",
            ConflictRule::Atemporal => "atemporal",
            ConflictRule::Opinion => "opinion",
            ConflictRule::Precedence => "precedence",
        }
    }
}

/// First rule under which `new` and `candidate` coexist, or `None` if they
/// compete and precedence must decide.
pub fn coexistence_rule(new: &AtomicFact, candidate: &AtomicFact) -> Option<ConflictRule> {
    let (a, b) = (new.core(), candidate.core());

    if candidate.id() == new.id() || !candidate.is_active() {
        return Some(ConflictRule::Skipped);
    }
    if a.key() != b.key() {
        return Some(ConflictRule::DifferentKey);
    }
    if a.source_chunk_id() == b.source_chunk_id() {
        return Some(ConflictRule::SameChunk);
    }
    if either(a.temporal_kind(), b.temporal_kind(), TemporalKind::Dynamic) {
        return Some(ConflictRule::Dynamic);
    }
    if either(a.temporal_kind(), b.temporal_kind(), TemporalKind::Atemporal) {
        return Some(ConflictRule::Atemporal);
    }
    if a.fact_kind() == FactKind::Opinion || b.fact_kind() == FactKind::Opinion {
        return Some(ConflictRule::Opinion);
    }
    None
}

fn either(a: TemporalKind, b: TemporalKind, kind: TemporalKind) -> bool {
    a == kind || b == kind
}
