//! Rule 6: precedence between two competing STATIC facts.

use std::cmp::Ordering;

use tracing::warn;

use factgraph_core::models::{AtomicFact, InvalidationReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    NewWins(InvalidationReason),
    ExistingWins,
}

/// Higher confidence wins; on a tie the later extraction wins; on a full tie
/// the greater fact id wins.
pub fn precedence(new: &AtomicFact, existing: &AtomicFact) -> Precedence {
    let (a, b) = (new.core(), existing.core());

    match a.confidence().value().total_cmp(&b.confidence().value()) {
        Ordering::Greater => return Precedence::NewWins(InvalidationReason::ConfidenceOverride),
        Ordering::Less => return Precedence::ExistingWins,
        Ordering::Equal => {}
    }

    match a.extracted_at().cmp(&b.extracted_at()) {
        Ordering::Greater => return Precedence::NewWins(InvalidationReason::RecencyTiebreak),
        Ordering::Less => return Precedence::ExistingWins,
        Ordering::Equal => {}
    }

    warn!(
        new_fact_id = %new.id(),
        existing_fact_id = %existing.id(),
        confidence = a.confidence().value(),
        "ambiguous conflict: equal confidence and extraction time, ordering by fact id"
    );
    if new.id() > existing.id() {
        Precedence::NewWins(InvalidationReason::IdentifierTiebreak)
    } else {
        Precedence::ExistingWins
    }
}

/// Whether `a` ranks strictly above `b` under the same ordering.
pub fn outranks(a: &AtomicFact, b: &AtomicFact) -> bool {
    let (x, y) = (a.core(), b.core());
    x.confidence()
        .value()
        .total_cmp(&y.confidence().value())
        .then_with(|| x.extracted_at().cmp(&y.extracted_at()))
        .then_with(|| a.id().cmp(&b.id()))
        == Ordering::Greater
}
