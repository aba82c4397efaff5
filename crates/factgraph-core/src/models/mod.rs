pub mod candidate;
pub mod classification;
pub mod confidence;
pub mod fact;
pub mod graph;
pub mod invalidation;

pub use candidate::CandidateFact;
pub use classification::{Classification, FactKind, TemporalKind};
pub use confidence::Confidence;
pub use fact::{
    AtomicFact, FactCore, FactId, FactKey, FactLifecycle, FactState, Invalidation, NewFact,
    Transition,
};
pub use graph::{Attributes, NodeKind, INVALIDATED_BY_LABEL, NODE_TYPE_KEY};
pub use invalidation::{InvalidationEdge, InvalidationReason, LifecycleDelta};
