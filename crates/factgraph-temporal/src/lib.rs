//! # factgraph-temporal
//!
//! Temporal fact conflict and resolution engine: decides which existing
//! facts a new fact supersedes, records the invalidation chain without ever
//! deleting history, and assembles the resulting triplet graph.

pub mod batch;
pub mod conflict;
pub mod engine;
pub mod graph;
pub mod invalidation;
pub mod outcome;

pub use batch::{BatchFailure, BatchItem, BatchReport};
pub use conflict::{find_conflicts, ConflictResolution};
pub use engine::FactEngine;
pub use graph::{GraphAssembler, InMemoryGraph};
pub use invalidation::{invalidate, InvalidationOutcome};
pub use outcome::IngestOutcome;
