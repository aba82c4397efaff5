//! # factgraph-core
//!
//! Foundation types for the factgraph engine: the atomic fact model and its
//! lifecycle state machine, canonical entity normalization, errors,
//! configuration, and the storage/graph traits the engine is written against.

pub mod cancel;
pub mod config;
pub mod entity;
pub mod errors;
pub mod locks;
pub mod models;
pub mod observability;
pub mod traits;

pub use cancel::CancellationToken;
pub use config::FactGraphConfig;
pub use entity::{normalize, CanonicalEntity, EntityId};
pub use errors::{FactGraphError, FactGraphResult};
pub use locks::KeyLocks;
pub use models::{AtomicFact, Confidence, FactId, FactKey, FactKind, TemporalKind};
pub use traits::{FactScope, IFactStore, IGraphSink, UpdateOutcome};
