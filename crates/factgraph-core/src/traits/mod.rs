mod fact_store;
mod graph_sink;

pub use fact_store::{FactScope, IFactStore, UpdateOutcome};
pub use graph_sink::IGraphSink;
