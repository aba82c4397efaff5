//! Graph assembly: turn stored facts into entity nodes, predicate edges,
//! fact metadata nodes and invalidation links, emitted through `IGraphSink`.

pub mod assembler;
pub mod attributes;
pub mod memory_graph;

pub use assembler::{AssembledFact, GraphAssembler};
pub use memory_graph::InMemoryGraph;
