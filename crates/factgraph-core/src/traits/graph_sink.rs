use crate::errors::FactGraphResult;
use crate::models::Attributes;

/// Destination for assembled graph structures.
///
/// Both operations are upserts keyed on identity: re-emitting a node or edge
/// merges attributes (last writer wins) instead of duplicating it. An edge is
/// identified by `(from, to, label)`.
pub trait IGraphSink: Send + Sync {
    fn upsert_node(&self, id: &str, attrs: &Attributes) -> FactGraphResult<()>;

    fn upsert_edge(&self, from: &str, to: &str, label: &str, attrs: &Attributes)
        -> FactGraphResult<()>;
}
