//! In-process graph sink on a petgraph `StableGraph`.
//!
//! Nodes are indexed by string id. Upserts merge attributes key by key, last
//! writer wins. Edges are identified by `(from, to, label)`.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use factgraph_core::models::{Attributes, NodeKind};
use factgraph_core::traits::IGraphSink;
use factgraph_core::{FactGraphError, FactGraphResult};

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub id: String,
    pub attrs: Attributes,
}

#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub label: String,
    pub attrs: Attributes,
}

#[derive(Debug, Default)]
struct IndexedGraph {
    graph: StableGraph<GraphNode, GraphEdge>,
    index: HashMap<String, NodeIndex>,
}

impl IndexedGraph {
    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode {
            id: id.to_string(),
            attrs: Attributes::new(),
        });
        self.index.insert(id.to_string(), idx);
        idx
    }

    fn find_edge(&self, from: NodeIndex, to: NodeIndex, label: &str) -> Option<&GraphEdge> {
        self.graph
            .edges_directed(from, Direction::Outgoing)
            .find(|e| e.target() == to && e.weight().label == label)
            .map(|e| e.weight())
    }
}

fn merge(into: &mut Attributes, from: &Attributes) {
    for (k, v) in from {
        into.insert(k.clone(), v.clone());
    }
}

#[derive(Debug, Default)]
pub struct InMemoryGraph {
    inner: RwLock<IndexedGraph>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> FactGraphResult<usize> {
        Ok(self.read()?.graph.node_count())
    }

    pub fn edge_count(&self) -> FactGraphResult<usize> {
        Ok(self.read()?.graph.edge_count())
    }

    pub fn node(&self, id: &str) -> FactGraphResult<Option<Attributes>> {
        let g = self.read()?;
        Ok(g.index
            .get(id)
            .and_then(|&idx| g.graph.node_weight(idx))
            .map(|n| n.attrs.clone()))
    }

    pub fn edge(&self, from: &str, to: &str, label: &str) -> FactGraphResult<Option<Attributes>> {
        let g = self.read()?;
        let (Some(&a), Some(&b)) = (g.index.get(from), g.index.get(to)) else {
            return Ok(None);
        };
        Ok(g.find_edge(a, b, label).map(|e| e.attrs.clone()))
    }

    /// Outgoing `(target id, label)` pairs.
    pub fn outgoing(&self, id: &str) -> FactGraphResult<Vec<(String, String)>> {
        let g = self.read()?;
        let Some(&idx) = g.index.get(id) else {
            return Ok(Vec::new());
        };
        Ok(g.graph
            .edges_directed(idx, Direction::Outgoing)
            .filter_map(|e| {
                g.graph
                    .node_weight(e.target())
                    .map(|n| (n.id.clone(), e.weight().label.clone()))
            })
            .collect())
    }

    pub fn count_nodes_of(&self, kind: NodeKind) -> FactGraphResult<usize> {
        let g = self.read()?;
        Ok(g.graph
            .node_weights()
            .filter(|n| NodeKind::of(&n.attrs) == Some(kind))
            .count())
    }

    pub fn count_edges_labelled(&self, label: &str) -> FactGraphResult<usize> {
        let g = self.read()?;
        Ok(g.graph.edge_weights().filter(|e| e.label == label).count())
    }

    fn read(&self) -> FactGraphResult<RwLockReadGuard<'_, IndexedGraph>> {
        self.inner
            .read()
            .map_err(|e| FactGraphError::ConcurrencyError(e.to_string()))
    }

    fn write(&self) -> FactGraphResult<RwLockWriteGuard<'_, IndexedGraph>> {
        self.inner
            .write()
            .map_err(|e| FactGraphError::ConcurrencyError(e.to_string()))
    }
}

impl IGraphSink for InMemoryGraph {
    fn upsert_node(&self, id: &str, attrs: &Attributes) -> FactGraphResult<()> {
        let mut g = self.write()?;
        let idx = g.ensure_node(id);
        if let Some(node) = g.graph.node_weight_mut(idx) {
            merge(&mut node.attrs, attrs);
        }
        Ok(())
    }

    fn upsert_edge(
        &self,
        from: &str,
        to: &str,
        label: &str,
        attrs: &Attributes,
    ) -> FactGraphResult<()> {
        let mut g = self.write()?;
        let a = g.ensure_node(from);
        let b = g.ensure_node(to);

        let existing = g
            .graph
            .edges_directed(a, Direction::Outgoing)
            .find(|e| e.target() == b && e.weight().label == label)
            .map(|e| e.id());

        if let Some(id) = existing {
            if let Some(edge) = g.graph.edge_weight_mut(id) {
                merge(&mut edge.attrs, attrs);
                return Ok(());
            }
        }
        g.graph.add_edge(
            a,
            b,
            GraphEdge {
                label: label.to_string(),
                attrs: attrs.clone(),
            },
        );
        Ok(())
    }
}
