use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use factgraph_core::entity::{self, CanonicalEntity, EntityId};
use factgraph_core::models::{AtomicFact, FactId, InvalidationEdge, INVALIDATED_BY_LABEL};
use factgraph_core::traits::IGraphSink;
use factgraph_core::FactGraphResult;

use super::attributes;

/// Identifiers of everything emitted for one fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledFact {
    pub subject_node: EntityId,
    pub object_node: EntityId,
    pub predicate_label: String,
    pub fact_node: FactId,
    /// Entities emitted for the first time by this call.
    pub new_entities: Vec<EntityId>,
}

/// Emits graph structures for facts. Entity nodes are emitted once per
/// assembler; later facts reuse them by id.
pub struct GraphAssembler {
    sink: Arc<dyn IGraphSink>,
    entities: DashMap<EntityId, String>,
}

impl GraphAssembler {
    pub fn new(sink: Arc<dyn IGraphSink>) -> Self {
        Self {
            sink,
            entities: DashMap::new(),
        }
    }

    pub fn sink(&self) -> &Arc<dyn IGraphSink> {
        &self.sink
    }

    /// Number of distinct entities emitted so far.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn assemble(&self, fact: &AtomicFact) -> FactGraphResult<AssembledFact> {
        let core = fact.core();
        let subject = entity::normalize(core.subject());
        let object = entity::normalize(core.object());

        let mut new_entities = Vec::new();
        for e in [&subject, &object] {
            if self.ensure_entity(e)? {
                new_entities.push(e.id);
            }
        }

        let fact_id = fact.id().to_string();
        self.sink
            .upsert_node(&fact_id, &attributes::fact_node(fact))?;

        let label = core.key().predicate.clone();
        self.sink.upsert_edge(
            &subject.id.to_string(),
            &object.id.to_string(),
            &label,
            &attributes::predicate_edge(fact),
        )?;

        debug!(fact_id = %fact.id(), new_entities = new_entities.len(), "fact assembled");
        Ok(AssembledFact {
            subject_node: subject.id,
            object_node: object.id,
            predicate_label: label,
            fact_node: fact.id(),
            new_entities,
        })
    }

    /// Re-emit the invalidated fact's node and predicate edge with its closed
    /// lifecycle, and link it to its successor.
    pub fn link_invalidation(
        &self,
        edge: &InvalidationEdge,
        old_fact: &AtomicFact,
    ) -> FactGraphResult<()> {
        let old_id = edge.from_fact_id.to_string();
        self.sink
            .upsert_node(&old_id, &attributes::fact_node(old_fact))?;

        let core = old_fact.core();
        self.sink.upsert_edge(
            &core.subject_id().to_string(),
            &core.object_id().to_string(),
            &core.key().predicate,
            &attributes::predicate_edge(old_fact),
        )?;

        self.sink.upsert_edge(
            &old_id,
            &edge.to_fact_id.to_string(),
            INVALIDATED_BY_LABEL,
            &attributes::invalidation_edge(edge),
        )
    }

    /// Emit the entity node unless this assembler already has. Returns true
    /// if it was emitted now.
    fn ensure_entity(&self, entity: &CanonicalEntity) -> FactGraphResult<bool> {
        if self
            .entities
            .insert(entity.id, entity.normalized_name.clone())
            .is_some()
        {
            return Ok(false);
        }
        if let Err(e) = self
            .sink
            .upsert_node(&entity.id.to_string(), &attributes::entity_node(entity))
        {
            self.entities.remove(&entity.id);
            return Err(e);
        }
        Ok(true)
    }
}
