//! Attribute bags for each node and edge kind.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use factgraph_core::entity::CanonicalEntity;
use factgraph_core::models::{
    AtomicFact, Attributes, InvalidationEdge, NodeKind, INVALIDATED_BY_LABEL, NODE_TYPE_KEY,
};

fn time(t: DateTime<Utc>) -> Value {
    Value::String(t.to_rfc3339())
}

fn opt_time(t: Option<DateTime<Utc>>) -> Value {
    t.map_or(Value::Null, time)
}

fn bag(pairs: Vec<(&str, Value)>) -> Attributes {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

pub fn entity_node(entity: &CanonicalEntity) -> Attributes {
    bag(vec![
        (NODE_TYPE_KEY, json!(NodeKind::Entity.as_str())),
        ("id", json!(entity.id.to_string())),
        ("name", json!(entity.normalized_name)),
    ])
}

/// The full fact record minus the raw subject and object text.
pub fn fact_node(fact: &AtomicFact) -> Attributes {
    let core = fact.core();
    let inv = fact.invalidation();
    bag(vec![
        (NODE_TYPE_KEY, json!(NodeKind::AtomicFact.as_str())),
        ("id", json!(fact.id().to_string())),
        ("subject_id", json!(core.subject_id().to_string())),
        ("predicate", json!(core.predicate())),
        ("predicate_key", json!(core.key().predicate)),
        ("object_id", json!(core.object_id().to_string())),
        ("source_chunk_id", json!(core.source_chunk_id().to_string())),
        ("source_text", json!(core.source_text())),
        ("fact_kind", json!(core.fact_kind().as_str())),
        ("temporal_kind", json!(core.temporal_kind().as_str())),
        ("confidence", json!(core.confidence().value())),
        ("valid_from", time(core.valid_from())),
        ("valid_until", opt_time(fact.valid_until())),
        ("is_open_interval", json!(core.is_open_interval())),
        ("extracted_at", time(core.extracted_at())),
        ("invalidated_by", json!(inv.map(|i| i.by.to_string()))),
        ("invalidated_at", opt_time(inv.map(|i| i.at))),
        ("expired_at", opt_time(inv.map(|i| i.expired_at))),
        ("invalidation_reason", json!(inv.map(|i| i.reason.as_str()))),
    ])
}

pub fn predicate_edge(fact: &AtomicFact) -> Attributes {
    let core = fact.core();
    bag(vec![
        ("fact_id", json!(fact.id().to_string())),
        ("fact_kind", json!(core.fact_kind().as_str())),
        ("temporal_kind", json!(core.temporal_kind().as_str())),
        ("confidence", json!(core.confidence().value())),
        ("valid_from", time(core.valid_from())),
        ("valid_until", opt_time(fact.valid_until())),
        ("source_chunk_id", json!(core.source_chunk_id().to_string())),
    ])
}

pub fn invalidation_edge(edge: &InvalidationEdge) -> Attributes {
    bag(vec![
        ("relationship_name", json!(INVALIDATED_BY_LABEL)),
        ("source_node_id", json!(edge.from_fact_id.to_string())),
        ("target_node_id", json!(edge.to_fact_id.to_string())),
        ("reason", json!(edge.reason.as_str())),
        ("invalidated_at", time(edge.recorded_at)),
    ])
}
