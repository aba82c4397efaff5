//! Graph output vocabulary shared by the assembler and every sink.

use serde::{Deserialize, Serialize};

/// Node/edge attribute bag. Values are plain JSON so any backend can take them.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Attribute key carrying the node kind.
pub const NODE_TYPE_KEY: &str = "type";

/// Label of the edge linking an invalidated fact node to its successor.
pub const INVALIDATED_BY_LABEL: &str = "invalidated_by";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Entity,
    AtomicFact,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Entity => "Entity",
            NodeKind::AtomicFact => "AtomicFact",
        }
    }

    /// Kind recorded in an attribute bag, if any.
    pub fn of(attrs: &Attributes) -> Option<Self> {
        match attrs.get(NODE_TYPE_KEY).and_then(|v| v.as_str()) {
            Some("Entity") => Some(NodeKind::Entity),
            Some("AtomicFact") => Some(NodeKind::AtomicFact),
            _ => None,
        }
    }
}
