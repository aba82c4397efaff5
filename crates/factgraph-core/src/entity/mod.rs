//! Canonical entity identity.

pub mod normalizer;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use normalizer::{entity_id, normalize, normalize_name, normalize_predicate};

/// Deterministic, content-addressed entity identifier (UUID v5 of the
/// normalized name). Equal names always yield equal ids, across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A deduplicated subject/object identity. Many raw mentions map to one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub normalized_name: String,
    pub id: EntityId,
}
