//! Invalidation vocabulary: reasons, lifecycle deltas, and audit edges.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fact::FactId;
use crate::errors::ValidationError;

/// Why one fact superseded another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationReason {
    /// Generic supersession (caller-driven).
    Superseded,
    /// The new fact carried strictly higher confidence.
    ConfidenceOverride,
    /// Equal confidence, the new fact was extracted later.
    RecencyTiebreak,
    /// Equal confidence and extraction time, settled by fact id ordering.
    IdentifierTiebreak,
    /// The new fact lost to an existing higher-confidence fact and is kept
    /// only as history.
    ConfidenceFloor,
}

impl InvalidationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidationReason::Superseded => "superseded",
            InvalidationReason::ConfidenceOverride => "confidence_override",
            InvalidationReason::RecencyTiebreak => "recency_tiebreak",
            InvalidationReason::IdentifierTiebreak => "identifier_tiebreak",
            InvalidationReason::ConfidenceFloor => "confidence_floor",
        }
    }
}

impl fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvalidationReason {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superseded" => Ok(InvalidationReason::Superseded),
            "confidence_override" => Ok(InvalidationReason::ConfidenceOverride),
            "recency_tiebreak" => Ok(InvalidationReason::RecencyTiebreak),
            "identifier_tiebreak" => Ok(InvalidationReason::IdentifierTiebreak),
            "confidence_floor" => Ok(InvalidationReason::ConfidenceFloor),
            other => Err(ValidationError::UnknownClassification {
                field: "invalidation_reason",
                value: other.to_string(),
            }),
        }
    }
}

/// The lifecycle fields an invalidation writes. Nothing else may change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleDelta {
    pub invalidated_by: FactId,
    pub invalidated_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
    /// Applied only when the fact has no `valid_until` yet.
    pub valid_until: Option<DateTime<Utc>>,
    pub reason: InvalidationReason,
}

/// Append-only audit record: `from_fact_id` was invalidated by `to_fact_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidationEdge {
    pub from_fact_id: FactId,
    pub to_fact_id: FactId,
    pub reason: InvalidationReason,
    pub recorded_at: DateTime<Utc>,
}
