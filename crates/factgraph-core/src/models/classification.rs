//! Closed classification vocabularies and the upstream classification record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Certainty class of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactKind {
    /// Objectively verifiable ("revenue was $1M").
    Fact,
    /// Subjective ("the product is great").
    Opinion,
    /// Future-oriented ("sales will increase").
    Prediction,
}

/// Temporal volatility class of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemporalKind {
    /// Never changes ("water boils at 100°C").
    Atemporal,
    /// Changes rarely ("the CEO is John").
    Static,
    /// Changes frequently ("the stock price is $50").
    Dynamic,
}

impl FactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactKind::Fact => "FACT",
            FactKind::Opinion => "OPINION",
            FactKind::Prediction => "PREDICTION",
        }
    }
}

impl TemporalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalKind::Atemporal => "ATEMPORAL",
            TemporalKind::Static => "STATIC",
            TemporalKind::Dynamic => "DYNAMIC",
        }
    }
}

impl FromStr for FactKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FACT" => Ok(FactKind::Fact),
            "OPINION" => Ok(FactKind::Opinion),
            "PREDICTION" => Ok(FactKind::Prediction),
            _ => Err(ValidationError::UnknownClassification {
                field: "fact_kind",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for TemporalKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ATEMPORAL" => Ok(TemporalKind::Atemporal),
            "STATIC" => Ok(TemporalKind::Static),
            "DYNAMIC" => Ok(TemporalKind::Dynamic),
            _ => Err(ValidationError::UnknownClassification {
                field: "temporal_kind",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TemporalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the upstream classification service for one candidate.
///
/// `confidence` is raw here; it is range-checked when the fact is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub fact_kind: FactKind,
    pub temporal_kind: TemporalKind,
    pub confidence: f64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_open_interval: bool,
}

impl Classification {
    /// Safe defaults for an unclassified candidate: FACT, STATIC, open interval
    /// starting at `valid_from`.
    pub fn unclassified(valid_from: DateTime<Utc>, confidence: f64) -> Self {
        Self {
            fact_kind: FactKind::Fact,
            temporal_kind: TemporalKind::Static,
            confidence,
            valid_from,
            valid_until: None,
            is_open_interval: true,
        }
    }
}
