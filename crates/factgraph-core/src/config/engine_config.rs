//! Ingestion engine configuration.

use serde::{Deserialize, Serialize};

use crate::errors::{FactGraphError, FactGraphResult};

/// What happens to a new fact that is outranked by an existing active fact
/// under the confidence floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LosingFactPolicy {
    /// Append the new fact and immediately invalidate it by the fact that
    /// outranks it. Weaker candidates it beats are still invalidated by it.
    /// History keeps every statement ever seen.
    #[default]
    RetainAsHistory,
    /// Drop the new fact without touching the store. Nothing is invalidated,
    /// since a dropped fact cannot be anyone's successor.
    Discard,
}

/// Configuration passed explicitly into the engine constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upstream extraction refinement rounds (1-5). Carried for collaborators.
    pub extraction_rounds: u32,
    /// Facts per upstream classification call (1-50). Carried for collaborators.
    pub classification_batch_size: u32,
    pub losing_fact_policy: LosingFactPolicy,
    /// Confidence applied when no classification is supplied.
    pub default_confidence: f64,
}

pub const EXTRACTION_ROUNDS_RANGE: std::ops::RangeInclusive<u32> = 1..=5;
pub const CLASSIFICATION_BATCH_RANGE: std::ops::RangeInclusive<u32> = 1..=50;

const ENV_EXTRACTION_ROUNDS: &str = "FACTGRAPH_EXTRACTION_ROUNDS";
const ENV_CLASSIFICATION_BATCH_SIZE: &str = "FACTGRAPH_CLASSIFICATION_BATCH_SIZE";

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            extraction_rounds: 2,
            classification_batch_size: 10,
            losing_fact_policy: LosingFactPolicy::RetainAsHistory,
            default_confidence: 0.5,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `FACTGRAPH_EXTRACTION_ROUNDS` and
    /// `FACTGRAPH_CLASSIFICATION_BATCH_SIZE` when set.
    pub fn from_env() -> FactGraphResult<Self> {
        let mut config = Self::default();
        if let Some(v) = read_env_u32(ENV_EXTRACTION_ROUNDS)? {
            config.extraction_rounds = v;
        }
        if let Some(v) = read_env_u32(ENV_CLASSIFICATION_BATCH_SIZE)? {
            config.classification_batch_size = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FactGraphResult<()> {
        if !EXTRACTION_ROUNDS_RANGE.contains(&self.extraction_rounds) {
            return Err(FactGraphError::ConfigError(format!(
                "extraction_rounds must be within {:?}, got {}",
                EXTRACTION_ROUNDS_RANGE, self.extraction_rounds
            )));
        }
        if !CLASSIFICATION_BATCH_RANGE.contains(&self.classification_batch_size) {
            return Err(FactGraphError::ConfigError(format!(
                "classification_batch_size must be within {:?}, got {}",
                CLASSIFICATION_BATCH_RANGE, self.classification_batch_size
            )));
        }
        if !(0.0..=1.0).contains(&self.default_confidence) {
            return Err(FactGraphError::ConfigError(format!(
                "default_confidence must be within [0, 1], got {}",
                self.default_confidence
            )));
        }
        Ok(())
    }
}

fn read_env_u32(name: &str) -> FactGraphResult<Option<u32>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| FactGraphError::ConfigError(format!("{name}='{raw}': {e}"))),
        Err(_) => Ok(None),
    }
}
