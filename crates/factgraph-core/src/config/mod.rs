pub mod engine_config;
pub mod observability_config;
pub mod storage_config;

use serde::{Deserialize, Serialize};

use crate::errors::{FactGraphError, FactGraphResult};

pub use engine_config::{EngineConfig, LosingFactPolicy};
pub use observability_config::ObservabilityConfig;
pub use storage_config::StorageConfig;

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FactGraphConfig {
    pub engine: EngineConfig,
    pub storage: StorageConfig,
    pub observability: ObservabilityConfig,
}

impl FactGraphConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    /// The result is validated before it is returned.
    pub fn from_toml(toml_str: &str) -> FactGraphResult<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| FactGraphError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every subsystem's bounds.
    pub fn validate(&self) -> FactGraphResult<()> {
        self.engine.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}
