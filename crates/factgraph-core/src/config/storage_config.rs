use serde::{Deserialize, Serialize};

use crate::errors::{FactGraphError, FactGraphResult};

/// Fact store backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file. `None` selects an in-memory database.
    pub db_path: Option<String>,
    pub read_pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            read_pool_size: 2,
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> FactGraphResult<()> {
        if self.read_pool_size > 64 {
            return Err(FactGraphError::ConfigError(format!(
                "read_pool_size must be at most 64, got {}",
                self.read_pool_size
            )));
        }
        Ok(())
    }
}
