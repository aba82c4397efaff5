use super::{StoreError, ValidationError};

/// Top-level error type for the factgraph engine.
/// Subsystem errors convert into this via `From` impls.
#[derive(Debug, thiserror::Error)]
pub enum FactGraphError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("graph sink error: {0}")]
    GraphSinkError(String),

    #[error("ingestion cancelled")]
    Cancelled,
}

impl FactGraphError {
    /// Whether the failed operation may succeed if retried unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FactGraphError::Store(StoreError::Unavailable { .. }))
    }

    /// Shorthand for `StoreError::Unavailable`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        FactGraphError::Store(StoreError::Unavailable {
            reason: reason.into(),
        })
    }
}

/// Convenience type alias.
pub type FactGraphResult<T> = Result<T, FactGraphError>;
