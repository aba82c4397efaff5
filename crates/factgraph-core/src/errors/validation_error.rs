use chrono::{DateTime, Utc};

/// Rejections raised before a fact reaches the store. Never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("incomplete triplet: {field} is empty")]
    IncompleteTriplet { field: &'static str },

    #[error("confidence out of range [0, 1]: {value}")]
    ConfidenceOutOfRange { value: f64 },

    #[error("valid_until ({valid_until}) precedes valid_from ({valid_from})")]
    InvalidValidityWindow {
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    },

    #[error("unknown {field}: '{value}'")]
    UnknownClassification { field: &'static str, value: String },

    #[error("fact {fact_id} cannot be invalidated by itself")]
    SelfInvalidation { fact_id: String },

    #[error("duplicate fact id: {fact_id}")]
    DuplicateFactId { fact_id: String },
}
