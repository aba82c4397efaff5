use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

/// A raw triplet as produced by the extraction service.
///
/// Only structural completeness is checked here; the content is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFact {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub source_chunk_id: Uuid,
    #[serde(default)]
    pub source_text: String,
}

impl CandidateFact {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
        source_chunk_id: Uuid,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            source_chunk_id,
            source_text: String::new(),
        }
    }

    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.source_text = text.into();
        self
    }

    pub fn check_complete(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("subject", &self.subject),
            ("predicate", &self.predicate),
            ("object", &self.object),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::IncompleteTriplet { field });
            }
        }
        Ok(())
    }
}
