/// Fact store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend cannot be reached right now. The caller may retry the fact.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("fact not found: {fact_id}")]
    FactNotFound { fact_id: String },

    #[error("sqlite error: {message}")]
    SqliteError { message: String },

    #[error("corrupt row for fact {fact_id}: {reason}")]
    CorruptRow { fact_id: String, reason: String },

    #[error("migration error: {0}")]
    MigrationError(String),
}
