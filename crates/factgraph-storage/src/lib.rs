//! # factgraph-storage
//!
//! Fact store implementations of `IFactStore`:
//! - [`InMemoryFactStore`]: DashMap-backed, for tests and embedders.
//! - [`SqliteFactStore`]: single writer + read pool (WAL), forward-only
//!   migrations, append-only tables guarded by triggers.

pub mod engine;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod pragmas;
pub mod queries;

pub use engine::SqliteFactStore;
pub use memory::InMemoryFactStore;

use factgraph_core::errors::StoreError;
use factgraph_core::FactGraphError;
use rusqlite::ErrorCode;

/// Map a rusqlite error into the engine's error type.
///
/// Busy, locked and cannot-open failures are transient and become
/// `StoreError::Unavailable` so callers may retry the fact.
pub fn to_store_err(e: rusqlite::Error) -> FactGraphError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if matches!(
                err.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen
            ) =>
        {
            FactGraphError::unavailable(e.to_string())
        }
        _ => FactGraphError::Store(StoreError::SqliteError {
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_maps_to_retryable() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked".into()),
        );
        assert!(to_store_err(busy).is_retryable());
    }

    #[test]
    fn other_failures_are_not_retryable() {
        let err = to_store_err(rusqlite::Error::InvalidQuery);
        assert!(!err.is_retryable());
        assert!(matches!(
            err,
            FactGraphError::Store(StoreError::SqliteError { .. })
        ));
    }
}
