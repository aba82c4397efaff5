//! Migration runner: version tracking, forward-only, one transaction per
//! migration.

mod v001_fact_tables;
mod v002_append_only_guards;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use factgraph_core::errors::StoreError;
use factgraph_core::{FactGraphError, FactGraphResult};

use crate::to_store_err;

pub const LATEST_VERSION: u32 = 2;

type MigrationFn = fn(&Connection) -> FactGraphResult<()>;

const MIGRATIONS: [(u32, &str, MigrationFn); 2] = [
    (1, "fact_tables", v001_fact_tables::migrate),
    (2, "append_only_guards", v002_append_only_guards::migrate),
];

/// Current schema version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> FactGraphResult<u32> {
    let exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version'")
        .and_then(|mut stmt| stmt.exists([]))
        .map_err(to_store_err)?;

    if !exists {
        return Ok(0);
    }

    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(to_store_err)
}

/// Run all pending migrations. Returns how many were applied.
pub fn run_migrations(conn: &Connection) -> FactGraphResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        ) STRICT;",
    )
    .map_err(to_store_err)?;

    let current = current_version(conn)?;
    if current >= LATEST_VERSION {
        debug!("fact schema is up to date (v{current})");
        return Ok(0);
    }

    info!(from = current, to = LATEST_VERSION, "running fact store migrations");
    let mut applied = 0;

    for &(version, name, migrate_fn) in &MIGRATIONS {
        if version <= current {
            continue;
        }

        conn.execute_batch("BEGIN IMMEDIATE").map_err(to_store_err)?;
        let result = migrate_fn(conn).and_then(|()| {
            conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
                .map_err(to_store_err)?;
            conn.execute_batch("COMMIT").map_err(to_store_err)
        });

        if let Err(e) = result {
            warn!("migration v{version:03} failed: {e}, rolling back");
            let _ = conn.execute_batch("ROLLBACK");
            return Err(FactGraphError::Store(StoreError::MigrationError(format!(
                "v{version:03} {name}: {e}"
            ))));
        }

        info!("applied migration v{version:03}: {name}");
        applied += 1;
    }

    Ok(applied)
}
