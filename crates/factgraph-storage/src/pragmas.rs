//! PRAGMA setup. Called on every connection right after it is opened.

use rusqlite::Connection;

use factgraph_core::FactGraphResult;

use crate::to_store_err;

/// Writer connection: WAL, foreign keys, busy timeout.
pub fn configure_connection(conn: &Connection) -> FactGraphResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA cache_size = -8000;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(to_store_err)
}

/// Reader connection. The writer has already switched the file to WAL.
pub fn configure_readonly_connection(conn: &Connection) -> FactGraphResult<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA cache_size = -8000;
        PRAGMA temp_store = MEMORY;
        PRAGMA query_only = ON;
        ",
    )
    .map_err(to_store_err)
}
