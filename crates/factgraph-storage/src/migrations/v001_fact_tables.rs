//! v001: facts and invalidation_edges.
//!
//! Timestamps are RFC 3339 UTC with nanosecond precision, so text order is
//! chronological order.

use rusqlite::Connection;

use factgraph_core::FactGraphResult;

use crate::to_store_err;

pub fn migrate(conn: &Connection) -> FactGraphResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS facts (
            id                  TEXT PRIMARY KEY NOT NULL,
            subject             TEXT NOT NULL,
            predicate           TEXT NOT NULL,
            object              TEXT NOT NULL,
            subject_id          TEXT NOT NULL,
            predicate_key       TEXT NOT NULL,
            object_id           TEXT NOT NULL,
            source_chunk_id     TEXT NOT NULL,
            source_text         TEXT NOT NULL DEFAULT '',
            fact_kind           TEXT NOT NULL
                CHECK (fact_kind IN ('FACT', 'OPINION', 'PREDICTION')),
            temporal_kind       TEXT NOT NULL
                CHECK (temporal_kind IN ('ATEMPORAL', 'STATIC', 'DYNAMIC')),
            valid_from          TEXT NOT NULL,
            valid_until         TEXT,
            is_open_interval    INTEGER NOT NULL CHECK (is_open_interval IN (0, 1)),
            confidence          REAL NOT NULL CHECK (confidence BETWEEN 0.0 AND 1.0),
            extracted_at        TEXT NOT NULL,
            invalidated_by      TEXT,
            invalidated_at      TEXT,
            expired_at          TEXT,
            invalidation_reason TEXT,
            CHECK (valid_until IS NULL OR valid_until >= valid_from),
            CHECK ((invalidated_by IS NULL) = (invalidated_at IS NULL)),
            CHECK ((invalidated_by IS NULL) = (expired_at IS NULL)),
            CHECK ((invalidated_by IS NULL) = (invalidation_reason IS NULL)),
            CHECK (invalidated_by IS NULL OR invalidated_by <> id)
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_facts_key
            ON facts(subject_id, predicate_key, extracted_at, id);
        CREATE INDEX IF NOT EXISTS idx_facts_key_active
            ON facts(subject_id, predicate_key, extracted_at, id)
            WHERE invalidated_by IS NULL;
        CREATE INDEX IF NOT EXISTS idx_facts_chunk
            ON facts(source_chunk_id);

        CREATE TABLE IF NOT EXISTS invalidation_edges (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            from_fact_id TEXT NOT NULL REFERENCES facts(id),
            to_fact_id   TEXT NOT NULL REFERENCES facts(id),
            reason       TEXT NOT NULL,
            recorded_at  TEXT NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_edges_from ON invalidation_edges(from_fact_id);
        CREATE INDEX IF NOT EXISTS idx_edges_to ON invalidation_edges(to_fact_id);
        ",
    )
    .map_err(to_store_err)
}
