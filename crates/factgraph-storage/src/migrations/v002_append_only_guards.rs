//! v002: triggers that keep history append-only.
//!
//! Facts are never deleted, their core columns never change, and lifecycle
//! columns are written once. Invalidation edges are never touched after insert.

use rusqlite::Connection;

use factgraph_core::FactGraphResult;

use crate::to_store_err;

pub fn migrate(conn: &Connection) -> FactGraphResult<()> {
    conn.execute_batch(
        "
        CREATE TRIGGER IF NOT EXISTS trg_facts_no_delete
        BEFORE DELETE ON facts
        BEGIN
            SELECT RAISE(ABORT, 'facts are append-only');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_facts_core_immutable
        BEFORE UPDATE OF id, subject, predicate, object, subject_id, predicate_key,
            object_id, source_chunk_id, source_text, fact_kind, temporal_kind,
            valid_from, is_open_interval, confidence, extracted_at
        ON facts
        BEGIN
            SELECT RAISE(ABORT, 'fact core is immutable');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_facts_lifecycle_once
        BEFORE UPDATE OF invalidated_by, invalidated_at, expired_at, valid_until,
            invalidation_reason
        ON facts
        WHEN OLD.invalidated_by IS NOT NULL
        BEGIN
            SELECT RAISE(ABORT, 'fact already invalidated');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_edges_no_update
        BEFORE UPDATE ON invalidation_edges
        BEGIN
            SELECT RAISE(ABORT, 'invalidation edges are append-only');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_edges_no_delete
        BEFORE DELETE ON invalidation_edges
        BEGIN
            SELECT RAISE(ABORT, 'invalidation edges are append-only');
        END;
        ",
    )
    .map_err(to_store_err)
}
