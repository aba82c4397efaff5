//! Invalidation edge insert and lookup.

use std::str::FromStr;

use rusqlite::{params, Connection};

use factgraph_core::errors::StoreError;
use factgraph_core::models::{FactId, InvalidationEdge, InvalidationReason};
use factgraph_core::{FactGraphError, FactGraphResult};

use super::{parse_ts, ts};
use crate::to_store_err;

pub fn insert_edge(conn: &Connection, edge: &InvalidationEdge) -> FactGraphResult<()> {
    conn.execute(
        "INSERT INTO invalidation_edges (from_fact_id, to_fact_id, reason, recorded_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            edge.from_fact_id.to_string(),
            edge.to_fact_id.to_string(),
            edge.reason.as_str(),
            ts(edge.recorded_at),
        ],
    )
    .map_err(to_store_err)?;
    Ok(())
}

pub fn edges_from(conn: &Connection, id: FactId) -> FactGraphResult<Vec<InvalidationEdge>> {
    select_edges(conn, "from_fact_id", id)
}

pub fn edges_to(conn: &Connection, id: FactId) -> FactGraphResult<Vec<InvalidationEdge>> {
    select_edges(conn, "to_fact_id", id)
}

fn select_edges(
    conn: &Connection,
    column: &str,
    id: FactId,
) -> FactGraphResult<Vec<InvalidationEdge>> {
    let sql = format!(
        "SELECT from_fact_id, to_fact_id, reason, recorded_at
         FROM invalidation_edges WHERE {column} = ?1 ORDER BY id"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(to_store_err)?;
    let rows = stmt
        .query_map(params![id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(to_store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_store_err)?;

    rows.into_iter()
        .map(|(from, to, reason, recorded_at)| {
            let corrupt = |reason: String| {
                FactGraphError::Store(StoreError::CorruptRow {
                    fact_id: from.clone(),
                    reason,
                })
            };
            Ok(InvalidationEdge {
                from_fact_id: FactId::from_str(&from).map_err(|e| corrupt(e.to_string()))?,
                to_fact_id: FactId::from_str(&to).map_err(|e| corrupt(e.to_string()))?,
                reason: InvalidationReason::from_str(&reason)
                    .map_err(|e| corrupt(e.to_string()))?,
                recorded_at: parse_ts(&recorded_at).map_err(|e| corrupt(e.to_string()))?,
            })
        })
        .collect()
}
