//! Fact row insert, lookup and lifecycle update.

use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};

use factgraph_core::errors::{StoreError, ValidationError};
use factgraph_core::models::{
    AtomicFact, FactId, FactKey, FactState, Invalidation, InvalidationReason, NewFact,
};
use factgraph_core::traits::FactScope;
use factgraph_core::{FactGraphError, FactGraphResult};

use super::{parse_ts, ts};
use crate::to_store_err;

const FACT_COLUMNS: &str = "id, subject, predicate, object, source_chunk_id, source_text,
    fact_kind, temporal_kind, valid_from, valid_until, is_open_interval, confidence,
    extracted_at, invalidated_by, invalidated_at, expired_at, invalidation_reason";

/// Raw row, decoded into an `AtomicFact` outside the rusqlite callback.
struct FactRow {
    id: String,
    subject: String,
    predicate: String,
    object: String,
    source_chunk_id: String,
    source_text: String,
    fact_kind: String,
    temporal_kind: String,
    valid_from: String,
    valid_until: Option<String>,
    is_open_interval: bool,
    confidence: f64,
    extracted_at: String,
    invalidated_by: Option<String>,
    invalidated_at: Option<String>,
    expired_at: Option<String>,
    invalidation_reason: Option<String>,
}

impl FactRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            subject: row.get(1)?,
            predicate: row.get(2)?,
            object: row.get(3)?,
            source_chunk_id: row.get(4)?,
            source_text: row.get(5)?,
            fact_kind: row.get(6)?,
            temporal_kind: row.get(7)?,
            valid_from: row.get(8)?,
            valid_until: row.get(9)?,
            is_open_interval: row.get(10)?,
            confidence: row.get(11)?,
            extracted_at: row.get(12)?,
            invalidated_by: row.get(13)?,
            invalidated_at: row.get(14)?,
            expired_at: row.get(15)?,
            invalidation_reason: row.get(16)?,
        })
    }

    fn into_fact(self) -> FactGraphResult<AtomicFact> {
        let fact_id = self.id.clone();
        let corrupt = |reason: String| {
            FactGraphError::Store(StoreError::CorruptRow {
                fact_id: fact_id.clone(),
                reason,
            })
        };
        let time = |field: &str, value: &str| {
            parse_ts(value).map_err(|e| corrupt(format!("{field}: {e}")))
        };

        let id = FactId::from_str(&self.id).map_err(|e| corrupt(format!("id: {e}")))?;
        let source_chunk_id = uuid::Uuid::parse_str(&self.source_chunk_id)
            .map_err(|e| corrupt(format!("source_chunk_id: {e}")))?;
        let valid_until = self
            .valid_until
            .as_deref()
            .map(|v| time("valid_until", v))
            .transpose()?;

        let state = match (
            self.invalidated_by,
            self.invalidated_at,
            self.expired_at,
            self.invalidation_reason,
        ) {
            (None, None, None, None) => FactState::Active,
            (Some(by), Some(at), Some(expired_at), Some(reason)) => {
                FactState::Invalidated(Invalidation {
                    by: FactId::from_str(&by)
                        .map_err(|e| corrupt(format!("invalidated_by: {e}")))?,
                    at: time("invalidated_at", &at)?,
                    expired_at: time("expired_at", &expired_at)?,
                    reason: InvalidationReason::from_str(&reason)
                        .map_err(|e| corrupt(e.to_string()))?,
                })
            }
            _ => return Err(corrupt("partial lifecycle fields".to_string())),
        };

        let new = NewFact {
            id,
            subject: self.subject,
            predicate: self.predicate,
            object: self.object,
            source_chunk_id,
            source_text: self.source_text,
            fact_kind: self.fact_kind.parse().map_err(|e: ValidationError| corrupt(e.to_string()))?,
            temporal_kind: self
                .temporal_kind
                .parse()
                .map_err(|e: ValidationError| corrupt(e.to_string()))?,
            valid_from: time("valid_from", &self.valid_from)?,
            valid_until,
            is_open_interval: self.is_open_interval,
            confidence: self.confidence,
            extracted_at: time("extracted_at", &self.extracted_at)?,
        };
        AtomicFact::restore(new, state).map_err(|e| corrupt(e.to_string()))
    }
}

/// Insert a fact row. A primary-key clash is reported as `DuplicateFactId`.
pub fn insert_fact(conn: &Connection, fact: &AtomicFact) -> FactGraphResult<()> {
    let core = fact.core();
    let inv = fact.invalidation();
    let result = conn.execute(
        "INSERT INTO facts (
            id, subject, predicate, object, subject_id, predicate_key, object_id,
            source_chunk_id, source_text, fact_kind, temporal_kind, valid_from,
            valid_until, is_open_interval, confidence, extracted_at,
            invalidated_by, invalidated_at, expired_at, invalidation_reason
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                   ?17, ?18, ?19, ?20)",
        params![
            fact.id().to_string(),
            core.subject(),
            core.predicate(),
            core.object(),
            core.subject_id().to_string(),
            core.key().predicate,
            core.object_id().to_string(),
            core.source_chunk_id().to_string(),
            core.source_text(),
            core.fact_kind().as_str(),
            core.temporal_kind().as_str(),
            ts(core.valid_from()),
            fact.valid_until().map(ts),
            core.is_open_interval(),
            core.confidence().value(),
            ts(core.extracted_at()),
            inv.map(|i| i.by.to_string()),
            inv.map(|i| ts(i.at)),
            inv.map(|i| ts(i.expired_at)),
            inv.map(|i| i.reason.as_str()),
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if matches!(
                err.extended_code,
                rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            ) =>
        {
            Err(ValidationError::DuplicateFactId {
                fact_id: fact.id().to_string(),
            }
            .into())
        }
        Err(e) => Err(to_store_err(e)),
    }
}

pub fn get_fact(conn: &Connection, id: FactId) -> FactGraphResult<Option<AtomicFact>> {
    let row = conn
        .query_row(
            &format!("SELECT {FACT_COLUMNS} FROM facts WHERE id = ?1"),
            params![id.to_string()],
            FactRow::from_row,
        )
        .optional()
        .map_err(to_store_err)?;
    row.map(FactRow::into_fact).transpose()
}

pub fn facts_by_key(
    conn: &Connection,
    key: &FactKey,
    scope: FactScope,
) -> FactGraphResult<Vec<AtomicFact>> {
    let filter = match scope {
        FactScope::Active => " AND invalidated_by IS NULL",
        FactScope::History => "",
    };
    let sql = format!(
        "SELECT {FACT_COLUMNS} FROM facts
         WHERE subject_id = ?1 AND predicate_key = ?2{filter}
         ORDER BY extracted_at, id"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(to_store_err)?;
    let rows = stmt
        .query_map(
            params![key.subject_id.to_string(), key.predicate],
            FactRow::from_row,
        )
        .map_err(to_store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_store_err)?;
    rows.into_iter().map(FactRow::into_fact).collect()
}

/// Write the lifecycle columns of `next`, only if the stored row is still
/// active. Returns the number of rows changed (0 or 1).
pub fn write_lifecycle(conn: &Connection, next: &AtomicFact) -> FactGraphResult<usize> {
    let inv = next
        .invalidation()
        .ok_or_else(|| FactGraphError::ConcurrencyError(format!(
            "lifecycle write for active fact {}",
            next.id()
        )))?;
    conn.execute(
        "UPDATE facts
         SET invalidated_by = ?2, invalidated_at = ?3, expired_at = ?4,
             valid_until = ?5, invalidation_reason = ?6
         WHERE id = ?1 AND invalidated_by IS NULL",
        params![
            next.id().to_string(),
            inv.by.to_string(),
            ts(inv.at),
            ts(inv.expired_at),
            next.valid_until().map(ts),
            inv.reason.as_str(),
        ],
    )
    .map_err(to_store_err)
}

pub fn count_facts(conn: &Connection) -> FactGraphResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM facts", [], |row| row.get(0))
        .map_err(to_store_err)?;
    Ok(count as usize)
}
