//! SQL for the fact store, one module per table.

pub mod edge_ops;
pub mod fact_ops;

use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 so text comparison matches time order.
pub(crate) fn ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_ts(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|t| t.with_timezone(&Utc))
}
