//! ISO-8601 timestamp helpers for persisted records

use chrono::{DateTime, SecondsFormat, Utc};

/// Render a timestamp as fixed-width RFC 3339 UTC with nanoseconds.
///
/// Fixed width keeps lexicographic order equal to chronological order.
pub fn to_iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse any RFC 3339 timestamp, normalising the offset to UTC
pub fn parse_iso(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
