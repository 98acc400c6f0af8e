//! Datetime helpers isolated for reusability.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Get the current timezone-aware UTC datetime.
///
/// All completion timestamps and defaults go through this function so the
/// whole system agrees on UTC.
pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a request-supplied timestamp value.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`), a naive datetime
/// (`2024-05-01T10:00:00`, interpreted as UTC), or a bare date
/// (`2024-05-01`, interpreted as midnight UTC).
///
/// Returns `None` when the value matches none of these shapes.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ndt));
    }

    parse_date(raw)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

/// Parse a bare `YYYY-MM-DD` date value.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
