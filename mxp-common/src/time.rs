//! Timestamp utilities

use chrono::{DateTime, TimeZone, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time as unix seconds
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Unix seconds → `DateTime<Utc>`, `None` when out of range
pub fn from_unix(seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0).single()
}

/// Compact `YYYYMMDDHHMMSS` stamp used in export filenames
pub fn format_ymdhms(seconds: i64) -> String {
    from_unix(seconds)
        .map(|dt| dt.format("%Y%m%d%H%M%S").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

/// `YYYY-MM-DDTHH:MM:SS`
pub fn to_iso_datetime(seconds: i64) -> Option<String> {
    from_unix(seconds).map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// `YYYY-MM-DD`
pub fn to_iso_date(seconds: i64) -> Option<String> {
    from_unix(seconds).map(|dt| dt.format("%Y-%m-%d").to_string())
}
