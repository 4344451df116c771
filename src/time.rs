//! Time utilities for persisted timestamps.
//!
//! All persisted timestamps (`created_at`, `last_message_at`, mission dates)
//! are RFC 3339 strings in UTC, matching the original storage layout. RFC 3339
//! UTC strings sort lexicographically in chronological order, so collection
//! sorting is a plain string comparison.

use chrono::{SecondsFormat, Utc};

/// Returns the current time as an RFC 3339 string (millisecond precision, UTC).
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Returns the current Unix timestamp in milliseconds.
pub fn now_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}
