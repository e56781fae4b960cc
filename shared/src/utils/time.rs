//! Time-related utilities

use chrono::{DateTime, Utc};

/// Milliseconds elapsed between `since` and `now`, clamped at zero when the
/// clock moved backwards.
pub fn elapsed_millis(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    now.signed_duration_since(since)
        .num_milliseconds()
        .max(0) as u64
}
