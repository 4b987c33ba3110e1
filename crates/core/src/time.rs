//! Wall-clock helpers

use chrono::Utc;

/// Current time as milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
