//! Timestamp and duration utilities

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Convert milliseconds to fractional seconds
///
/// Search backends report track lengths in milliseconds while song entries
/// carry seconds.
pub fn millis_to_secs(millis: u64) -> f64 {
    millis as f64 / 1000.0
}

/// Convert fractional seconds to a duration
///
/// Returns `None` for zero, negative, NaN or infinite input, none of which
/// can be scheduled.
pub fn secs_to_duration(secs: f64) -> Option<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}
