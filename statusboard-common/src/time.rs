//! Timestamp utilities

use chrono::{DateTime, Duration, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Time elapsed since `timestamp` (negative if it lies in the future)
pub fn age(timestamp: DateTime<Utc>) -> Duration {
    now() - timestamp
}
