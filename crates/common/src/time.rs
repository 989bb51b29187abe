//! Safe wall-clock helpers. A clock set before the UNIX epoch must never
//! panic the pipeline; detections just get a zero timestamp.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current Unix timestamp in seconds, or 0 with a warning when the system
/// clock is before the epoch.
pub fn safe_unix_timestamp() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs(),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "system clock is before the UNIX epoch, using timestamp 0"
            );
            0
        }
    }
}

/// Duration since the UNIX epoch, with a zero fallback.
pub fn safe_unix_duration() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_recent() {
        // After 2023.
        assert!(safe_unix_timestamp() > 1_700_000_000);
    }

    #[test]
    fn duration_is_nonzero() {
        assert!(safe_unix_duration() > Duration::ZERO);
    }
}
