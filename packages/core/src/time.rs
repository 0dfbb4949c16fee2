//! Wall-clock helpers for freshness timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as milliseconds since the Unix epoch.
///
/// Returns 0 if the system clock reports a time before the epoch, so
/// callers never have to handle a clock error on this path.
#[must_use]
pub fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_after_2020() {
        // 2020-01-01T00:00:00Z in millis.
        assert!(unix_millis_now() > 1_577_836_800_000);
    }

    #[test]
    fn now_is_monotonic_enough() {
        let a = unix_millis_now();
        let b = unix_millis_now();
        assert!(b >= a);
    }
}
