//! Freshness metadata reported by a big segment store.

use serde::{Deserialize, Serialize};

use crate::time::unix_millis_now;

/// When the store's segment data was last known to be current.
///
/// `None` means the store has never been synchronized. Consumers use the
/// timestamp to judge staleness; this crate only supplies the raw value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Unix millis of the last completed synchronization, if any.
    pub last_up_to_date: Option<u64>,
}

impl StoreMetadata {
    /// Metadata stamped with the current wall-clock time.
    #[must_use]
    pub fn up_to_date_now() -> Self {
        Self {
            last_up_to_date: Some(unix_millis_now()),
        }
    }
}
