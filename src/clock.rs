//! Wall-clock helper for stopwatch timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::BackendError;

/// Current wall-clock time as whole seconds since the UNIX epoch.
///
/// Whole-second resolution is deliberate: it matches the persisted layout
/// (string-encoded epoch seconds) and the resolution responses are
/// rendered at.
pub fn unix_now_secs() -> Result<u64, BackendError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| BackendError::ClockSkew)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(unix_now_secs().unwrap() > 1_577_836_800);
    }
}
