//! Wall-clock sources for rate windows.
//!
//! Rate records outlive the process, so time is tracked as unix seconds
//! rather than as monotonic instants.

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;

/// Source of the current time in unix seconds.
pub trait Clock: Send + Sync + Debug {
    fn now_unix(&self) -> i64;
}

/// System clock backed by `OffsetDateTime::now_utc()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }
}

/// Manually driven clock for deterministic tests.
///
/// Clones share the same time value.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_unix: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_unix)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let seconds = i64::try_from(by.as_secs()).unwrap_or(i64::MAX);
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn set(&self, unix: i64) {
        self.now.store(unix, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_unix() > 1_577_836_800);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(1_000);
        let shared = clock.clone();

        shared.advance(Duration::from_secs(61));
        assert_eq!(clock.now_unix(), 1_061);

        clock.set(5);
        assert_eq!(shared.now_unix(), 5);
    }
}
