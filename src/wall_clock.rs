//! Wall-clock time derived from [`Instant`] plus the most recent NTP sync.
//!
//! Unlike most devices in this crate, [`WallClock`] needs no static resources. It never
//! reads [`Instant::now`] itself; callers pass the instant in, which keeps it host-testable.

use embassy_time::Instant;

use crate::unix_seconds::UnixSeconds;

/// Maps monotonic [`Instant`]s to [`UnixSeconds`].
///
/// Before the first [`set_from_unix`](WallClock::set_from_unix) the clock counts from the
/// Unix epoch at boot.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    base: UnixSeconds,
    base_instant: Instant,
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base: UnixSeconds(0),
            base_instant: Instant::from_ticks(0),
        }
    }

    /// Re-base the clock: `unix_seconds` was correct at instant `at`.
    pub const fn set_from_unix(&mut self, unix_seconds: UnixSeconds, at: Instant) {
        self.base = unix_seconds;
        self.base_instant = at;
    }

    /// Wall-clock time at `instant`. Instants before the sync read as the sync time.
    #[must_use]
    pub fn now_at(&self, instant: Instant) -> UnixSeconds {
        let elapsed = instant.saturating_duration_since(self.base_instant);
        self.base.saturating_add_secs(elapsed.as_secs())
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn counts_from_epoch_before_sync() {
        let clock = WallClock::new();
        assert_eq!(clock.now_at(Instant::from_secs(42)), UnixSeconds(42));
    }

    #[test]
    fn sync_rebases_elapsed_time() {
        let mut clock = WallClock::new();
        clock.set_from_unix(UnixSeconds(1_700_000_000), Instant::from_secs(100));
        assert_eq!(clock.now_at(Instant::from_secs(100)), UnixSeconds(1_700_000_000));
        assert_eq!(clock.now_at(Instant::from_millis(105_900)), UnixSeconds(1_700_000_005));
        assert_eq!(clock.now_at(Instant::from_secs(50)), UnixSeconds(1_700_000_000));
    }
}
