//! Unix timestamp type shared by the countdown target, the wall clock and NTP.

use time::{OffsetDateTime, UtcOffset};

/// Units-safe wrapper for Unix timestamps (seconds since 1970-01-01 00:00:00 UTC)
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnixSeconds(pub i64);

impl UnixSeconds {
    /// Get the underlying i64 value
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Convert NTP seconds (since 1900-01-01) to Unix seconds (since 1970-01-01)
    #[must_use]
    pub const fn from_ntp_seconds(ntp: u32) -> Option<Self> {
        // 1900→1970 offset: 70 years * 365.25 days/year * 86400 seconds/day
        const NTP_TO_UNIX_SECONDS: i64 = 2_208_988_800;
        #[expect(clippy::arithmetic_side_effects, reason = "u32 minus constant fits in i64")]
        let seconds = (ntp as i64) - NTP_TO_UNIX_SECONDS;
        // Reject negative (pre-1970)
        if seconds >= 0 { Some(Self(seconds)) } else { None }
    }

    /// Seconds between two timestamps, whichever is later.
    #[must_use]
    pub const fn abs_diff(self, other: Self) -> u64 {
        self.0.abs_diff(other.0)
    }

    /// Move forward by `seconds`, saturating at the end of the range.
    #[must_use]
    pub fn saturating_add_secs(self, seconds: u64) -> Self {
        Self(self.0.saturating_add(i64::try_from(seconds).unwrap_or(i64::MAX)))
    }

    /// Convert to OffsetDateTime with the given timezone offset
    #[must_use]
    pub fn to_offset_datetime(self, offset: UtcOffset) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.as_i64())
            .ok()
            .map(|dt| dt.to_offset(offset))
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn ntp_epoch_maps_to_unix() {
        assert_eq!(UnixSeconds::from_ntp_seconds(2_208_988_800), Some(UnixSeconds(0)));
        assert_eq!(UnixSeconds::from_ntp_seconds(1), None);
    }

    #[test]
    fn abs_diff_ignores_order() {
        let earlier = UnixSeconds(1_000);
        let later = UnixSeconds(1_010);
        assert_eq!(earlier.abs_diff(later), 10);
        assert_eq!(later.abs_diff(earlier), 10);
        assert_eq!(UnixSeconds(-5).abs_diff(UnixSeconds(5)), 10);
    }

    #[test]
    fn saturating_add_clamps() {
        assert_eq!(UnixSeconds(1).saturating_add_secs(2), UnixSeconds(3));
        assert_eq!(UnixSeconds(1).saturating_add_secs(u64::MAX), UnixSeconds(i64::MAX));
    }
}
