//! Splits a magnitude in seconds into the four MM:SS display digits.

use time::UtcOffset;

use crate::segments::Digit;
use crate::unix_seconds::UnixSeconds;

/// The four digits shown on the display, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeDigits {
    pub tens_minutes: Digit,
    pub units_minutes: Digit,
    pub tens_seconds: Digit,
    pub units_seconds: Digit,
}

impl TimeDigits {
    /// Decompose `magnitude` seconds into MM:SS digits. Minutes above 99 wrap.
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        clippy::arithmetic_side_effects,
        reason = "Division and remainder by non-zero constants"
    )]
    pub const fn decompose(magnitude: u64) -> Self {
        let seconds = magnitude % 60;
        let minutes = magnitude / 60;
        Self {
            tens_minutes: Digit::from_units((minutes % 100) / 10),
            units_minutes: Digit::from_units(minutes),
            tens_seconds: Digit::from_units((seconds % 100) / 10),
            units_seconds: Digit::from_units(seconds),
        }
    }

    /// Minutes and seconds of the current hour in local time.
    ///
    /// Minutes can differ from UTC when the offset is not a whole number of hours.
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        clippy::arithmetic_side_effects,
        reason = "Euclidean remainder by 3600 is always in 0..3600"
    )]
    pub fn time_of_day(now: UnixSeconds, offset: UtcOffset) -> Self {
        let second_of_hour = now.to_offset_datetime(offset).map_or_else(
            || (now.as_i64() + i64::from(offset.whole_seconds())).rem_euclid(3600),
            |local| i64::from(local.minute()) * 60 + i64::from(local.second()),
        );
        Self::decompose(second_of_hour.unsigned_abs())
    }

    /// The digits left to right.
    #[must_use]
    pub const fn as_array(&self) -> [Digit; 4] {
        [
            self.tens_minutes,
            self.units_minutes,
            self.tens_seconds,
            self.units_seconds,
        ]
    }

    /// The value these digits spell, in seconds (`MM * 60 + SS`).
    #[must_use]
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "At most 99 * 60 + 59"
    )]
    pub const fn total_seconds(&self) -> u64 {
        let minutes = self.tens_minutes.value() as u64 * 10 + self.units_minutes.value() as u64;
        let seconds = self.tens_seconds.value() as u64 * 10 + self.units_seconds.value() as u64;
        minutes * 60 + seconds
    }
}
