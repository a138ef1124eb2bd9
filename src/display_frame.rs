//! The 32-bit value latched into the shift-register cascade.

use core::ops::BitOr;

use crate::segments::{BOTTOM_DP, Digit, DigitPosition, TOP_DP, encode_digit};
use crate::time_digits::TimeDigits;

/// Decimal points used as mode and blink indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Indicators(u32);

impl Indicators {
    pub const TOP: Self = Self(TOP_DP);
    pub const BOTTOM: Self = Self(BOTTOM_DP);
    pub const BOTH: Self = Self(TOP_DP | BOTTOM_DP);

    /// The frame bits these indicators occupy.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

/// One complete frame: every segment of every digit, MSB shifted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayFrame(u32);

impl DisplayFrame {
    /// All segments off.
    pub const BLANK: Self = Self(0);

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// OR together the masks for each digit at its position.
    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        clippy::arithmetic_side_effects,
        reason = "Both arrays have four entries and index stays below four"
    )]
    pub const fn from_digits(digits: &TimeDigits) -> Self {
        let digits = digits.as_array();
        let mut bits = 0;
        let mut index = 0;
        while index < DigitPosition::ALL.len() {
            bits |= encode_digit(digits[index], DigitPosition::ALL[index]);
            index += 1;
        }
        Self(bits)
    }

    /// The power-on test pattern: position *n* shows *n - 1*, i.e. `0123`.
    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        clippy::arithmetic_side_effects,
        reason = "index stays below four"
    )]
    pub const fn boot_pattern() -> Self {
        let mut bits = 0;
        let mut index = 0;
        while index < DigitPosition::ALL.len() {
            bits |= encode_digit(Digit::from_units(index as u64), DigitPosition::ALL[index]);
            index += 1;
        }
        Self(bits)
    }

    /// This frame with `indicators` lit.
    #[must_use]
    pub const fn with(self, indicators: Indicators) -> Self {
        Self(self.0 | indicators.0)
    }

    /// This frame with `indicators` cleared.
    #[must_use]
    pub const fn without(self, indicators: Indicators) -> Self {
        Self(self.0 & !indicators.0)
    }

    /// Value of bit `index` (0 = least significant).
    #[must_use]
    pub const fn bit(self, index: u32) -> bool {
        match self.0.checked_shr(index) {
            Some(shifted) => shifted & 1 == 1,
            None => false,
        }
    }
}

impl BitOr<Indicators> for DisplayFrame {
    type Output = Self;

    fn bitor(self, indicators: Indicators) -> Self {
        self.with(indicators)
    }
}
