//! Segment encoding for the four-digit display behind the shift-register cascade.
//!
//! Each digit position owns one byte of the 32-bit frame. Digit 1 (leftmost) sits in the
//! most significant byte so it is shifted out first. Within a byte, bit 0 is segment A
//! through bit 6 for segment G; bit 7 is the decimal point.

/// Seven-segment glyphs for 0-9 (bit 0 = A ... bit 6 = G).
pub const GLYPHS: [u8; 10] = [
    0b_0011_1111, // 0
    0b_0000_0110, // 1
    0b_0101_1011, // 2
    0b_0100_1111, // 3
    0b_0110_0110, // 4
    0b_0110_1101, // 5
    0b_0111_1101, // 6
    0b_0000_0111, // 7
    0b_0111_1111, // 8
    0b_0110_1111, // 9
];

/// Decimal-point bit within a digit byte.
pub const DECIMAL: u8 = 0b_1000_0000;

/// Number of digit positions on the display.
pub const DIGIT_COUNT: usize = 4;

/// Left shift applied to each position's byte, leftmost digit first.
const BYTE_SHIFT: [u32; DIGIT_COUNT] = [24, 16, 8, 0];

/// Decimal point between the minute digits and the seconds (upper colon dot).
pub const TOP_DP: u32 = (DECIMAL as u32) << BYTE_SHIFT[1];
/// Decimal point after the tens-of-seconds digit (lower colon dot).
pub const BOTTOM_DP: u32 = (DECIMAL as u32) << BYTE_SHIFT[2];

/// Every mask for every (position, value) pair; the only place that knows the wiring.
pub const SEGMENT_TABLE: [[u32; 10]; DIGIT_COUNT] = build_table();

#[expect(
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    reason = "Loop bounds come from the array lengths"
)]
const fn build_table() -> [[u32; 10]; DIGIT_COUNT] {
    let mut table = [[0_u32; 10]; DIGIT_COUNT];
    let mut position = 0;
    while position < DIGIT_COUNT {
        let mut value = 0;
        while value < GLYPHS.len() {
            table[position][value] = (GLYPHS[value] as u32) << BYTE_SHIFT[position];
            value += 1;
        }
        position += 1;
    }
    table
}

/// A single decimal digit, 0-9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Digit(u8);

impl Digit {
    /// Returns `None` unless `value` is 0-9.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value < 10 { Some(Self(value)) } else { None }
    }

    /// The last decimal digit of `value`.
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        clippy::arithmetic_side_effects,
        clippy::cast_possible_truncation,
        reason = "Remainder by 10 always fits in u8"
    )]
    pub const fn from_units(value: u64) -> Self {
        Self((value % 10) as u8)
    }

    /// The digit as a number.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Physical digit position, numbered 1 (leftmost) to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitPosition {
    /// Tens of minutes.
    First = 1,
    /// Units of minutes.
    Second = 2,
    /// Tens of seconds.
    Third = 3,
    /// Units of seconds.
    Fourth = 4,
}

impl DigitPosition {
    /// All positions, left to right.
    pub const ALL: [Self; DIGIT_COUNT] = [Self::First, Self::Second, Self::Third, Self::Fourth];

    /// Returns `None` unless `position` is 1-4.
    #[must_use]
    pub const fn new(position: u8) -> Option<Self> {
        match position {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            4 => Some(Self::Fourth),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
            Self::Fourth => 3,
        }
    }
}

/// Segment mask that lights `digit` at `position`.
#[must_use]
#[expect(
    clippy::indexing_slicing,
    reason = "Digit and DigitPosition only hold in-range values"
)]
pub const fn encode_digit(digit: Digit, position: DigitPosition) -> u32 {
    SEGMENT_TABLE[position.index()][digit.0 as usize]
}
