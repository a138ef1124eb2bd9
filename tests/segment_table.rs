//! Host-level tests for the segment table and frame composition.

use shift_countdown::display_frame::{DisplayFrame, Indicators};
use shift_countdown::segments::{BOTTOM_DP, Digit, DigitPosition, SEGMENT_TABLE, TOP_DP, encode_digit};
use shift_countdown::time_digits::TimeDigits;

fn all_masks() -> impl Iterator<Item = (DigitPosition, u8, u32)> {
    DigitPosition::ALL.into_iter().flat_map(|position| {
        (0..10).map(move |value| {
            let digit = Digit::new(value).unwrap();
            (position, value, encode_digit(digit, position))
        })
    })
}

#[test]
fn masks_are_distinct_within_a_position() {
    for position in DigitPosition::ALL {
        let masks: Vec<u32> = (0..10)
            .map(|value| encode_digit(Digit::new(value).unwrap(), position))
            .collect();
        for (index, mask) in masks.iter().enumerate() {
            assert!(
                !masks[index + 1..].contains(mask),
                "duplicate mask {mask:#010x} at {position:?}"
            );
        }
    }
}

#[test]
fn positions_never_overlap() {
    let footprint = |position: DigitPosition| {
        all_masks()
            .filter(|(p, _, _)| *p == position)
            .fold(0_u32, |acc, (_, _, mask)| acc | mask)
    };
    for (index, first) in DigitPosition::ALL.into_iter().enumerate() {
        for second in DigitPosition::ALL.into_iter().skip(index + 1) {
            assert_eq!(footprint(first) & footprint(second), 0, "{first:?} overlaps {second:?}");
        }
    }
}

#[test]
fn masks_leave_indicator_bits_alone() {
    for (position, value, mask) in all_masks() {
        assert_eq!(mask & (TOP_DP | BOTTOM_DP), 0, "{value} at {position:?} touches an indicator");
        assert_ne!(mask, 0);
    }
}

#[test]
fn table_matches_encoder() {
    for (position, value, mask) in all_masks() {
        let row = position as usize - 1;
        assert_eq!(SEGMENT_TABLE[row][usize::from(value)], mask);
    }
}

#[test]
fn frame_is_or_of_digit_masks() {
    let digits = TimeDigits::decompose(59 * 60 + 7);
    let expected = digits
        .as_array()
        .into_iter()
        .zip(DigitPosition::ALL)
        .fold(0, |acc, (digit, position)| acc | encode_digit(digit, position));
    assert_eq!(DisplayFrame::from_digits(&digits).bits(), expected);
    assert_eq!(
        (DisplayFrame::from_digits(&digits) | Indicators::TOP).bits(),
        expected | TOP_DP
    );
}
