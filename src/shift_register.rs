//! Bit-banged output to a cascade of 74HC595-style shift registers.
//!
//! Three lines drive the cascade: serial data, shift clock and latch (storage) clock.
//! A frame is shifted MSB first while the latch is held low, and only appears on the
//! register outputs on the latch's rising edge, so the display never shows a partial frame.

use embedded_hal::digital::OutputPin;

use crate::display_frame::DisplayFrame;
use crate::{Error, Result};

/// Owns the three output lines of the register cascade.
///
/// Generic over [`OutputPin`] so the same code drives `embassy_rp::gpio::Output` on the
/// board and recording pins in tests.
pub struct ShiftRegister<D, C, L> {
    data: D,
    clock: C,
    latch: L,
}

impl<D, C, L> ShiftRegister<D, C, L>
where
    D: OutputPin,
    C: OutputPin,
    L: OutputPin,
{
    #[must_use]
    pub const fn new(data: D, clock: C, latch: L) -> Self {
        Self { data, clock, latch }
    }

    /// Shift all 32 bits of `frame` out, bit 31 first, then latch them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CannotSetOutputState`] if any line cannot be driven.
    pub fn emit(&mut self, frame: DisplayFrame) -> Result<()> {
        self.latch.set_low().map_err(|_| Error::CannotSetOutputState)?;
        for index in (0..u32::BITS).rev() {
            self.clock.set_low().map_err(|_| Error::CannotSetOutputState)?;
            self.data
                .set_state(frame.bit(index).into())
                .map_err(|_| Error::CannotSetOutputState)?;
            self.clock.set_high().map_err(|_| Error::CannotSetOutputState)?;
        }
        self.latch.set_high().map_err(|_| Error::CannotSetOutputState)?;
        Ok(())
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use core::cell::RefCell;
    use core::convert::Infallible;

    use embedded_hal::digital::{ErrorKind, ErrorType};
    use heapless::Vec;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Line {
        Data,
        Clock,
        Latch,
    }

    type Log = RefCell<Vec<(Line, bool), 128>>;

    struct RecordingPin<'a> {
        line: Line,
        log: &'a Log,
    }

    impl ErrorType for RecordingPin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for RecordingPin<'_> {
        fn set_low(&mut self) -> core::result::Result<(), Infallible> {
            self.log.borrow_mut().push((self.line, false)).unwrap();
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Infallible> {
            self.log.borrow_mut().push((self.line, true)).unwrap();
            Ok(())
        }
    }

    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> core::result::Result<(), ErrorKind> {
            Err(ErrorKind::Other)
        }

        fn set_high(&mut self) -> core::result::Result<(), ErrorKind> {
            Err(ErrorKind::Other)
        }
    }

    fn record(frame: DisplayFrame) -> Vec<(Line, bool), 128> {
        let log = Log::default();
        let mut register = ShiftRegister::new(
            RecordingPin { line: Line::Data, log: &log },
            RecordingPin { line: Line::Clock, log: &log },
            RecordingPin { line: Line::Latch, log: &log },
        );
        register.emit(frame).unwrap();
        log.into_inner()
    }

    /// Data level present at each rising clock edge, in shift order.
    fn shifted_bits(log: &[(Line, bool)]) -> Vec<bool, 32> {
        let mut data = false;
        let mut bits = Vec::new();
        for &(line, level) in log {
            match (line, level) {
                (Line::Data, level) => data = level,
                (Line::Clock, true) => bits.push(data).unwrap(),
                _ => {}
            }
        }
        bits
    }

    #[test]
    fn all_ones_clocks_high_32_times() {
        let log = record(DisplayFrame::from_bits(0xFFFF_FFFF));
        let bits = shifted_bits(&log);
        assert_eq!(bits.len(), 32);
        assert!(bits.iter().all(|&bit| bit));
    }

    #[test]
    fn latch_rises_only_after_last_pulse() {
        let log = record(DisplayFrame::from_bits(0xFFFF_FFFF));
        assert_eq!(log.first(), Some(&(Line::Latch, false)));
        assert_eq!(log.last(), Some(&(Line::Latch, true)));
        let latch_events = log.iter().filter(|(line, _)| *line == Line::Latch).count();
        assert_eq!(latch_events, 2);
        assert_eq!(log[log.len() - 2], (Line::Clock, true));
    }

    #[test]
    fn shifts_most_significant_bit_first() {
        let bits = shifted_bits(&record(DisplayFrame::from_bits(0x8000_0001)));
        assert_eq!(bits.first(), Some(&true));
        assert_eq!(bits.last(), Some(&true));
        assert_eq!(bits.iter().filter(|&&bit| bit).count(), 2);

        let bits = shifted_bits(&record(DisplayFrame::boot_pattern()));
        let mut value = 0_u32;
        for bit in bits {
            value = (value << 1) | u32::from(bit);
        }
        assert_eq!(value, DisplayFrame::boot_pattern().bits());
    }

    #[test]
    fn clock_falls_before_data_changes() {
        let log = record(DisplayFrame::from_bits(0xA5A5_A5A5));
        for step in log[1..log.len() - 1].chunks(3) {
            assert_eq!(step[0], (Line::Clock, false));
            assert_eq!(step[1].0, Line::Data);
            assert_eq!(step[2], (Line::Clock, true));
        }
    }

    #[test]
    fn pin_failure_is_reported() {
        let log = Log::default();
        let mut register = ShiftRegister::new(
            RecordingPin { line: Line::Data, log: &log },
            RecordingPin { line: Line::Clock, log: &log },
            BrokenPin,
        );
        assert!(matches!(
            register.emit(DisplayFrame::BLANK),
            Err(Error::CannotSetOutputState)
        ));
        assert!(log.borrow().is_empty());
    }
}
