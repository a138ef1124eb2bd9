//! Decides what the control loop latches on each tick.
//!
//! Kept free of timers and pins so the blink and indicator rules can be tested on the host.

use time::UtcOffset;

use crate::display_frame::{DisplayFrame, Indicators};
use crate::time_digits::TimeDigits;
use crate::timer::{Mode, Reading};

/// What to do with the shift register this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramePlan {
    /// Emit the frame once.
    Show(DisplayFrame),
    /// Emit `lit`, hold it for the pulse, then emit `settled`.
    Pulse {
        lit: DisplayFrame,
        settled: DisplayFrame,
    },
    /// The latched frame is still correct; emit nothing.
    Hold,
}

/// Turns timer readings into frames, remembering the last countdown magnitude.
#[derive(Debug, Clone)]
pub struct FramePlanner {
    last_magnitude: Option<u64>,
    utc_offset: UtcOffset,
}

impl FramePlanner {
    #[must_use]
    pub const fn new(utc_offset: UtcOffset) -> Self {
        Self {
            last_magnitude: None,
            utc_offset,
        }
    }

    /// Plan the output for `reading`.
    ///
    /// A countdown frame pulses both indicators when its magnitude differs from the previous
    /// countdown frame, and always right after a wall-clock frame.
    pub fn plan(&mut self, reading: Reading) -> FramePlan {
        match reading {
            Reading::Stopwatch { mode, magnitude } => {
                self.last_magnitude = None;
                let frame = DisplayFrame::from_digits(&TimeDigits::decompose(magnitude));
                FramePlan::Show(frame.with(stopwatch_indicators(mode)))
            }
            Reading::Countdown { magnitude, .. } => {
                if self.last_magnitude == Some(magnitude) {
                    return FramePlan::Hold;
                }
                self.last_magnitude = Some(magnitude);
                let settled = DisplayFrame::from_digits(&TimeDigits::decompose(magnitude));
                FramePlan::Pulse {
                    lit: settled.with(Indicators::BOTH),
                    settled,
                }
            }
            Reading::TimeOfDay(now) => {
                self.last_magnitude = None;
                FramePlan::Show(DisplayFrame::from_digits(&TimeDigits::time_of_day(
                    now,
                    self.utc_offset,
                )))
            }
        }
    }
}

/// One indicator per direction; both while stopped.
#[must_use]
pub const fn stopwatch_indicators(mode: Mode) -> Indicators {
    match mode {
        Mode::CountingDown => Indicators::TOP,
        Mode::CountingUp => Indicators::BOTTOM,
        Mode::Idle => Indicators::BOTH,
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;
    use crate::unix_seconds::UnixSeconds;

    fn countdown(magnitude: u64) -> Reading {
        Reading::Countdown {
            mode: Mode::CountingDown,
            magnitude,
        }
    }

    #[test]
    fn countdown_pulses_only_on_change() {
        let mut planner = FramePlanner::new(UtcOffset::UTC);
        let first = planner.plan(countdown(10));
        let FramePlan::Pulse { lit, settled } = first else {
            panic!("expected a pulse, got {first:?}");
        };
        assert_eq!(lit, settled | Indicators::BOTH);
        assert_eq!(settled, DisplayFrame::from_digits(&TimeDigits::decompose(10)));

        assert_eq!(planner.plan(countdown(10)), FramePlan::Hold);
        assert!(matches!(planner.plan(countdown(9)), FramePlan::Pulse { .. }));
    }

    #[test]
    fn clock_frame_forces_next_countdown_pulse() {
        let mut planner = FramePlanner::new(UtcOffset::UTC);
        assert!(matches!(planner.plan(countdown(10)), FramePlan::Pulse { .. }));
        assert!(matches!(
            planner.plan(Reading::TimeOfDay(UnixSeconds(0))),
            FramePlan::Show(_)
        ));
        assert!(matches!(planner.plan(countdown(10)), FramePlan::Pulse { .. }));
    }

    #[test]
    fn stopwatch_indicators_follow_mode() {
        let mut planner = FramePlanner::new(UtcOffset::UTC);
        let digits = DisplayFrame::from_digits(&TimeDigits::decompose(300));
        for (mode, indicators) in [
            (Mode::CountingDown, Indicators::TOP),
            (Mode::CountingUp, Indicators::BOTTOM),
            (Mode::Idle, Indicators::BOTH),
        ] {
            assert_eq!(
                planner.plan(Reading::Stopwatch { mode, magnitude: 300 }),
                FramePlan::Show(digits | indicators)
            );
        }
    }
}
