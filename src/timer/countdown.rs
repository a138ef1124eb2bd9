use embassy_time::Duration;

use super::{Command, Mode, Reading, TimerMachine};
use crate::unix_seconds::UnixSeconds;

/// Counts toward a target instant and keeps counting up once it passes.
///
/// While inactive the display falls back to the wall clock. The target survives `Reset`,
/// but only `SetTarget` re-activates the countdown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Countdown {
    target: UnixSeconds,
    active: bool,
}

impl Countdown {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            target: UnixSeconds(0),
            active: false,
        }
    }

    #[must_use]
    pub const fn target(&self) -> UnixSeconds {
        self.target
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Direction relative to `now`: down while the target is ahead.
    #[must_use]
    pub fn mode(&self, now: UnixSeconds) -> Mode {
        if now < self.target {
            Mode::CountingDown
        } else {
            Mode::CountingUp
        }
    }
}

impl TimerMachine for Countdown {
    const PERIOD: Duration = Duration::from_millis(100);

    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::SetTarget(target) => {
                self.target = target;
                self.active = true;
            }
            Command::Reset => self.active = false,
            Command::Start | Command::Stop => return false,
        }
        true
    }

    fn reading(&self, now: UnixSeconds) -> Reading {
        if self.active {
            Reading::Countdown {
                mode: self.mode(now),
                magnitude: self.target.abs_diff(now),
            }
        } else {
            Reading::TimeOfDay(now)
        }
    }

    // Magnitude is recomputed from the wall clock on every reading.
    fn advance(&mut self) {}
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn inactive_shows_time_of_day() {
        let countdown = Countdown::new();
        assert_eq!(
            countdown.reading(UnixSeconds(1_000)),
            Reading::TimeOfDay(UnixSeconds(1_000))
        );
    }

    #[test]
    fn reset_keeps_target() {
        let mut countdown = Countdown::new();
        countdown.apply(Command::SetTarget(UnixSeconds(2_000)));
        assert!(countdown.apply(Command::Reset));
        assert!(!countdown.is_active());
        assert_eq!(countdown.target(), UnixSeconds(2_000));
    }

    #[test]
    fn start_and_stop_are_ignored() {
        let mut countdown = Countdown::new();
        countdown.apply(Command::SetTarget(UnixSeconds(2_000)));
        assert!(!countdown.apply(Command::Stop));
        assert!(!countdown.apply(Command::Start));
        assert!(countdown.is_active());
    }

    #[test]
    fn target_reached_counts_up() {
        let mut countdown = Countdown::new();
        countdown.apply(Command::SetTarget(UnixSeconds(2_000)));
        assert_eq!(
            countdown.reading(UnixSeconds(2_000)),
            Reading::Countdown {
                mode: Mode::CountingUp,
                magnitude: 0
            }
        );
    }
}
