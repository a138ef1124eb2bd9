use embassy_time::Duration;

use super::{Command, Mode, Reading, TimerMachine};
use crate::unix_seconds::UnixSeconds;

/// Direction of travel, remembered while the stopwatch is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Direction {
    Down,
    Up,
}

/// Counts down from a fixed duration, then reverses into counting up.
///
/// Starts stopped at the full duration. `Start`/`Stop` gate the counting;
/// `Reset` restores the duration and the downward direction without touching the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stopwatch {
    duration: u64,
    magnitude: u64,
    direction: Direction,
    counting: bool,
}

impl Stopwatch {
    #[must_use]
    pub const fn new(duration_seconds: u64) -> Self {
        Self {
            duration: duration_seconds,
            magnitude: duration_seconds,
            direction: Direction::Down,
            counting: false,
        }
    }

    #[must_use]
    pub const fn magnitude(&self) -> u64 {
        self.magnitude
    }

    #[must_use]
    pub const fn is_counting(&self) -> bool {
        self.counting
    }

    /// [`Mode::Idle`] while stopped, otherwise the direction of travel.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        match (self.counting, self.direction) {
            (false, _) => Mode::Idle,
            (true, Direction::Down) => Mode::CountingDown,
            (true, Direction::Up) => Mode::CountingUp,
        }
    }
}

impl TimerMachine for Stopwatch {
    const PERIOD: Duration = Duration::from_secs(1);

    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.counting = true,
            Command::Stop => self.counting = false,
            Command::Reset => {
                self.magnitude = self.duration;
                self.direction = Direction::Down;
            }
            Command::SetTarget(_) => return false,
        }
        true
    }

    fn reading(&self, _now: UnixSeconds) -> Reading {
        Reading::Stopwatch {
            mode: self.mode(),
            magnitude: self.magnitude,
        }
    }

    fn advance(&mut self) {
        if !self.counting {
            return;
        }
        match self.direction {
            Direction::Down => {
                self.magnitude = self.magnitude.saturating_sub(1);
                if self.magnitude == 0 {
                    self.direction = Direction::Up;
                }
            }
            Direction::Up => self.magnitude = self.magnitude.saturating_add(1),
        }
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn starts_stopped_at_full_duration() {
        let stopwatch = Stopwatch::new(300);
        assert_eq!(stopwatch.mode(), Mode::Idle);
        assert_eq!(stopwatch.magnitude(), 300);
    }

    #[test]
    fn zero_duration_flips_without_underflow() {
        let mut stopwatch = Stopwatch::new(0);
        stopwatch.apply(Command::Start);
        stopwatch.advance();
        assert_eq!(stopwatch.mode(), Mode::CountingUp);
        assert_eq!(stopwatch.magnitude(), 0);
        stopwatch.advance();
        assert_eq!(stopwatch.magnitude(), 1);
    }

    #[test]
    fn set_target_is_not_a_stopwatch_command() {
        let mut stopwatch = Stopwatch::new(300);
        assert!(!stopwatch.apply(Command::SetTarget(UnixSeconds(5))));
        assert_eq!(stopwatch, Stopwatch::new(300));
    }

    #[test]
    fn stop_remembers_direction() {
        let mut stopwatch = Stopwatch::new(1);
        stopwatch.apply(Command::Start);
        stopwatch.advance();
        stopwatch.apply(Command::Stop);
        assert_eq!(stopwatch.mode(), Mode::Idle);
        stopwatch.apply(Command::Start);
        assert_eq!(stopwatch.mode(), Mode::CountingUp);
    }
}
