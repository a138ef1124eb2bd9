//! Timer state machines and the commands that drive them.
//!
//! Two variants share one command set: [`Stopwatch`] counts a fixed duration down, then up;
//! [`Countdown`] measures the distance to a target instant. Either is wrapped in a
//! [`SharedTimer`] so command handlers and the control loop apply whole operations under
//! one lock.

pub mod countdown;
pub mod shared;
pub mod stopwatch;

use embassy_time::Duration;

pub use countdown::Countdown;
pub use shared::{CommandSink, SharedTimer};
pub use stopwatch::Stopwatch;

use crate::unix_seconds::UnixSeconds;

/// Which way the displayed magnitude is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Not advancing.
    #[default]
    Idle,
    /// Magnitude shrinks toward zero (target still ahead).
    CountingDown,
    /// Magnitude grows (target passed).
    CountingUp,
}

/// Remote commands accepted by both variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Start,
    Stop,
    Reset,
    SetTarget(UnixSeconds),
}

/// What the control loop should show this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// Stopwatch magnitude; indicators follow the mode.
    Stopwatch { mode: Mode, magnitude: u64 },
    /// Distance to the countdown target; indicators pulse on change.
    Countdown { mode: Mode, magnitude: u64 },
    /// Inactive countdown: show the wall clock.
    TimeOfDay(UnixSeconds),
}

/// A timer variant the control loop can drive.
pub trait TimerMachine {
    /// How often the control loop reads and advances this timer.
    const PERIOD: Duration;

    /// Apply `command`. Returns `false` when the command does not apply to this variant.
    fn apply(&mut self, command: Command) -> bool;

    /// Snapshot for display, given the current wall-clock time.
    fn reading(&self, now: UnixSeconds) -> Reading;

    /// Advance by one [`PERIOD`](Self::PERIOD).
    fn advance(&mut self);
}
