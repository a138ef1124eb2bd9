//! Countdown and stopwatch firmware for a four-digit seven-segment display driven through a
//! cascade of serial shift registers.
//!
//! The pure pieces (segment encoding, time decomposition, timer state machines, frame
//! planning and request parsing) build and test on the host. The control loop, Wi-Fi, NTP
//! and the HTTP listener need a board feature (`pico1` or `pico2`).
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod display_frame;
mod error;
pub mod frame_planner;
pub mod http_commands;
#[cfg(any(feature = "pico1", feature = "pico2"))]
pub mod segment_timer;
pub mod segments;
pub mod shift_register;
pub mod time_digits;
#[cfg(all(feature = "wifi", any(feature = "pico1", feature = "pico2")))]
pub mod time_sync;
pub mod timer;
pub mod unix_seconds;
pub mod wall_clock;
#[cfg(all(feature = "wifi", any(feature = "pico1", feature = "pico2")))]
pub mod wifi;

// Re-export commonly used items
pub use display_frame::{DisplayFrame, Indicators};
pub use error::{Error, Result};
pub use timer::{Command, CommandSink, Countdown, Mode, Reading, SharedTimer, Stopwatch, TimerMachine};
pub use unix_seconds::UnixSeconds;
