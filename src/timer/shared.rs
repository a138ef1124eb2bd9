use core::cell::RefCell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};

use super::{Command, Reading, TimerMachine};
use crate::unix_seconds::UnixSeconds;

/// Receives commands from a transport (HTTP handler, tests) without knowing the variant.
pub trait CommandSink: Sync {
    /// Apply `command` atomically. Returns `false` when the running variant ignores it.
    fn submit(&self, command: Command) -> bool;
}

/// A timer behind a critical-section mutex.
///
/// Every accessor applies one whole operation under the lock, so a reader never sees a
/// half-applied command or tick.
pub struct SharedTimer<T>(Mutex<CriticalSectionRawMutex, RefCell<T>>);

impl<T: TimerMachine> SharedTimer<T> {
    #[must_use]
    pub const fn new(timer: T) -> Self {
        Self(Mutex::new(RefCell::new(timer)))
    }

    pub fn apply(&self, command: Command) -> bool {
        self.with(|timer| timer.apply(command))
    }

    #[must_use]
    pub fn reading(&self, now: UnixSeconds) -> Reading {
        self.with(|timer| timer.reading(now))
    }

    pub fn advance(&self) {
        self.with(TimerMachine::advance);
    }

    /// Run `f` with exclusive access to the timer.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.0.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

impl<T: TimerMachine + Send> CommandSink for SharedTimer<T> {
    fn submit(&self, command: Command) -> bool {
        self.apply(command)
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;
    use crate::timer::{Mode, Stopwatch};

    #[test]
    fn commands_apply_through_the_sink() {
        let shared = SharedTimer::new(Stopwatch::new(3));
        let sink: &dyn CommandSink = &shared;
        assert!(sink.submit(Command::Start));
        shared.advance();
        assert_eq!(
            shared.reading(UnixSeconds(0)),
            Reading::Stopwatch {
                mode: Mode::CountingDown,
                magnitude: 2
            }
        );
        assert!(!sink.submit(Command::SetTarget(UnixSeconds(9))));
        assert_eq!(shared.with(|stopwatch| stopwatch.magnitude()), 2);
    }
}
