//! A device abstraction that drives the shift-register display from a timer.
//!
//! [`SegmentTimer::new`] takes ownership of the three register lines and spawns the control
//! loop. The loop latches the `0123` boot pattern, then on every tick reads the shared
//! timer, plans a frame and emits it. Commands arrive through [`SegmentTimer::commands`];
//! NTP results through [`SegmentTimer::sync_clock`].
//!
//! # Example
//!
//! ```no_run
//! # #![no_std]
//! # #![no_main]
//! # use panic_probe as _;
//! use embassy_rp::gpio::{Level, Output};
//! use shift_countdown::segment_timer::{CountdownStatic, Register, SegmentTimer};
//! use shift_countdown::shift_register::ShiftRegister;
//!
//! # async fn example(spawner: embassy_executor::Spawner) -> shift_countdown::Result<()> {
//! let p = embassy_rp::init(Default::default());
//! static COUNTDOWN_STATIC: CountdownStatic = SegmentTimer::countdown_static();
//! let register: Register = ShiftRegister::new(
//!     Output::new(p.PIN_16, Level::Low),
//!     Output::new(p.PIN_17, Level::Low),
//!     Output::new(p.PIN_18, Level::Low),
//! );
//! let countdown = SegmentTimer::new_countdown(
//!     &COUNTDOWN_STATIC,
//!     register,
//!     time::UtcOffset::UTC,
//!     spawner,
//! )?;
//! let _commands = countdown.commands();
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use defmt::info;
use embassy_executor::Spawner;
use embassy_rp::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker, Timer};
use time::UtcOffset;

use crate::Result;
use crate::display_frame::DisplayFrame;
use crate::frame_planner::{FramePlan, FramePlanner};
use crate::shift_register::ShiftRegister;
use crate::timer::{CommandSink, Countdown, SharedTimer, Stopwatch, TimerMachine};
use crate::unix_seconds::UnixSeconds;
use crate::wall_clock::WallClock;

/// How long the boot pattern stays up before the first tick.
pub const BOOT_PATTERN_HOLD: Duration = Duration::from_secs(1);
/// How long a countdown change keeps both indicators lit.
pub const PULSE: Duration = Duration::from_millis(500);

/// The register cascade on board GPIOs: data, shift clock, latch clock.
pub type Register = ShiftRegister<Output<'static>, Output<'static>, Output<'static>>;

type ClockSync = Signal<CriticalSectionRawMutex, (UnixSeconds, Instant)>;

/// Static resources for a [`SegmentTimer`] running timer `T`.
pub struct SegmentTimerStatic<T> {
    timer: SharedTimer<T>,
    clock_sync: ClockSync,
}

/// Static resources for the countdown variant.
pub type CountdownStatic = SegmentTimerStatic<Countdown>;
/// Static resources for the stopwatch variant.
pub type StopwatchStatic = SegmentTimerStatic<Stopwatch>;

impl<T: TimerMachine> SegmentTimerStatic<T> {
    const fn new(timer: T) -> Self {
        Self {
            timer: SharedTimer::new(timer),
            clock_sync: Signal::new(),
        }
    }
}

/// Handle to a running control loop. See the [module-level documentation](crate::segment_timer).
pub struct SegmentTimer<T: 'static> {
    resources: &'static SegmentTimerStatic<T>,
}

impl SegmentTimer<Countdown> {
    #[must_use]
    pub const fn countdown_static() -> CountdownStatic {
        SegmentTimerStatic::new(Countdown::new())
    }

    /// Spawn the countdown control loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskSpawn`](crate::Error::TaskSpawn) if the task is already running.
    pub fn new_countdown(
        resources: &'static CountdownStatic,
        register: Register,
        utc_offset: UtcOffset,
        spawner: Spawner,
    ) -> Result<Self> {
        let token = countdown_loop(resources, register, utc_offset)?;
        spawner.spawn(token);
        Ok(Self { resources })
    }
}

impl SegmentTimer<Stopwatch> {
    #[must_use]
    pub const fn stopwatch_static(duration_seconds: u64) -> StopwatchStatic {
        SegmentTimerStatic::new(Stopwatch::new(duration_seconds))
    }

    /// Spawn the stopwatch control loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskSpawn`](crate::Error::TaskSpawn) if the task is already running.
    pub fn new_stopwatch(
        resources: &'static StopwatchStatic,
        register: Register,
        spawner: Spawner,
    ) -> Result<Self> {
        let token = stopwatch_loop(resources, register)?;
        spawner.spawn(token);
        Ok(Self { resources })
    }
}

impl<T: TimerMachine + Send> SegmentTimer<T> {
    /// Re-base the wall clock on a fresh NTP reading.
    pub fn sync_clock(&self, unix_seconds: UnixSeconds) {
        self.resources
            .clock_sync
            .signal((unix_seconds, Instant::now()));
    }

    /// Where command transports deliver [`Command`](crate::timer::Command)s.
    #[must_use]
    pub fn commands(&self) -> &'static dyn CommandSink {
        &self.resources.timer
    }
}

#[embassy_executor::task]
async fn countdown_loop(
    resources: &'static CountdownStatic,
    register: Register,
    utc_offset: UtcOffset,
) -> ! {
    let err = inner_control_loop(resources, register, utc_offset)
        .await
        .unwrap_err();
    panic!("{err}");
}

#[embassy_executor::task]
async fn stopwatch_loop(resources: &'static StopwatchStatic, register: Register) -> ! {
    let err = inner_control_loop(resources, register, UtcOffset::UTC)
        .await
        .unwrap_err();
    panic!("{err}");
}

async fn inner_control_loop<T: TimerMachine>(
    resources: &'static SegmentTimerStatic<T>,
    mut register: Register,
    utc_offset: UtcOffset,
) -> Result<Infallible> {
    register.emit(DisplayFrame::boot_pattern())?;
    info!("Boot pattern latched");
    Timer::after(BOOT_PATTERN_HOLD).await;

    let mut wall_clock = WallClock::new();
    let mut planner = FramePlanner::new(utc_offset);
    let mut ticker = Ticker::every(T::PERIOD);
    loop {
        if let Some((unix_seconds, at)) = resources.clock_sync.try_take() {
            info!("Wall clock set to {}", unix_seconds.as_i64());
            wall_clock.set_from_unix(unix_seconds, at);
        }

        let reading = resources.timer.reading(wall_clock.now_at(Instant::now()));
        match planner.plan(reading) {
            FramePlan::Show(frame) => register.emit(frame)?,
            FramePlan::Pulse { lit, settled } => {
                register.emit(lit)?;
                Timer::after(PULSE).await;
                register.emit(settled)?;
            }
            FramePlan::Hold => {}
        }

        resources.timer.advance();
        ticker.next().await;
    }
}
