//! Stopwatch that counts down from `STOPWATCH_SECONDS`, then up, controlled over HTTP.
//!
//! `GET /start`, `GET /stop` and `GET /reset` drive it. The top decimal point marks counting
//! down, the bottom one counting up, and both mean stopped.
//! Shift-register wiring: data on GPIO 16, shift clock on GPIO 17, latch on GPIO 18.

#![no_std]
#![no_main]
#![allow(clippy::future_not_send, reason = "single-threaded")]

use core::convert::Infallible;

use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use panic_probe as _;
use shift_countdown::config::{self, STOPWATCH_SECONDS, WIFI_PASS, WIFI_SSID};
use shift_countdown::http_commands::serve_commands;
use shift_countdown::segment_timer::{Register, SegmentTimer, StopwatchStatic};
use shift_countdown::shift_register::ShiftRegister;
use shift_countdown::wifi::{Wifi, WifiStatic};
use shift_countdown::Result;

#[embassy_executor::main]
pub async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    core::panic!("{err}");
}

async fn inner_main(spawner: Spawner) -> Result<Infallible> {
    info!("Starting shift-register stopwatch ({}s)", STOPWATCH_SECONDS);
    let p = embassy_rp::init(Default::default());

    let register: Register = ShiftRegister::new(
        Output::new(p.PIN_16, Level::Low), // serial data
        Output::new(p.PIN_17, Level::Low), // shift clock
        Output::new(p.PIN_18, Level::Low), // latch clock
    );
    static STOPWATCH_STATIC: StopwatchStatic = SegmentTimer::stopwatch_static(STOPWATCH_SECONDS);
    let stopwatch = SegmentTimer::new_stopwatch(&STOPWATCH_STATIC, register, spawner)?;

    static WIFI_STATIC: WifiStatic = Wifi::new_static();
    // A missing SSID takes the same offline path as a refused join.
    let connected = match config::wifi_credentials(WIFI_SSID, WIFI_PASS) {
        Ok(credentials) => {
            Wifi::connect(
                &WIFI_STATIC,
                p.PIN_23,  // CYW43 power
                p.PIN_25,  // CYW43 chip select
                p.PIO0,    // CYW43 PIO interface
                p.PIN_24,  // CYW43 clock
                p.PIN_29,  // CYW43 data pin
                p.DMA_CH0, // CYW43 DMA channel
                credentials,
                spawner,
            )
            .await
        }
        Err(err) => Err(err),
    };

    match connected {
        Ok(stack) => serve_commands(stack, stopwatch.commands(), spawner)?,
        Err(err) => warn!("Running offline: {}", defmt::Display2Format(&err)),
    }

    core::future::pending().await
}
