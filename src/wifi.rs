//! Wi-Fi client (station mode) on the Pico W's CYW43 radio.
//!
//! [`Wifi::connect`] powers up the radio, spawns its runner tasks, joins the configured
//! network and waits for a DHCP lease. It returns the network stack, or
//! [`Error::WifiJoinFailed`] after every join attempt was refused. The display task keeps
//! running while this is pending.
//!
//! # Example
//!
//! ```no_run
//! # #![no_std]
//! # #![no_main]
//! # use panic_probe as _;
//! use shift_countdown::wifi::{Wifi, WifiStatic};
//!
//! # async fn example(spawner: embassy_executor::Spawner) -> shift_countdown::Result<()> {
//! let p = embassy_rp::init(Default::default());
//! static WIFI_STATIC: WifiStatic = Wifi::new_static();
//! let stack = Wifi::connect(
//!     &WIFI_STATIC,
//!     p.PIN_23,
//!     p.PIN_25,
//!     p.PIO0,
//!     p.PIN_24,
//!     p.PIN_29,
//!     p.DMA_CH0,
//!     ("my-network", "my-password"),
//!     spawner,
//! )
//! .await?;
//! # let _ = stack;
//! # Ok(())
//! # }
//! ```

#![allow(clippy::future_not_send, reason = "single-threaded")]

use cyw43::JoinOptions;
use cyw43_pio::{DEFAULT_CLOCK_DIVIDER, PioSpi};
use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_net::{Config, Stack, StackResources};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIN_23, PIN_24, PIN_25, PIN_29, PIO0};
use embassy_rp::pio::{Common, InterruptHandler, Pio};
use embassy_rp::{Peri, bind_interrupts};
use embassy_time::Timer;
use static_cell::StaticCell;

use crate::{Error, Result};

/// Join attempts before giving up (the first try plus four retries).
pub const JOIN_ATTEMPTS: u8 = 5;

const SOCKET_COUNT: usize = 5;

/// Static resources for [`Wifi`]. Everything here lives for the rest of the program.
pub struct WifiStatic {
    state: StaticCell<cyw43::State>,
    pio_common: StaticCell<Common<'static, PIO0>>,
    control: StaticCell<cyw43::Control<'static>>,
    resources: StaticCell<StackResources<SOCKET_COUNT>>,
    stack: StaticCell<Stack<'static>>,
}

/// Brings up the radio and network stack. See the [module-level documentation](crate::wifi).
pub struct Wifi;

impl Wifi {
    #[must_use]
    pub const fn new_static() -> WifiStatic {
        WifiStatic {
            state: StaticCell::new(),
            pio_common: StaticCell::new(),
            control: StaticCell::new(),
            resources: StaticCell::new(),
            stack: StaticCell::new(),
        }
    }

    /// Join `(ssid, password)` and wait for an address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WifiJoinFailed`] when the network refused every join attempt,
    /// or [`Error::TaskSpawn`] when a radio task could not start.
    #[expect(clippy::too_many_arguments, reason = "One argument per radio peripheral")]
    pub async fn connect(
        wifi_static: &'static WifiStatic,
        pin_23: Peri<'static, PIN_23>,
        pin_25: Peri<'static, PIN_25>,
        pio0: Peri<'static, PIO0>,
        pin_24: Peri<'static, PIN_24>,
        pin_29: Peri<'static, PIN_29>,
        dma_ch0: Peri<'static, DMA_CH0>,
        (ssid, password): (&'static str, &'static str),
        spawner: Spawner,
    ) -> Result<&'static Stack<'static>> {
        info!("WiFi device initializing in client mode");

        let fw = cyw43_firmware::CYW43_43439A0;
        let clm = cyw43_firmware::CYW43_43439A0_CLM;

        let pwr = Output::new(pin_23, Level::Low);
        let cs = Output::new(pin_25, Level::High);
        let Pio {
            mut common,
            sm0,
            irq0,
            ..
        } = Pio::new(pio0, Irqs);
        let spi = PioSpi::new(
            &mut common,
            sm0,
            DEFAULT_CLOCK_DIVIDER,
            irq0,
            cs,
            pin_24,
            pin_29,
            dma_ch0,
        );
        wifi_static.pio_common.init(common);

        let state = wifi_static.state.init(cyw43::State::new());
        let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
        spawner.spawn(wifi_task(runner)?);

        control.init(clm).await;
        control
            .set_power_management(cyw43::PowerManagementMode::PowerSave)
            .await;
        let control = wifi_static.control.init(control);

        let config = Config::dhcpv4(Default::default());
        let seed = 0x7c8f_3a2e_9d14_6b5a;
        let (stack, runner) = embassy_net::new(
            net_device,
            config,
            wifi_static.resources.init(StackResources::new()),
            seed,
        );
        let stack: &'static Stack<'static> = wifi_static.stack.init(stack);
        spawner.spawn(net_task(runner)?);

        info!("Connecting to WiFi: {}", ssid);
        let mut attempt = 0_u8;
        loop {
            attempt = attempt.saturating_add(1);
            let options = if password.is_empty() {
                JoinOptions::new_open()
            } else {
                JoinOptions::new(password.as_bytes())
            };
            match control.join(ssid, options).await {
                Ok(()) => break,
                Err(err) if attempt < JOIN_ATTEMPTS => {
                    info!("Join attempt {} failed: {}", attempt, err.status);
                    Timer::after_secs(1).await;
                }
                Err(err) => {
                    warn!("Join attempt {} failed: {}; giving up", attempt, err.status);
                    return Err(Error::WifiJoinFailed(attempt));
                }
            }
        }

        info!("WiFi connected! Waiting for DHCP...");
        stack.wait_config_up().await;
        if let Some(config) = stack.config_v4() {
            info!("IP Address: {}", config.address);
        }
        Ok(stack)
    }
}

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

#[embassy_executor::task]
async fn wifi_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}
