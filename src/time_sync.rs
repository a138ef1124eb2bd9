//! Network Time Protocol (NTP) synchronization over an existing network stack.
//!
//! See [`TimeSync`] for usage.

#![allow(clippy::future_not_send, reason = "single-threaded")]

use core::convert::Infallible;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_net::{Stack, dns, udp};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;

use crate::Result;
use crate::unix_seconds::UnixSeconds;

/// Seconds between re-syncs once the clock has been set.
pub const RESYNC_SECS: u64 = 30;

/// Events emitted by [`TimeSync`].
#[derive(Clone)]
pub enum TimeSyncEvent {
    Success { unix_seconds: UnixSeconds },
    Failed(&'static str),
}

type TimeSyncEvents = Signal<CriticalSectionRawMutex, TimeSyncEvent>;

/// Resources needed to construct a [`TimeSync`].
pub struct TimeSyncStatic {
    events: TimeSyncEvents,
    time_sync_cell: StaticCell<TimeSync>,
}

/// Periodically queries an NTP server and reports the result.
///
/// # Sync Timing
///
/// - **Initial sync**: fires immediately; on failure retries after 10 s, 30 s, 60 s, then every 5 min
/// - **Periodic sync**: after the first success, every [`RESYNC_SECS`] seconds
///
/// # Examples
///
/// ```no_run
/// # #![no_std]
/// # #![no_main]
/// # use panic_probe as _;
/// use embassy_executor::Spawner;
/// use embassy_net::Stack;
/// use shift_countdown::time_sync::{TimeSync, TimeSyncEvent, TimeSyncStatic};
///
/// async fn run_time_sync(
///     stack: &'static Stack<'static>,
///     spawner: Spawner,
/// ) -> shift_countdown::Result<()> {
///     static TIME_SYNC_STATIC: TimeSyncStatic = TimeSync::new_static();
///     let time_sync = TimeSync::new(&TIME_SYNC_STATIC, stack, "pool.ntp.org", spawner)?;
///
///     loop {
///         if let TimeSyncEvent::Success { unix_seconds } = time_sync.wait().await {
///             defmt::info!("Time synced: {}", unix_seconds.as_i64());
///         }
///     }
/// }
/// ```
pub struct TimeSync {
    events: &'static TimeSyncEvents,
}

impl TimeSync {
    /// Create [`TimeSync`] resources.
    #[must_use]
    pub const fn new_static() -> TimeSyncStatic {
        TimeSyncStatic {
            events: Signal::new(),
            time_sync_cell: StaticCell::new(),
        }
    }

    /// Start syncing against `server` over `stack`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskSpawn`](crate::Error::TaskSpawn) if the task cannot be spawned.
    pub fn new(
        time_sync_static: &'static TimeSyncStatic,
        stack: &'static Stack<'static>,
        server: &'static str,
        spawner: Spawner,
    ) -> Result<&'static Self> {
        let token = time_sync_stack_loop(stack, server, &time_sync_static.events)?;
        spawner.spawn(token);

        Ok(time_sync_static.time_sync_cell.init(Self {
            events: &time_sync_static.events,
        }))
    }

    /// Wait for and return the next [`TimeSyncEvent`].
    pub async fn wait(&self) -> TimeSyncEvent {
        self.events.wait().await
    }
}

#[embassy_executor::task]
async fn time_sync_stack_loop(
    stack: &'static Stack<'static>,
    server: &'static str,
    sync_events: &'static TimeSyncEvents,
) -> ! {
    let err = run_time_sync_loop(stack, server, sync_events)
        .await
        .unwrap_err();
    core::panic!("{err}");
}

/// Delay before retry `attempt` (1-based) while the clock has never been set.
const fn initial_backoff_secs(attempt: u32) -> u64 {
    match attempt {
        1 => 10,
        2 => 30,
        3 => 60,
        _ => 300,
    }
}

async fn run_time_sync_loop(
    stack: &'static Stack<'static>,
    server: &'static str,
    sync_events: &'static TimeSyncEvents,
) -> Result<Infallible> {
    info!("TimeSync started against {}", server);

    let mut attempt = 0_u32;
    loop {
        attempt = attempt.saturating_add(1);
        match fetch_ntp_time(stack, server).await {
            Ok(unix_seconds) => {
                info!("Initial sync successful: unix_seconds={}", unix_seconds.as_i64());
                sync_events.signal(TimeSyncEvent::Success { unix_seconds });
                break;
            }
            Err(e) => {
                sync_events.signal(TimeSyncEvent::Failed(e));
                let delay_secs = initial_backoff_secs(attempt);
                info!("Sync failed ({}), retrying in {}s...", e, delay_secs);
                Timer::after_secs(delay_secs).await;
            }
        }
    }

    loop {
        Timer::after_secs(RESYNC_SECS).await;
        match fetch_ntp_time(stack, server).await {
            Ok(unix_seconds) => {
                sync_events.signal(TimeSyncEvent::Success { unix_seconds });
            }
            Err(e) => {
                info!("Periodic sync failed: {}", e);
                sync_events.signal(TimeSyncEvent::Failed(e));
            }
        }
    }
}

async fn fetch_ntp_time(stack: &Stack<'static>, server: &str) -> Result<UnixSeconds, &'static str> {
    use dns::DnsQueryType;
    use udp::UdpSocket;

    const NTP_PORT: u16 = 123;

    let dns_result = stack
        .dns_query(server, DnsQueryType::A)
        .await
        .map_err(|e| {
            warn!("DNS lookup failed: {:?}", e);
            "DNS lookup failed"
        })?;
    let server_addr = dns_result.first().ok_or("No DNS results")?;

    let mut rx_meta = [udp::PacketMetadata::EMPTY; 1];
    let mut rx_buffer = [0; 128];
    let mut tx_meta = [udp::PacketMetadata::EMPTY; 1];
    let mut tx_buffer = [0; 128];
    let mut socket = UdpSocket::new(
        *stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );

    socket.bind(0).map_err(|e| {
        warn!("Socket bind failed: {:?}", e);
        "Socket bind failed"
    })?;

    // 48 bytes; LI=0, VN=3, Mode=3 (client)
    let mut ntp_request = [0_u8; 48];
    if let Some(flags) = ntp_request.first_mut() {
        *flags = 0x1B;
    }

    socket
        .send_to(&ntp_request, (*server_addr, NTP_PORT))
        .await
        .map_err(|e| {
            warn!("NTP send failed: {:?}", e);
            "NTP send failed"
        })?;

    let mut response = [0_u8; 48];
    let (n, _from) = embassy_time::with_timeout(Duration::from_secs(5), socket.recv_from(&mut response))
        .await
        .map_err(|_| "NTP receive timeout")?
        .map_err(|e| {
            warn!("NTP receive failed: {:?}", e);
            "NTP receive failed"
        })?;

    if n < 48 {
        return Err("NTP response too short");
    }

    // Transmit timestamp, seconds part: bytes 40-43, big-endian
    let ntp_seconds = response
        .get(40..44)
        .and_then(|bytes| <[u8; 4]>::try_from(bytes).ok())
        .map(u32::from_be_bytes)
        .ok_or("NTP response too short")?;
    UnixSeconds::from_ntp_seconds(ntp_seconds).ok_or("Invalid NTP timestamp")
}
