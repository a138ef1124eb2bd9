//! HTTP command endpoint: `GET /set?startTime=…`, `/reset`, `/start`, `/stop`.
//!
//! Parsing and dispatch are plain functions so they run in host tests; the TCP listener
//! is only built for a board with the `wifi` feature.

use crate::timer::{Command, CommandSink};
use crate::unix_seconds::UnixSeconds;

/// Reply for every known route, whether or not the command applied.
pub const ACK: &str = "HTTP/1.1 200 OK\r\n\
Content-Type: text/html\r\n\
Content-Length: 11\r\n\
Connection: close\r\n\
\r\n\
<div></div>";

/// Reply for unknown routes and methods.
pub const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\n\
Content-Length: 0\r\n\
Connection: close\r\n\
\r\n";

/// Longest accepted query value, after URL decoding.
pub const MAX_VALUE_LEN: usize = 32;

/// Outcome of parsing one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    /// A well-formed command.
    Command(Command),
    /// Known route with an unusable payload; acknowledged and dropped.
    Ignored,
    /// Unknown route or method.
    NotFound,
}

/// Parse the request line of a raw HTTP request.
#[must_use]
pub fn parse_request(request: &str) -> Request {
    let request_line = request.lines().next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let (Some("GET"), Some(target)) = (parts.next(), parts.next()) else {
        return Request::NotFound;
    };
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    match path {
        "/set" => query_value(query, "startTime")
            .and_then(|value| value.parse::<i64>().ok())
            .map_or(Request::Ignored, |start_time| {
                Request::Command(Command::SetTarget(UnixSeconds(start_time)))
            }),
        "/reset" => Request::Command(Command::Reset),
        "/start" => Request::Command(Command::Start),
        "/stop" => Request::Command(Command::Stop),
        _ => Request::NotFound,
    }
}

/// Apply `request` to `sink` and pick the reply.
pub fn dispatch(request: Request, sink: &dyn CommandSink) -> &'static str {
    match request {
        Request::Command(command) => {
            sink.submit(command);
            ACK
        }
        Request::Ignored => ACK,
        Request::NotFound => NOT_FOUND,
    }
}

fn query_value(query: &str, key: &str) -> Option<heapless::String<MAX_VALUE_LEN>> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| url_decode::<MAX_VALUE_LEN>(name).as_deref() == Some(key))
        .and_then(|(_, value)| url_decode(value))
}

/// Decode `+` and `%XX` escapes.
///
/// `None` when an escape is incomplete, is not hex, decodes to a non-ASCII byte, or the
/// result does not fit in `N` bytes.
fn url_decode<const N: usize>(encoded: &str) -> Option<heapless::String<N>> {
    let mut result = heapless::String::<N>::new();
    let mut chars = encoded.chars();

    while let Some(c) = chars.next() {
        let decoded = match c {
            '+' => ' ',
            '%' => {
                let high = chars.next()?.to_digit(16)?;
                let low = chars.next()?.to_digit(16)?;
                let byte = u8::try_from((high << 4) | low).ok()?;
                if !byte.is_ascii() {
                    return None;
                }
                char::from(byte)
            }
            other => other,
        };
        result.push(decoded).ok()?;
    }

    Some(result)
}

#[cfg(all(feature = "wifi", any(feature = "pico1", feature = "pico2")))]
mod server {
    use core::convert::Infallible;

    use defmt::{info, warn};
    use embassy_executor::Spawner;
    use embassy_net::{Stack, tcp::TcpSocket};
    use embassy_time::{Duration, Timer};
    use embedded_io_async::Write as _;
    use static_cell::StaticCell;

    use super::{dispatch, parse_request};
    use crate::Result;
    use crate::config::HTTP_PORT;
    use crate::timer::CommandSink;

    /// Spawn the HTTP listener that feeds `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskSpawn`](crate::Error::TaskSpawn) if the task is already running.
    pub fn serve_commands(
        stack: &'static Stack<'static>,
        sink: &'static dyn CommandSink,
        spawner: Spawner,
    ) -> Result<()> {
        let token = command_server_task(stack, sink)?;
        spawner.spawn(token);
        Ok(())
    }

    #[embassy_executor::task]
    async fn command_server_task(
        stack: &'static Stack<'static>,
        sink: &'static dyn CommandSink,
    ) -> ! {
        let err = inner_command_server(stack, sink).await.unwrap_err();
        panic!("{err}");
    }

    async fn inner_command_server(
        stack: &'static Stack<'static>,
        sink: &'static dyn CommandSink,
    ) -> Result<Infallible> {
        static RX_BUFFER: StaticCell<[u8; 1024]> = StaticCell::new();
        static TX_BUFFER: StaticCell<[u8; 512]> = StaticCell::new();
        static REQUEST_BUFFER: StaticCell<[u8; 512]> = StaticCell::new();

        let rx_buffer = RX_BUFFER.init([0; 1024]);
        let tx_buffer = TX_BUFFER.init([0; 512]);
        let request = REQUEST_BUFFER.init([0; 512]);

        info!("HTTP command server listening on port {}", HTTP_PORT);
        loop {
            let mut socket = TcpSocket::new(*stack, rx_buffer, tx_buffer);
            socket.set_timeout(Some(Duration::from_secs(30)));

            if let Err(err) = socket.accept(HTTP_PORT).await {
                warn!("Accept error: {:?}", err);
                Timer::after_millis(500).await;
                continue;
            }

            let request_len = match socket.read(request).await {
                Ok(0) => {
                    info!("Client closed connection");
                    socket.close();
                    continue;
                }
                Ok(n) => n,
                Err(err) => {
                    warn!("HTTP read error: {:?}", err);
                    socket.close();
                    continue;
                }
            };

            let request_text = request
                .get(..request_len)
                .and_then(|bytes| core::str::from_utf8(bytes).ok())
                .unwrap_or("");
            let parsed = parse_request(request_text);
            info!("HTTP request: {:?}", parsed);
            let response = dispatch(parsed, sink);

            if let Err(err) = socket.write_all(response.as_bytes()).await {
                warn!("HTTP write error: {:?}", err);
            }
            let _ = socket.flush().await;
            socket.close();
        }
    }
}

#[cfg(all(feature = "wifi", any(feature = "pico1", feature = "pico2")))]
pub use server::serve_commands;

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn decodes_escapes() {
        assert_eq!(url_decode::<8>("a%2Bb+c").as_deref(), Some("a+b c"));
        assert_eq!(url_decode::<8>("%2D5").as_deref(), Some("-5"));
    }

    #[test]
    fn bad_escapes_fail_decoding() {
        assert_eq!(url_decode::<8>("1%ZZ0"), None);
        assert_eq!(url_decode::<8>("12%3"), None);
        assert_eq!(url_decode::<8>("5%FF"), None);
        assert_eq!(url_decode::<8>("%"), None);
    }

    #[test]
    fn overlong_values_are_rejected() {
        assert_eq!(url_decode::<4>("12345"), None);
        assert_eq!(
            parse_request("GET /set?startTime=000000000000000000000000000000001 HTTP/1.1\r\n"),
            Request::Ignored
        );
    }

    #[test]
    fn finds_key_among_others() {
        assert_eq!(
            parse_request("GET /set?x=1&startTime=42&y=2 HTTP/1.1\r\n"),
            Request::Command(Command::SetTarget(UnixSeconds(42)))
        );
    }
}
