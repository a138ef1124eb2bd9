//! Build-time configuration gathered by `build.rs` (environment, `.env`, `~/.pico.env`).
//!
//! Numbers are parsed in `const` context, so a malformed value stops the build.

use time::UtcOffset;

use crate::{Error, Result};

/// SSID of the network to join.
pub const WIFI_SSID: &str = env!("WIFI_SSID");
/// Passphrase for [`WIFI_SSID`]; empty for open networks.
pub const WIFI_PASS: &str = env!("WIFI_PASS");
/// Local time offset from UTC, in minutes.
pub const UTC_OFFSET_MINUTES: i32 = parse_i32(env!("UTC_OFFSET_MINUTES"));
/// Starting magnitude of the stopwatch, in seconds.
pub const STOPWATCH_SECONDS: u64 = parse_u64(env!("STOPWATCH_SECONDS"));
/// Host name of the NTP server.
pub const NTP_SERVER: &str = env!("NTP_SERVER");
/// Port of the HTTP command endpoint.
pub const HTTP_PORT: u16 = 80;

const _: () = assert!(
    UTC_OFFSET_MINUTES > -24 * 60 && UTC_OFFSET_MINUTES < 24 * 60,
    "UTC_OFFSET_MINUTES must be within one day"
);

/// Convert an offset in minutes, normally [`UTC_OFFSET_MINUTES`], to a [`UtcOffset`].
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] when the offset is outside what `time` accepts.
pub fn utc_offset(minutes: i32) -> Result<UtcOffset> {
    minutes
        .checked_mul(60)
        .and_then(|seconds| UtcOffset::from_whole_seconds(seconds).ok())
        .ok_or(Error::InvalidConfiguration("UTC offset out of range"))
}

/// Returns the Wi-Fi credentials, or an error when no SSID was configured.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] when `ssid` is empty or too long for the radio.
pub const fn wifi_credentials<'a>(ssid: &'a str, pass: &'a str) -> Result<(&'a str, &'a str)> {
    if ssid.is_empty() {
        return Err(Error::InvalidConfiguration("WIFI_SSID is empty"));
    }
    if ssid.len() > 32 {
        return Err(Error::InvalidConfiguration("WIFI_SSID is longer than 32 bytes"));
    }
    if pass.len() > 64 {
        return Err(Error::InvalidConfiguration("WIFI_PASS is longer than 64 bytes"));
    }
    Ok((ssid, pass))
}

#[expect(
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    reason = "Bounds and overflow are checked by hand; const fn cannot use iterators"
)]
const fn parse_u64(text: &str) -> u64 {
    let bytes = text.as_bytes();
    assert!(!bytes.is_empty(), "expected an unsigned number");
    let mut value: u64 = 0;
    let mut index = 0;
    while index < bytes.len() {
        let byte = bytes[index];
        assert!(byte.is_ascii_digit(), "expected an unsigned number");
        value = match value.checked_mul(10) {
            Some(scaled) => match scaled.checked_add((byte - b'0') as u64) {
                Some(sum) => sum,
                None => panic!("number too large"),
            },
            None => panic!("number too large"),
        };
        index += 1;
    }
    value
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    reason = "Range is checked before the cast"
)]
const fn parse_i32(text: &str) -> i32 {
    let (negative, digits) = match text.as_bytes() {
        [b'-', rest @ ..] => (true, rest),
        [b'+', rest @ ..] => (false, rest),
        all => (false, all),
    };
    let magnitude = match core::str::from_utf8(digits) {
        Ok(digits) => parse_u64(digits),
        Err(_) => panic!("expected a signed number"),
    };
    assert!(magnitude <= i32::MAX as u64, "number too large");
    let value = magnitude as i32;
    if negative { value.wrapping_neg() } else { value }
}
