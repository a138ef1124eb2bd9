//! Host-level tests for HTTP command parsing and dispatch.

use std::sync::Mutex;

use shift_countdown::http_commands::{ACK, NOT_FOUND, Request, dispatch, parse_request};
use shift_countdown::{Command, CommandSink, Countdown, Reading, SharedTimer, Stopwatch, UnixSeconds};

#[derive(Default)]
struct RecordingSink(Mutex<Vec<Command>>);

impl CommandSink for RecordingSink {
    fn submit(&self, command: Command) -> bool {
        self.0.lock().unwrap().push(command);
        true
    }
}

fn get(target: &str) -> Request {
    parse_request(&format!("GET {target} HTTP/1.1\r\nHost: 192.168.1.50\r\n\r\n"))
}

#[test]
fn routes_map_to_commands() {
    assert_eq!(
        get("/set?startTime=1700000000"),
        Request::Command(Command::SetTarget(UnixSeconds(1_700_000_000)))
    );
    assert_eq!(get("/reset"), Request::Command(Command::Reset));
    assert_eq!(get("/start"), Request::Command(Command::Start));
    assert_eq!(get("/stop"), Request::Command(Command::Stop));
}

#[test]
fn broken_escapes_leave_set_ignored() {
    for target in [
        "/set?startTime=1%ZZ0",
        "/set?startTime=12%3",
        "/set?startTime=5%FF",
        "/set?start%ZZTime=5",
    ] {
        assert_eq!(get(target), Request::Ignored, "{target}");
    }

    let countdown = SharedTimer::new(Countdown::new());
    assert_eq!(dispatch(get("/set?startTime=1%ZZ0"), &countdown), ACK);
    assert_eq!(
        countdown.reading(UnixSeconds(500)),
        Reading::TimeOfDay(UnixSeconds(500))
    );
}

#[test]
fn negative_and_encoded_targets_parse() {
    assert_eq!(
        get("/set?startTime=%2D42"),
        Request::Command(Command::SetTarget(UnixSeconds(-42)))
    );
}

#[test]
fn malformed_set_is_ignored() {
    assert_eq!(get("/set"), Request::Ignored);
    assert_eq!(get("/set?startTime="), Request::Ignored);
    assert_eq!(get("/set?startTime=soon"), Request::Ignored);
    assert_eq!(get("/set?other=5"), Request::Ignored);
}

#[test]
fn unknown_routes_and_methods_are_not_found() {
    assert_eq!(get("/favicon.ico"), Request::NotFound);
    assert_eq!(parse_request("POST /reset HTTP/1.1\r\n\r\n"), Request::NotFound);
    assert_eq!(parse_request(""), Request::NotFound);
}

#[test]
fn dispatch_acknowledges_known_routes() {
    let sink = RecordingSink::default();
    assert_eq!(dispatch(get("/start"), &sink), ACK);
    assert_eq!(dispatch(get("/set?startTime=x"), &sink), ACK);
    assert_eq!(dispatch(get("/nope"), &sink), NOT_FOUND);
    assert_eq!(*sink.0.lock().unwrap(), [Command::Start]);
    assert!(ACK.ends_with("\r\n\r\n<div></div>"));
}

#[test]
fn mismatched_variant_commands_are_acknowledged_and_ignored() {
    let countdown = SharedTimer::new(Countdown::new());
    assert_eq!(dispatch(get("/start"), &countdown), ACK);
    assert_eq!(
        countdown.reading(UnixSeconds(5)),
        Reading::TimeOfDay(UnixSeconds(5))
    );

    let stopwatch = SharedTimer::new(Stopwatch::new(300));
    assert_eq!(dispatch(get("/set?startTime=99"), &stopwatch), ACK);
    assert_eq!(stopwatch.with(|timer| timer.clone()), Stopwatch::new(300));
}
