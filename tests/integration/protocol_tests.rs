//! Integration tests for request parsing driven by the scheduler.

use crate::mock_hw::Rig;
use tempmon::app::events::AppEvent;
use tempmon::app::service::TickOutcome;
use tempmon::protocol::{PendingMethod, ProtocolState};

const GET_REQUEST: &[u8] = b"GET /device HTTP/1.1\r\nHost: tempmon\r\nAccept: */*\r\n\r\n";

#[test]
fn request_split_across_iterations_matches_single_delivery() {
    let mut whole = Rig::new();
    assert_eq!(
        whole.send(GET_REQUEST),
        TickOutcome::Serviced(PendingMethod::Get)
    );

    let mut split = Rig::new();
    assert_eq!(split.send(b"GET /device HT"), TickOutcome::Housekeeping);
    assert_eq!(split.send(b"TP/1.1\r\nHost: temp"), TickOutcome::AwaitingInput);
    assert_eq!(split.monitor.protocol_state(), Some(ProtocolState::AwaitingHeaderEnd));
    assert_eq!(split.monitor.pending_method(), PendingMethod::Get);
    assert_eq!(split.send(b"mon\r\nAccept: */*\r\n"), TickOutcome::AwaitingInput);
    assert_eq!(
        split.send(b"\r\n"),
        TickOutcome::Serviced(PendingMethod::Get)
    );

    assert_eq!(whole.chan.output(), split.chan.output());
}

#[test]
fn put_with_body_is_consumed_then_closed() {
    let mut rig = Rig::new();
    assert_eq!(
        rig.send(b"PUT /config HTTP/1.1\r\nContent-Type: text/plain\r\n\r\ntcrit_hi="),
        TickOutcome::AwaitingInput
    );
    assert_eq!(rig.monitor.protocol_state(), Some(ProtocolState::AwaitingBodyEnd));
    assert_eq!(
        rig.send(b"105\r\n\r\n"),
        TickOutcome::Serviced(PendingMethod::Put)
    );
    assert!(rig.chan.output().is_empty());
    assert_eq!(rig.sink.count(&AppEvent::WriteStub(PendingMethod::Put)), 1);
    assert_eq!(rig.chan.disconnect_count(), 1);
}

#[test]
fn unknown_verb_closes_without_a_body() {
    let mut rig = Rig::new();
    assert_eq!(
        rig.send(b"POST /device HTTP/1.1\r\n"),
        TickOutcome::Serviced(PendingMethod::None)
    );
    assert!(rig.chan.output().is_empty());
    assert_eq!(rig.chan.disconnect_count(), 1);
    assert_eq!(rig.sink.count(&AppEvent::MalformedRequest), 1);
    assert_eq!(rig.monitor.protocol_state(), Some(ProtocolState::Idle));
    assert_eq!(rig.monitor.pending_method(), PendingMethod::None);
}

#[test]
fn garbage_before_the_verb_is_skipped_when_already_received() {
    let mut rig = Rig::new();
    assert_eq!(
        rig.send(b"hello\r\nGET / HTTP/1.1\r\n\r\n"),
        TickOutcome::Serviced(PendingMethod::Get)
    );
    assert!(rig.chan.output().starts_with(b"HTTP/1.1 200 OK"));
}

#[test]
fn bare_newlines_are_accepted() {
    let mut rig = Rig::new();
    assert_eq!(
        rig.send(b"DELETE /log HTTP/1.0\n\n"),
        TickOutcome::Serviced(PendingMethod::Delete)
    );
}

#[test]
fn overlong_line_cannot_wedge_the_parser() {
    let mut rig = Rig::new();
    let mut request = b"GET /".to_vec();
    request.extend(std::iter::repeat_n(b'a', 2000));
    request.extend_from_slice(b" HTTP/1.1\r\n\r\n");
    assert_eq!(rig.send(&request), TickOutcome::Serviced(PendingMethod::Get));
}

#[test]
fn pipelined_second_request_is_consumed_as_a_body() {
    let mut rig = Rig::new();
    assert_eq!(
        rig.send(b"GET / HTTP/1.1\r\n\r\nPUT / HTTP/1.1\r\n\r\n"),
        TickOutcome::Serviced(PendingMethod::Get)
    );
    let first = rig.chan.take_output();
    assert!(!first.is_empty());
    rig.tick();
    assert!(rig.chan.output().is_empty());
    assert_eq!(rig.sink.count(&AppEvent::RequestServiced(PendingMethod::Get)), 1);
    assert_eq!(rig.sink.count(&AppEvent::RequestServiced(PendingMethod::Put)), 0);
    assert_eq!(rig.sink.count(&AppEvent::WriteStub(PendingMethod::Put)), 0);
}

#[test]
fn unsupported_method_with_body_is_closed() {
    let mut rig = Rig::new();
    assert_eq!(
        rig.send(b"POST /x HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc"),
        TickOutcome::Serviced(PendingMethod::None)
    );
    assert_eq!(rig.chan.disconnect_count(), 1);
    assert!(rig.chan.output().is_empty());
    for _ in 0..5 {
        rig.tick();
    }
    assert_eq!(rig.chan.disconnect_count(), 1);
}

#[test]
fn malformed_request_split_inside_terminator_matches_single_delivery() {
    let mut whole = Rig::new();
    assert_eq!(
        whole.send(b"POST / HTTP/1.1\r\n\r\n"),
        TickOutcome::Serviced(PendingMethod::None)
    );

    let mut split = Rig::new();
    assert_eq!(
        split.send(b"POST / HTTP/1.1\r\n\r"),
        TickOutcome::Serviced(PendingMethod::None)
    );
    split.send(b"\n");

    assert_eq!(whole.chan.disconnect_count(), 1);
    assert_eq!(split.chan.disconnect_count(), 1);
    assert_eq!(split.sink.count(&AppEvent::MalformedRequest), 1);
    assert_eq!(whole.chan.output(), split.chan.output());
}

#[test]
fn truncated_line_ending_in_cr_does_not_end_the_headers() {
    let mut rig = Rig::new();
    // A header that fills the receive buffer exactly, its CR the last byte.
    let mut request = b"GET / HTTP/1.1\r\nX-Pad: ".to_vec();
    request.extend(std::iter::repeat_n(b'a', 512 - "X-Pad: ".len() - 1));
    request.push(b'\r');
    assert_eq!(rig.send(&request), TickOutcome::AwaitingInput);
    assert_eq!(rig.monitor.protocol_state(), Some(ProtocolState::AwaitingHeaderEnd));

    // The LF completing that line is not a blank line.
    assert_eq!(rig.send(b"\n"), TickOutcome::Housekeeping);
    assert_eq!(rig.monitor.protocol_state(), Some(ProtocolState::AwaitingHeaderEnd));

    assert_eq!(
        rig.send(b"Host: x\r\n\r\n"),
        TickOutcome::Serviced(PendingMethod::Get)
    );
}
