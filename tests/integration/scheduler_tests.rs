//! Integration tests for the cyclic scheduler (`Monitor`).
//!
//! Exercises whole iterations against the mock rig: watchdog discipline,
//! sensor polling, connection lifecycle and the housekeeping branch.

use crate::mock_hw::{BOOT_TIME, Rig};
use tempmon::app::events::AppEvent;
use tempmon::app::ports::{ConfigPort, EventLogPort, LineChannel, SocketStatus, StoragePort};
use tempmon::app::service::TickOutcome;
use tempmon::config::{SystemConfig, Thresholds};
use tempmon::protocol::{PendingMethod, ProtocolState};
use tempmon::telemetry::{EventKind, LogRecord};

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_records_clock_and_startup_events() {
    let rig = Rig::new();
    let log: Vec<LogRecord> = (0..rig.store.len()).filter_map(|i| rig.store.record(i)).collect();
    assert_eq!(
        log,
        [
            LogRecord { timestamp: BOOT_TIME, event: EventKind::TimeSet },
            LogRecord { timestamp: BOOT_TIME, event: EventKind::NewTime },
            LogRecord { timestamp: BOOT_TIME, event: EventKind::Startup },
        ]
    );
    assert_eq!(rig.alarms.announced, [EventKind::Startup]);
    assert_eq!(rig.hw.conversions, 1);
    assert_eq!(rig.hw.armed, [5000]);
    assert_eq!(rig.sink.events, [AppEvent::Started]);
}

#[test]
fn settle_delay_follows_config() {
    let config = SystemConfig {
        startup_settle_ms: 250,
        ..SystemConfig::default()
    };
    let rig = Rig::with_config(config);
    assert_eq!(rig.hw.armed, [250]);
}

// ── Watchdog and indicator ────────────────────────────────────

#[test]
fn watchdog_fed_once_per_iteration_on_every_branch() {
    let mut rig = Rig::new();

    assert_eq!(rig.tick(), TickOutcome::Housekeeping);
    assert_eq!(rig.hw.feeds, 1);

    assert_eq!(rig.send(b"GET / HTTP/1.1\r\n"), TickOutcome::AwaitingInput);
    assert_eq!(rig.hw.feeds, 2);

    assert_eq!(rig.send(b"\r\n"), TickOutcome::Serviced(PendingMethod::Get));
    assert_eq!(rig.hw.feeds, 3);
    assert_eq!(rig.hw.indicator_updates, 3);
}

// ── Sensor poll ───────────────────────────────────────────────

#[test]
fn poll_only_when_countdown_expires() {
    let mut rig = Rig::new();
    rig.tick();
    assert!(rig.alarms.updates.is_empty());

    rig.hw.poll_due = true;
    rig.hw.temperature = 81;
    rig.tick();
    assert_eq!(rig.monitor.schedule().reading, 81);
    assert_eq!(rig.alarms.updates, [(81, Thresholds::default())]);
    // Re-armed with the poll interval and the next conversion started.
    assert_eq!(rig.hw.armed, [5000, 1000]);
    assert_eq!(rig.hw.conversions, 2);
    assert!(rig.sink.events.contains(&AppEvent::Reading {
        value: 81,
        socket: SocketStatus::Established,
    }));
}

#[test]
fn raised_alarm_is_logged_and_emitted() {
    let mut rig = Rig::new();
    rig.alarms.raise_at_or_above = Some(100);
    rig.hw.poll_due = true;
    rig.hw.temperature = 104;
    rig.tick();

    let last = rig.store.record(rig.store.len() - 1);
    assert_eq!(last.map(|r| r.event), Some(EventKind::HiAlarm));
    assert_eq!(rig.sink.count(&AppEvent::Alarm(EventKind::HiAlarm)), 1);
}

#[test]
fn alarm_sees_updated_thresholds() {
    let mut rig = Rig::new();
    let t = Thresholds {
        hi_alarm: 120,
        hi_warn: 110,
        lo_warn: 30,
        lo_alarm: 20,
    };
    rig.store.set_thresholds(t).unwrap();
    rig.hw.poll_due = true;
    rig.tick();
    assert_eq!(rig.alarms.updates[0].1, t);
}

// ── Connection lifecycle ──────────────────────────────────────

#[test]
fn closed_socket_is_reopened_on_configured_port() {
    let config = SystemConfig {
        http_port: 9000,
        ..SystemConfig::default()
    };
    let mut rig = Rig::with_config(config);
    rig.chan.disconnect();

    rig.tick();
    assert_eq!(rig.chan.status(), SocketStatus::Listening);
    assert_eq!(rig.chan.port(), Some(9000));
    assert_eq!(rig.sink.count(&AppEvent::ListenerOpened { port: 9000 }), 1);

    // Still listening: no second reopen.
    rig.tick();
    assert_eq!(rig.chan.open_count(), 1);
}

#[test]
fn reopen_discards_half_parsed_request() {
    let mut rig = Rig::new();
    rig.send(b"PUT /config HTTP/1.1\r\n");
    assert_eq!(rig.monitor.protocol_state(), Some(ProtocolState::AwaitingHeaderEnd));

    // The client vanishes mid-request.
    rig.chan.disconnect();
    rig.reconnect();
    assert_eq!(rig.monitor.protocol_state(), Some(ProtocolState::Idle));
    assert_eq!(rig.monitor.pending_method(), PendingMethod::None);

    // A header-only line from the new client is not mistaken for the end
    // of the old request.
    assert_eq!(rig.send(b"\r\n"), TickOutcome::AwaitingInput);
    assert_eq!(
        rig.send(b"GET / HTTP/1.1\r\n\r\n"),
        TickOutcome::Serviced(PendingMethod::Get)
    );
}

#[test]
fn each_serviced_request_closes_exactly_once() {
    let mut rig = Rig::new();
    rig.send(b"GET / HTTP/1.1\r\n\r\n");
    assert_eq!(rig.chan.disconnect_count(), 1);
    assert_eq!(rig.chan.status(), SocketStatus::Closed);

    rig.reconnect();
    rig.send(b"DELETE /log HTTP/1.1\r\n\r\n");
    assert_eq!(rig.chan.disconnect_count(), 2);
}

// ── Housekeeping ──────────────────────────────────────────────

#[test]
fn housekeeping_writes_back_staged_state() {
    let mut rig = Rig::new();
    assert!(rig.store.has_pending());
    rig.tick();
    assert!(!rig.store.has_pending());
    assert!(rig.store.storage().exists("tempmon", "eventlog"));
}

#[test]
fn servicing_defers_housekeeping() {
    let mut rig = Rig::new();
    rig.send(b"GET / HTTP/1.1\r\n");
    assert!(rig.store.has_pending());
}

#[test]
fn storage_failure_does_not_stop_the_loop() {
    let mut rig = Rig::new();
    rig.store.storage_mut().set_write_protect(true);
    assert_eq!(rig.tick(), TickOutcome::Housekeeping);
    assert!(rig.store.has_pending());

    // The loop carries on and still serves requests.
    assert_eq!(
        rig.send(b"GET / HTTP/1.1\r\n\r\n"),
        TickOutcome::Serviced(PendingMethod::Get)
    );

    rig.store.storage_mut().set_write_protect(false);
    rig.tick();
    assert!(!rig.store.has_pending());
}
