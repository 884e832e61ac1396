//! Application service: the cooperative cyclic scheduler.
//!
//! [`Monitor`] owns the scheduler state (last reading, request parser)
//! and drives one bounded iteration per [`tick`](Monitor::tick).  All I/O
//! flows through port traits injected at call sites, so the whole loop
//! runs against mock adapters in tests.
//!
//! ```text
//!  WatchdogPort ─┐
//!  IndicatorPort ┤                  ┌─────────────────────┐
//!  SensorPort ───┼── hw ──────────▶ │       Monitor       │ ──▶ EventSink
//!  PollTimer ────┘                  │ reading · parser    │
//!  AlarmPort ───────────────────▶   │                     │ ◀─▶ LineChannel
//!  ConfigPort + EventLogPort ────▶  └─────────────────────┘
//! ```
//!
//! Every iteration, in order: feed the watchdog, advance the indicator,
//! poll the sensor if its countdown expired, reopen the socket if it is
//! closed, then either service the request parser (input waiting) or
//! write back staged configuration and log records (no input).

use log::{debug, info, warn};

use crate::api::{self, DispatchOutcome, Snapshot};
use crate::config::SystemConfig;
use crate::protocol::{PendingMethod, ProtocolState, RequestParser};
use crate::telemetry::{EventKind, Vpd};

use super::events::AppEvent;
use super::ports::{
    AlarmPort, ConfigPort, EventLogPort, EventSink, IndicatorPort, LineChannel, PollTimer,
    SensorPort, SocketStatus, WatchdogPort,
};

// ───────────────────────────────────────────────────────────────
// Scheduler state
// ───────────────────────────────────────────────────────────────

/// Process-wide scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    /// Last sampled temperature, in whole degrees.
    pub reading: i32,
}

/// Which branch an iteration took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A request cycle completed, was dispatched and the connection closed.
    Serviced(PendingMethod),
    /// Input was consumed but the request is not complete yet.
    AwaitingInput,
    /// No input waiting; staged writes were flushed.
    Housekeeping,
}

// ───────────────────────────────────────────────────────────────
// Monitor
// ───────────────────────────────────────────────────────────────

pub struct Monitor {
    config: SystemConfig,
    vpd: Vpd,
    schedule: ScheduleState,
    parser: RequestParser,
    iterations: u64,
}

impl Monitor {
    pub fn new(config: SystemConfig, vpd: Vpd) -> Self {
        let schedule = ScheduleState {
            reading: config.initial_reading,
        };
        Self {
            config,
            vpd,
            schedule,
            parser: RequestParser::new(),
            iterations: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Boot sequence, run once after the network is up: record the clock
    /// being set and the start-up, announce the start-up, and hold off the
    /// first poll until the start-up temperature spike has settled.
    pub fn start(
        &mut self,
        hw: &mut (impl SensorPort + PollTimer),
        alarms: &mut impl AlarmPort,
        log: &mut impl EventLogPort,
        sink: &mut impl EventSink,
    ) {
        log.append(EventKind::TimeSet);
        log.append(EventKind::NewTime);
        log.append(EventKind::Startup);
        alarms.announce(EventKind::Startup);

        hw.start_conversion();
        hw.arm(self.config.startup_settle_ms);

        sink.emit(&AppEvent::Started);
        info!(
            "Monitor started: first poll in {} ms, port {}",
            self.config.startup_settle_ms, self.config.http_port
        );
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one scheduler iteration.  Never blocks and never fails: every
    /// collaborator error is logged and the loop carries on.
    pub fn tick<H, A, S, C, E>(
        &mut self,
        hw: &mut H,
        alarms: &mut A,
        store: &mut S,
        chan: &mut C,
        sink: &mut E,
    ) -> TickOutcome
    where
        H: SensorPort + WatchdogPort + IndicatorPort + PollTimer,
        A: AlarmPort,
        S: ConfigPort + EventLogPort,
        C: LineChannel,
        E: EventSink,
    {
        self.iterations += 1;

        // 1. Watchdog first, exactly once, whatever branch follows.
        hw.feed();

        // 2. Indicator
        hw.update();

        // 3. Sensor poll
        if hw.is_done() {
            self.poll_sensor(hw, alarms, store, chan.status(), sink);
        }

        // 4. Connection lifecycle
        if chan.status() == SocketStatus::Closed {
            self.reopen(chan, sink);
        }

        // 5. Protocol servicing or idle housekeeping
        if chan.line_available() {
            self.service(store, chan, sink)
        } else {
            Self::housekeeping(store);
            TickOutcome::Housekeeping
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn schedule(&self) -> ScheduleState {
        self.schedule
    }

    /// Parser state, `None` if it holds an invalid state.
    pub fn protocol_state(&self) -> Option<ProtocolState> {
        self.parser.state()
    }

    pub fn pending_method(&self) -> PendingMethod {
        self.parser.pending_method()
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn poll_sensor(
        &mut self,
        hw: &mut (impl SensorPort + PollTimer),
        alarms: &mut impl AlarmPort,
        store: &mut (impl ConfigPort + EventLogPort),
        socket: SocketStatus,
        sink: &mut impl EventSink,
    ) {
        let reading = hw.read();
        self.schedule.reading = reading;
        debug!("poll: temperature {} (socket {:?})", reading, socket);
        sink.emit(&AppEvent::Reading {
            value: reading,
            socket,
        });

        let thresholds = store.thresholds();
        if let Some(event) = alarms.update(reading, &thresholds) {
            store.append(event);
            sink.emit(&AppEvent::Alarm(event));
        }

        hw.arm(self.config.sensor_poll_interval_ms);
        hw.start_conversion();
    }

    fn reopen(&mut self, chan: &mut impl LineChannel, sink: &mut impl EventSink) {
        // Whatever the previous connection left half-parsed is gone.
        self.parser.reset();
        let port = self.config.http_port;
        match chan.open_listening(port) {
            Ok(()) => sink.emit(&AppEvent::ListenerOpened { port }),
            Err(e) => warn!("Monitor: reopening port {} failed: {}", port, e),
        }
    }

    fn service(
        &mut self,
        store: &mut (impl ConfigPort + EventLogPort),
        chan: &mut impl LineChannel,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        if let Err(defect) = self.parser.service(chan) {
            sink.emit(&AppEvent::ProtocolDefect(defect.0));
            return TickOutcome::AwaitingInput;
        }

        let Some(method) = self.parser.take_completed() else {
            return TickOutcome::AwaitingInput;
        };

        let snapshot = Snapshot {
            vpd: &self.vpd,
            thresholds: store.thresholds(),
            temperature: self.schedule.reading,
            log: &*store,
        };
        match api::dispatch(method, &snapshot, chan) {
            DispatchOutcome::Responded => {}
            DispatchOutcome::Acknowledged => sink.emit(&AppEvent::WriteStub(method)),
            DispatchOutcome::Ignored => sink.emit(&AppEvent::MalformedRequest),
            DispatchOutcome::Failed => sink.emit(&AppEvent::ResponseFailed),
        }

        chan.disconnect();
        sink.emit(&AppEvent::RequestServiced(method));
        TickOutcome::Serviced(method)
    }

    fn housekeeping(store: &mut (impl ConfigPort + EventLogPort)) {
        if let Err(e) = ConfigPort::flush_pending(store) {
            warn!("housekeeping: config write-back failed: {}", e);
        }
        if let Err(e) = EventLogPort::flush_pending(store) {
            warn!("housekeeping: log write-back failed: {}", e);
        }
    }
}
