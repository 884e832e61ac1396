//! Mock adapters for integration tests.
//!
//! Records every port call so tests can assert on the full history of a
//! scheduler run without real peripherals.  Storage and the connection
//! use the crate's own in-memory adapters.

use tempmon::adapters::eeprom::EepromAdapter;
use tempmon::adapters::loopback::LoopbackChannel;
use tempmon::adapters::store::DeviceStore;
use tempmon::adapters::time::ManualClock;
use tempmon::app::events::AppEvent;
use tempmon::app::ports::{
    AlarmPort, EventSink, IndicatorPort, PollTimer, SensorPort, WatchdogPort,
};
use tempmon::app::service::{Monitor, TickOutcome};
use tempmon::config::{SystemConfig, Thresholds};
use tempmon::telemetry::{EventKind, Vpd};

/// Boot time used by every rig: 2019-12-06 14:03:09 UTC.
pub const BOOT_TIME: u32 = 1_575_640_989;

// ── MockHardware ──────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockHardware {
    pub feeds: u32,
    pub indicator_updates: u32,
    pub conversions: u32,
    pub armed: Vec<u32>,
    /// The poll countdown reports expiry.
    pub poll_due: bool,
    pub temperature: i32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(temperature: i32) -> Self {
        Self {
            temperature,
            ..Self::default()
        }
    }
}

impl SensorPort for MockHardware {
    fn start_conversion(&mut self) {
        self.conversions += 1;
    }

    fn read(&mut self) -> i32 {
        self.temperature
    }
}

impl WatchdogPort for MockHardware {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

impl IndicatorPort for MockHardware {
    fn update(&mut self) {
        self.indicator_updates += 1;
    }
}

impl PollTimer for MockHardware {
    fn arm(&mut self, ms: u32) {
        self.armed.push(ms);
        self.poll_due = false;
    }

    fn is_done(&self) -> bool {
        self.poll_due
    }
}

// ── MockAlarms ────────────────────────────────────────────────

/// Raises `raise_at_or_above`'s alarm for any reading at or above it.
#[derive(Debug, Default)]
pub struct MockAlarms {
    pub raise_at_or_above: Option<i32>,
    pub updates: Vec<(i32, Thresholds)>,
    pub announced: Vec<EventKind>,
}

impl AlarmPort for MockAlarms {
    fn update(&mut self, reading: i32, thresholds: &Thresholds) -> Option<EventKind> {
        self.updates.push((reading, *thresholds));
        match self.raise_at_or_above {
            Some(limit) if reading >= limit => Some(EventKind::HiAlarm),
            _ => None,
        }
    }

    fn announce(&mut self, event: EventKind) {
        self.announced.push(event);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, wanted: &AppEvent) -> usize {
        self.events.iter().filter(|e| *e == wanted).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig: everything a scheduler run needs ─────────────────────

pub type TestStore = DeviceStore<EepromAdapter, ManualClock>;

pub struct Rig {
    pub monitor: Monitor,
    pub hw: MockHardware,
    pub alarms: MockAlarms,
    pub store: TestStore,
    pub chan: LoopbackChannel,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    /// A booted rig with a connected client and the default config.
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        let store = DeviceStore::open(
            EepromAdapter::new(),
            ManualClock::new(BOOT_TIME),
            config.thresholds,
        );
        let mut rig = Self {
            monitor: Monitor::new(config, Vpd::default()),
            hw: MockHardware::new(72),
            alarms: MockAlarms::default(),
            store,
            chan: LoopbackChannel::connected(),
            sink: RecordingSink::default(),
        };
        rig.monitor
            .start(&mut rig.hw, &mut rig.alarms, &mut rig.store, &mut rig.sink);
        rig
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.monitor.tick(
            &mut self.hw,
            &mut self.alarms,
            &mut self.store,
            &mut self.chan,
            &mut self.sink,
        )
    }

    /// Deliver `data` from the client, then run one iteration.
    pub fn send(&mut self, data: &[u8]) -> TickOutcome {
        self.chan.receive(data);
        self.tick()
    }

    /// Connect a fresh client once the previous one was closed.
    pub fn reconnect(&mut self) {
        // The next tick reopens the listener; then the client arrives.
        self.tick();
        assert!(self.chan.accept(), "listener was not reopened");
    }
}
