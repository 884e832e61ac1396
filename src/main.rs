//! TempMon: host simulation of the temperature-monitor appliance.
//!
//! Runs the same cyclic scheduler as the appliance against host
//! adapters: a real TCP listener for the API, an in-memory EEPROM and a
//! simulated sensor.
//!
//! ```text
//! tempmon [config.json]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).  `TEMPMON_SIM_TEMP`
//! sets the simulated sensor reading in whole degrees.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use tempmon::adapters::eeprom::EepromAdapter;
use tempmon::adapters::hardware::HardwareAdapter;
use tempmon::adapters::log_sink::LogEventSink;
use tempmon::adapters::store::DeviceStore;
use tempmon::adapters::tcp_channel::TcpLineChannel;
use tempmon::adapters::time::SystemClock;
use tempmon::alarm::{AlarmLevel, AlarmMonitor};
use tempmon::app::ports::LineChannel;
use tempmon::app::service::{Monitor, TickOutcome};
use tempmon::config::SystemConfig;
use tempmon::drivers::status_led::{BlinkPattern, StatusLed};
use tempmon::drivers::watchdog::Watchdog;
use tempmon::error::Error;
use tempmon::sensors::temperature::{TemperatureSensor, sim_set_temperature};

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logger init failed: {e}"))
}

/// Load the JSON configuration at `path`, falling back to defaults when
/// it is missing or unreadable.
fn load_config(path: Option<&Path>) -> SystemConfig {
    let Some(path) = path else {
        info!("Config: none given, using defaults");
        return SystemConfig::default();
    };
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Config: cannot read {} ({}), using defaults", path.display(), e);
            return SystemConfig::default();
        }
    };
    match serde_json::from_str(&text) {
        Ok(config) => {
            info!("Config: loaded {}", path.display());
            config
        }
        Err(e) => {
            warn!("Config: {} is invalid ({}), using defaults", path.display(), e);
            SystemConfig::default()
        }
    }
}

fn main() -> Result<()> {
    init_logging()?;
    let clock = SystemClock::new();

    info!("╔══════════════════════════════════════╗");
    info!("║  TempMon v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 1. Configuration ──────────────────────────────────────
    let arg = std::env::args_os().nth(1);
    let config = load_config(arg.as_deref().map(Path::new));
    config
        .thresholds
        .validate()
        .map_err(|msg| anyhow::anyhow!("factory thresholds rejected: {msg}"))?;

    // ── 2. Persistent state ───────────────────────────────────
    let mut store = DeviceStore::open(EepromAdapter::new(), SystemClock::new(), config.thresholds);

    // ── 3. Peripherals ────────────────────────────────────────
    let mut hw = HardwareAdapter::new(
        TemperatureSensor::new(),
        Watchdog::new(config.watchdog_timeout_ms),
        StatusLed::new(),
    );
    let mut alarms = AlarmMonitor::new(config.alarm_hysteresis);
    if let Ok(raw) = std::env::var("TEMPMON_SIM_TEMP") {
        match raw.trim().parse::<i32>() {
            Ok(degrees) => {
                info!("Sensor(sim): reading fixed at {}", degrees);
                sim_set_temperature(degrees);
            }
            Err(_) => warn!("Sensor(sim): ignoring TEMPMON_SIM_TEMP={:?}", raw),
        }
    }

    // ── 4. Network ────────────────────────────────────────────
    let mut chan = TcpLineChannel::new();
    chan.open_listening(config.http_port)
        .map_err(Error::from)
        .with_context(|| format!("opening API port {}", config.http_port))?;
    let mut sink = LogEventSink::new();

    // ── 5. Scheduler ──────────────────────────────────────────
    let idle_pause = Duration::from_millis(u64::from(config.idle_pause_ms));
    let mut monitor = Monitor::new(config, store.vpd().clone());
    monitor.start(&mut hw, &mut alarms, &mut store, &mut sink);
    info!("System ready in {} ms. Entering scheduler loop.", clock.uptime_ms());

    loop {
        let outcome = monitor.tick(&mut hw, &mut alarms, &mut store, &mut chan, &mut sink);

        let pattern = if alarms.level() == AlarmLevel::Normal {
            BlinkPattern::Heartbeat
        } else {
            BlinkPattern::FastBlink
        };
        hw.led_mut().set_pattern(pattern);

        if outcome == TickOutcome::Housekeeping {
            std::thread::sleep(idle_pause);
        }
    }
}
