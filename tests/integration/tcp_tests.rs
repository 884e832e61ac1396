//! End-to-end test: the scheduler serving a real TCP client through the
//! host adapters.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use tempmon::adapters::eeprom::EepromAdapter;
use tempmon::adapters::hardware::HardwareAdapter;
use tempmon::adapters::store::DeviceStore;
use tempmon::adapters::tcp_channel::TcpLineChannel;
use tempmon::adapters::time::ManualClock;
use tempmon::alarm::AlarmMonitor;
use tempmon::app::ports::LineChannel;
use tempmon::app::service::{Monitor, TickOutcome};
use tempmon::config::SystemConfig;
use tempmon::drivers::status_led::StatusLed;
use tempmon::drivers::watchdog::Watchdog;
use tempmon::protocol::PendingMethod;
use tempmon::sensors::temperature::TemperatureSensor;
use tempmon::telemetry::Vpd;

use crate::mock_hw::{BOOT_TIME, RecordingSink};

#[test]
fn serves_get_over_tcp_and_closes() {
    let config = SystemConfig {
        http_port: 0,
        ..SystemConfig::default()
    };
    let mut store = DeviceStore::open(
        EepromAdapter::new(),
        ManualClock::new(BOOT_TIME),
        config.thresholds,
    );
    let mut hw = HardwareAdapter::new(
        TemperatureSensor::new(),
        Watchdog::new(config.watchdog_timeout_ms),
        StatusLed::new(),
    );
    let mut alarms = AlarmMonitor::new(config.alarm_hysteresis);
    let mut chan = TcpLineChannel::new();
    let mut sink = RecordingSink::default();
    let mut monitor = Monitor::new(config, Vpd::default());
    monitor.start(&mut hw, &mut alarms, &mut store, &mut sink);

    // First iteration binds the listener.
    monitor.tick(&mut hw, &mut alarms, &mut store, &mut chan, &mut sink);
    let port = chan.local_addr().expect("listening").port();

    let mut client = TcpStream::connect(SocketAddr::from(([127, 0, 0, 1], port))).unwrap();
    client
        .write_all(b"GET /device HTTP/1.1\r\nHost: tempmon\r\n\r\n")
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(2);
    let mut served = None;
    while Instant::now() < deadline {
        match monitor.tick(&mut hw, &mut alarms, &mut store, &mut chan, &mut sink) {
            TickOutcome::Serviced(method) => {
                served = Some(method);
                break;
            }
            _ => std::thread::sleep(Duration::from_millis(5)),
        }
    }
    assert_eq!(served, Some(PendingMethod::Get));
    assert!(hw.watchdog().feed_count() >= 2);

    client
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let mut reply = Vec::new();
    client.read_to_end(&mut reply).unwrap();
    let reply = String::from_utf8(reply).unwrap();
    assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"), "{reply}");
    assert!(reply.contains(r#""state":"NORMAL""#));
    assert!(reply.ends_with("]}\r\n"));
    assert_eq!(chan.status(), tempmon::app::ports::SocketStatus::Closed);
}
