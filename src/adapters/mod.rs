//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements                      | Connects to              |
//! |---------------|---------------------------------|--------------------------|
//! | `tcp_channel` | LineChannel                     | Host TCP stack           |
//! | `loopback`    | LineChannel                     | In-memory byte queues    |
//! | `hardware`    | SensorPort, WatchdogPort        | Sensor, watchdog         |
//! |               | IndicatorPort, PollTimer        | Status LED, countdown    |
//! | `eeprom`      | StoragePort                     | EEPROM (in-memory sim)   |
//! | `store`       | ConfigPort, EventLogPort        | Any StoragePort          |
//! | `log_sink`    | EventSink                       | Serial log output        |
//! | `time`        | WallClock                       | System / manual clock    |

pub mod eeprom;
pub mod hardware;
pub mod log_sink;
pub mod loopback;
pub mod store;
pub mod tcp_channel;
pub mod time;
