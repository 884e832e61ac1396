//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the serial
//! console through the `log` facade, one tagged line per event.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, SocketStatus};

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn socket_label(status: SocketStatus) -> &'static str {
    match status {
        SocketStatus::Established => "established",
        SocketStatus::Listening => "listening",
        SocketStatus::Closed => "closed",
        SocketStatus::Other => "unknown",
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | scheduler running"),
            AppEvent::Reading { value, socket } => {
                info!("TEMP  | {} | socket {}", value, socket_label(*socket));
            }
            AppEvent::Alarm(kind) => warn!("ALARM | {:?} (event {})", kind, kind.code()),
            AppEvent::ListenerOpened { port } => info!("NET   | listening on {}", port),
            AppEvent::RequestServiced(method) => {
                info!("HTTP  | {} serviced, connection closed", method.as_str());
            }
            AppEvent::WriteStub(method) => {
                info!("HTTP  | {} acknowledged (no-op)", method.as_str());
            }
            AppEvent::MalformedRequest => warn!("HTTP  | no recognised verb, closing"),
            AppEvent::ProtocolDefect(raw) => error!("HTTP  | protocol state {} invalid", raw),
            AppEvent::ResponseFailed => warn!("HTTP  | response not delivered"),
        }
    }
}
