//! Outbound application events.
//!
//! The [`Monitor`](super::service::Monitor) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to the serial console, count
//! them in a test, etc.

use crate::protocol::PendingMethod;
use crate::telemetry::EventKind;

use super::ports::SocketStatus;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Boot sequence finished; the scheduler loop is about to run.
    Started,

    /// The sensor poll fired.
    Reading { value: i32, socket: SocketStatus },

    /// The alarm classifier escalated.
    Alarm(EventKind),

    /// The listening socket was (re)opened.
    ListenerOpened { port: u16 },

    /// A request cycle completed and the connection was closed.
    RequestServiced(PendingMethod),

    /// A write-method stub was acknowledged (PUT / DELETE).
    WriteStub(PendingMethod),

    /// No recognised verb on the request line.
    MalformedRequest,

    /// The protocol state machine held an impossible state.
    ProtocolDefect(u8),

    /// A response could not be produced or written.
    ResponseFailed,
}
