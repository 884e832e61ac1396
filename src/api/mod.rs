//! Request dispatcher.
//!
//! Turns the method recognised by the parser into at most one response
//! on the connection.  The scheduler closes the connection afterwards,
//! whatever the outcome.
//!
//! | Method | Response                                       |
//! |--------|------------------------------------------------|
//! | GET    | `200 OK` + device report (JSON)                |
//! | PUT    | none; acknowledged on the console (reserved)   |
//! | DELETE | none; acknowledged on the console (reserved)   |
//! | None   | none                                           |

pub mod report;
pub mod writer;

use log::{debug, error, info, warn};

use crate::app::ports::{EventLogPort, LineChannel};
use crate::config::Thresholds;
use crate::protocol::PendingMethod;
use crate::telemetry::Vpd;
use report::DeviceReport;
use writer::ResponseWriter;

/// Read-only view of the device state a response may report.
pub struct Snapshot<'a> {
    pub vpd: &'a Vpd,
    pub thresholds: Thresholds,
    pub temperature: i32,
    pub log: &'a dyn EventLogPort,
}

/// What the dispatcher did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A complete response was written.
    Responded,
    /// A reserved write method was acknowledged; nothing was written.
    Acknowledged,
    /// No method was recognised; nothing was written.
    Ignored,
    /// The response could not be produced or delivered.
    Failed,
}

/// Serve `method` on `chan`.
pub fn dispatch(
    method: PendingMethod,
    snapshot: &Snapshot<'_>,
    chan: &mut dyn LineChannel,
) -> DispatchOutcome {
    match method {
        PendingMethod::Get => serve_report(snapshot, chan),
        // PUT is reserved for threshold writes and DELETE for clearing the
        // event log; neither has a defined payload yet, so nothing changes.
        PendingMethod::Put | PendingMethod::Delete => {
            if let Some(note) = acknowledgement(method) {
                info!("{}", note);
            }
            DispatchOutcome::Acknowledged
        }
        PendingMethod::None => {
            debug!("dispatch: no method, nothing to send");
            DispatchOutcome::Ignored
        }
    }
}

/// Console line acknowledging a reserved write method.
pub fn acknowledgement(method: PendingMethod) -> Option<&'static str> {
    match method {
        PendingMethod::Put => Some("PUT command received, no action taken"),
        PendingMethod::Delete => Some("DELETE command received, no action taken"),
        PendingMethod::Get | PendingMethod::None => None,
    }
}

fn serve_report(snapshot: &Snapshot<'_>, chan: &mut dyn LineChannel) -> DispatchOutcome {
    let report = DeviceReport::new(
        snapshot.vpd,
        snapshot.thresholds,
        snapshot.temperature,
        snapshot.log,
    );
    let body = match report.to_json() {
        Ok(body) => body,
        Err(e) => {
            error!("GET: report serialization failed: {}", e);
            return DispatchOutcome::Failed;
        }
    };

    match ResponseWriter::new(chan).json_ok(&body) {
        Ok(()) => {
            info!("GET command, {} byte report sent", body.len());
            DispatchOutcome::Responded
        }
        Err(e) => {
            warn!("GET: response write failed: {}", e);
            DispatchOutcome::Failed
        }
    }
}
