//! Concrete state handler functions and table builder.
//!
//! Each state is a plain `fn` pointer over the cycle context and the
//! connection channel.  Handlers only inspect lines that have already
//! been received, so every loop below is bounded by the input on hand.
//!
//! ```text
//!  IDLE ──[line received]──▶ AWAITING_METHOD ──[verb line]──▶ AWAITING_HEADER_END
//!    ▲                             │                              │        │
//!    │                    [no verb, lines exhausted]      [blank, no body] │
//!    ├─────────────────────────────┘                              │  [blank, body pending]
//!    ├────────────────────────────────────────────────────────────┘        ▼
//!    └──────────────────────[blank]──────────────────────── AWAITING_BODY_END
//! ```

use log::{debug, info};

use super::{CycleContext, PendingMethod, ProtocolState, StateDescriptor};
use crate::app::ports::LineChannel;

/// Request-line prefixes, matched exactly and case-sensitively.  The
/// trailing space is part of the verb.
pub const VERB_TABLE: [(&[u8], PendingMethod); 3] = [
    (b"GET ", PendingMethod::Get),
    (b"PUT ", PendingMethod::Put),
    (b"DELETE ", PendingMethod::Delete),
];

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the state table.  Index `i` describes the state whose raw number
/// is `i`.
pub fn build_state_table() -> [StateDescriptor; ProtocolState::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: ProtocolState::Idle,
            name: "Idle",
            on_step: idle_step,
        },
        // Index 1: AwaitingMethod
        StateDescriptor {
            id: ProtocolState::AwaitingMethod,
            name: "AwaitingMethod",
            on_step: awaiting_method_step,
        },
        // Index 2: AwaitingHeaderEnd
        StateDescriptor {
            id: ProtocolState::AwaitingHeaderEnd,
            name: "AwaitingHeaderEnd",
            on_step: awaiting_header_end_step,
        },
        // Index 3: AwaitingBodyEnd
        StateDescriptor {
            id: ProtocolState::AwaitingBodyEnd,
            name: "AwaitingBodyEnd",
            on_step: awaiting_body_end_step,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_step(ctx: &mut CycleContext, chan: &mut dyn LineChannel) -> Option<ProtocolState> {
    if !chan.line_available() {
        return None;
    }
    // New cycle: nothing recorded yet.  The line itself is left for the
    // verb matcher.
    *ctx = CycleContext::default();
    Some(ProtocolState::AwaitingMethod)
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING_METHOD state
// ═══════════════════════════════════════════════════════════════════════════

/// Recognise the verb at the start of `chan`'s current line.
pub fn match_verb(chan: &dyn LineChannel) -> Option<PendingMethod> {
    VERB_TABLE
        .iter()
        .find(|(prefix, _)| chan.line_starts_with(prefix))
        .map(|&(_, method)| method)
}

fn awaiting_method_step(ctx: &mut CycleContext, chan: &mut dyn LineChannel) -> Option<ProtocolState> {
    while chan.line_available() {
        if chan.is_blank_line() {
            chan.flush_line();
            continue;
        }

        let verb = match_verb(chan);
        chan.flush_line();

        match verb {
            Some(method) => {
                debug!("protocol: request line {}", method.as_str());
                ctx.method = method;
                return Some(ProtocolState::AwaitingHeaderEnd);
            }
            None => ctx.rejected = true,
        }
    }

    if ctx.rejected {
        // No complete line left to try.  A trailing partial line does not
        // keep the connection open.
        info!("protocol: no recognised verb, dropping request");
        ctx.method = PendingMethod::None;
        ctx.completed = true;
        return Some(ProtocolState::Idle);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING_HEADER_END state
// ═══════════════════════════════════════════════════════════════════════════

fn awaiting_header_end_step(
    ctx: &mut CycleContext,
    chan: &mut dyn LineChannel,
) -> Option<ProtocolState> {
    while chan.line_available() {
        let blank = chan.is_blank_line();
        chan.flush_line();
        if !blank {
            continue;
        }

        if chan.bytes_pending() > 0 {
            return Some(ProtocolState::AwaitingBodyEnd);
        }
        ctx.completed = true;
        return Some(ProtocolState::Idle);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING_BODY_END state
// ═══════════════════════════════════════════════════════════════════════════

fn awaiting_body_end_step(
    ctx: &mut CycleContext,
    chan: &mut dyn LineChannel,
) -> Option<ProtocolState> {
    while chan.line_available() {
        let blank = chan.is_blank_line();
        chan.flush_line();
        if blank {
            ctx.completed = true;
            return Some(ProtocolState::Idle);
        }
    }
    None
}
