//! Request-parsing finite state machine.
//!
//! Table-driven, in the same shape as the appliance's other embedded
//! state machines:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  StateTable (indexed by raw state number)                  │
//! │  ┌───┬───────────────────┬────────────────────────────────┐│
//! │  │ 0 │ Idle              │ line seen → AwaitingMethod     ││
//! │  │ 1 │ AwaitingMethod    │ verb line → AwaitingHeaderEnd  ││
//! │  │ 2 │ AwaitingHeaderEnd │ blank → AwaitingBodyEnd | Idle ││
//! │  │ 3 │ AwaitingBodyEnd   │ blank → Idle                   ││
//! │  └───┴───────────────────┴────────────────────────────────┘│
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The parser consumes lines from a [`LineChannel`] across as many
//! scheduler iterations as the input takes to arrive.  Each step only
//! looks at lines already received; it never waits on the network.  A
//! request cycle ends when the header (and optional body) terminator has
//! been discarded, or when the request line carries no recognised verb.
//! The recognised method is then handed out exactly once through
//! [`RequestParser::take_completed`].

pub mod line_buffer;
pub mod states;

use core::fmt;

use log::{error, trace};

use crate::app::ports::LineChannel;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Parser states.  Must stay in sync with [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProtocolState {
    Idle = 0,
    AwaitingMethod = 1,
    AwaitingHeaderEnd = 2,
    AwaitingBodyEnd = 3,
}

impl ProtocolState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 4;

    /// Decode a raw state number.  `None` for anything outside the table.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Idle),
            1 => Some(Self::AwaitingMethod),
            2 => Some(Self::AwaitingHeaderEnd),
            3 => Some(Self::AwaitingBodyEnd),
            _ => None,
        }
    }
}

/// Method recognised on the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PendingMethod {
    #[default]
    None,
    Get,
    Put,
    Delete,
}

impl PendingMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// The parser held a state number outside its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolDefect(pub u8);

impl fmt::Display for ProtocolDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid protocol state {}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Per-cycle context and state descriptors
// ---------------------------------------------------------------------------

/// Scratch state of the request cycle in progress, threaded through every
/// state handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleContext {
    /// Method recorded from the request line (set at most once per cycle).
    pub method: PendingMethod,
    /// The cycle has finished and is waiting to be dispatched.
    pub completed: bool,
    /// The verb search discarded a non-blank line that carried no verb.
    pub rejected: bool,
}

/// Signature for a state's step handler.
/// Returns `Some(next)` to transition, or `None` to stay.
pub type StepFn = fn(&mut CycleContext, &mut dyn LineChannel) -> Option<ProtocolState>;

/// Static descriptor for a single parser state.
pub struct StateDescriptor {
    pub id: ProtocolState,
    pub name: &'static str,
    pub on_step: StepFn,
}

// ---------------------------------------------------------------------------
// Parser engine
// ---------------------------------------------------------------------------

/// The request parser.  One instance per connection slot; it persists
/// across scheduler iterations so a partially received request resumes
/// where it stopped.
pub struct RequestParser {
    /// Fixed-size table indexed by raw state number.
    table: [StateDescriptor; ProtocolState::COUNT],
    /// Raw number of the current state.
    current: u8,
    cycle: CycleContext,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            table: states::build_state_table(),
            current: ProtocolState::Idle as u8,
            cycle: CycleContext::default(),
        }
    }

    /// Current state, or `None` if the parser holds an invalid state.
    pub fn state(&self) -> Option<ProtocolState> {
        ProtocolState::from_raw(self.current)
    }

    /// Method recorded so far in the current cycle.
    pub fn pending_method(&self) -> PendingMethod {
        self.cycle.method
    }

    /// A request cycle has finished and awaits [`take_completed`](Self::take_completed).
    pub fn is_complete(&self) -> bool {
        self.cycle.completed
    }

    /// Run one step of the current state's handler.
    pub fn step(&mut self, chan: &mut dyn LineChannel) -> Result<(), ProtocolDefect> {
        let Some(desc) = self.table.get(self.current as usize) else {
            error!("protocol: invalid state {}, step ignored", self.current);
            return Err(ProtocolDefect(self.current));
        };

        if let Some(next) = (desc.on_step)(&mut self.cycle, chan) {
            trace!(
                "protocol: {} -> {}",
                desc.name,
                self.table[next as usize].name
            );
            self.current = next as u8;
        }
        Ok(())
    }

    /// Step the parser until no complete line remains or the current
    /// cycle completes.  Every step either consumes a line or changes
    /// state, so the loop is bounded by the input already received.
    pub fn service(&mut self, chan: &mut dyn LineChannel) -> Result<(), ProtocolDefect> {
        while !self.cycle.completed && chan.line_available() {
            self.step(chan)?;
        }
        Ok(())
    }

    /// Hand out the method of a completed cycle, exactly once, and leave
    /// the parser in `Idle` with `PendingMethod::None`.
    pub fn take_completed(&mut self) -> Option<PendingMethod> {
        if !self.cycle.completed {
            return None;
        }
        let method = self.cycle.method;
        self.cycle = CycleContext::default();
        self.current = ProtocolState::Idle as u8;
        Some(method)
    }

    /// Abandon any cycle in progress (connection reset).
    pub fn reset(&mut self) {
        self.cycle = CycleContext::default();
        self.current = ProtocolState::Idle as u8;
    }
}
