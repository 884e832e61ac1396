//! Fuzz target: `RequestParser::service`
//!
//! Splits arbitrary input at its first byte into two deliveries and drives
//! the request parser over a loopback channel.  The parser must never
//! panic, never hit an invalid state, and always return to Idle once a
//! completed request has been taken.
//!
//! cargo fuzz run fuzz_request_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use tempmon::adapters::loopback::LoopbackChannel;
use tempmon::app::ports::LineChannel;
use tempmon::protocol::{PendingMethod, ProtocolState, RequestParser};

fuzz_target!(|data: &[u8]| {
    let Some((&cut, rest)) = data.split_first() else {
        return;
    };
    let (first, second) = rest.split_at((cut as usize).min(rest.len()));

    let mut chan = LoopbackChannel::connected();
    let mut parser = RequestParser::new();

    for chunk in [first, second] {
        chan.receive(chunk);
        assert!(parser.service(&mut chan).is_ok(), "parser reached an invalid state");
        if parser.is_complete() {
            let method = parser.take_completed();
            assert!(method.is_some());
            assert_eq!(parser.state(), Some(ProtocolState::Idle));
            assert_eq!(parser.pending_method(), PendingMethod::None);
            chan.disconnect();
            return;
        }
        assert!(!chan.line_available(), "a complete line was left unparsed");
    }
});
