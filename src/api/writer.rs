//! Response writer: the status line, headers and body framing of the
//! single response sent per connection.

use core::fmt::Write as _;

use crate::app::ports::LineChannel;
use crate::error::ChannelError;

/// Media type of every JSON body the appliance serves.
pub const CONTENT_TYPE_JSON: &str = "application/vnd.api+json";

pub struct ResponseWriter<'a> {
    chan: &'a mut dyn LineChannel,
}

impl<'a> ResponseWriter<'a> {
    pub fn new(chan: &'a mut dyn LineChannel) -> Self {
        Self { chan }
    }

    /// `HTTP/1.1 <code> <reason>`
    pub fn status_line(&mut self, code: u16, reason: &str) -> Result<(), ChannelError> {
        let mut line: heapless::String<48> = heapless::String::new();
        write!(line, "HTTP/1.1 {} {}\r\n", code, reason).map_err(|_| ChannelError::Io)?;
        self.chan.write_str(&line)
    }

    pub fn header(&mut self, name: &str, value: &str) -> Result<(), ChannelError> {
        self.chan.write_str(name)?;
        self.chan.write_str(": ")?;
        self.chan.write_str(value)?;
        self.chan.write_str("\r\n")
    }

    /// The blank line separating headers from the body.
    pub fn end_headers(&mut self) -> Result<(), ChannelError> {
        self.chan.write_str("\r\n")
    }

    /// Body bytes followed by a closing line break.
    pub fn body(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        self.chan.write_bytes(bytes)?;
        self.chan.write_str("\r\n")
    }

    /// A complete `200 OK` JSON response that closes the connection.
    pub fn json_ok(&mut self, body: &[u8]) -> Result<(), ChannelError> {
        self.status_line(200, "OK")?;
        self.header("Content-Type", CONTENT_TYPE_JSON)?;
        self.header("Connection", "close")?;
        self.end_headers()?;
        self.body(body)
    }
}
