//! In-memory [`LineChannel`] adapter.
//!
//! Stands in for the socket when the scheduler runs without a network:
//! the test harness, the fuzz target and the property tests push client
//! bytes in with [`receive`](LoopbackChannel::receive) and read the
//! response back from [`output`](LoopbackChannel::output).

use crate::app::ports::{LineChannel, SocketStatus};
use crate::error::ChannelError;
use crate::protocol::line_buffer::LineBuffer;

/// Line buffer size for the loopback channel.
const LOOPBACK_RX_CAPACITY: usize = 512;

#[derive(Debug)]
pub struct LoopbackChannel {
    status: SocketStatus,
    rx: LineBuffer<LOOPBACK_RX_CAPACITY>,
    /// Bytes "on the wire" that did not fit into `rx` yet.
    backlog: Vec<u8>,
    tx: Vec<u8>,
    port: Option<u16>,
    opens: u32,
    disconnects: u32,
    fail_writes: bool,
}

impl Default for LoopbackChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackChannel {
    /// A closed channel; the scheduler will open it on its first pass.
    pub fn new() -> Self {
        Self {
            status: SocketStatus::Closed,
            rx: LineBuffer::new(),
            backlog: Vec::new(),
            tx: Vec::new(),
            port: None,
            opens: 0,
            disconnects: 0,
            fail_writes: false,
        }
    }

    /// A channel with a client already connected.
    pub fn connected() -> Self {
        Self {
            status: SocketStatus::Established,
            ..Self::new()
        }
    }

    /// Simulate a client connecting to the listening socket.
    pub fn accept(&mut self) -> bool {
        if self.status != SocketStatus::Listening {
            return false;
        }
        self.status = SocketStatus::Established;
        true
    }

    /// Simulate bytes arriving from the client.
    pub fn receive(&mut self, data: &[u8]) {
        self.backlog.extend_from_slice(data);
        self.refill();
    }

    /// Force the socket status, e.g. to model a transitional state.
    pub fn set_status(&mut self, status: SocketStatus) {
        self.status = status;
    }

    /// Make every subsequent write fail with an I/O error.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Everything written to the client so far.
    pub fn output(&self) -> &[u8] {
        &self.tx
    }

    /// Take the written bytes, leaving the output empty.
    pub fn take_output(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }

    /// Port passed to the most recent `open_listening`.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn open_count(&self) -> u32 {
        self.opens
    }

    pub fn disconnect_count(&self) -> u32 {
        self.disconnects
    }

    fn refill(&mut self) {
        if self.backlog.is_empty() {
            return;
        }
        let n = self.rx.push(&self.backlog);
        self.backlog.drain(..n);
    }
}

impl LineChannel for LoopbackChannel {
    fn status(&self) -> SocketStatus {
        self.status
    }

    fn open_listening(&mut self, port: u16) -> Result<(), ChannelError> {
        self.port = Some(port);
        self.opens += 1;
        self.status = SocketStatus::Listening;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.disconnects += 1;
        self.rx.clear();
        self.backlog.clear();
        self.status = SocketStatus::Closed;
    }

    fn line_available(&mut self) -> bool {
        self.refill();
        self.rx.has_line()
    }

    fn line_starts_with(&self, prefix: &[u8]) -> bool {
        self.rx.line_starts_with(prefix)
    }

    fn is_blank_line(&self) -> bool {
        self.rx.is_blank_line()
    }

    fn flush_line(&mut self) {
        self.rx.consume_line();
        self.refill();
    }

    fn bytes_pending(&self) -> usize {
        self.rx.len() + self.backlog.len()
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        if self.status != SocketStatus::Established {
            return Err(ChannelError::NotConnected);
        }
        if self.fail_writes {
            return Err(ChannelError::Io);
        }
        self.tx.extend_from_slice(data);
        Ok(())
    }
}
