//! Host TCP adapter for the [`LineChannel`] port.
//!
//! A single-client, non-blocking server built on `std::net`.  It models
//! the appliance's hardware socket: exactly one connection at a time, the
//! server closes it after every exchange, and the scheduler reopens the
//! socket in listening mode once it reports [`SocketStatus::Closed`].
//!
//! ## Connection model
//!
//! 1. `open_listening()` binds `0.0.0.0:<port>` (non-blocking) the first
//!    time; later calls reuse the bound listener so queued clients are
//!    not lost between exchanges.
//! 2. `line_available()` polls for a client, then drains whatever the
//!    client has sent into a fixed [`LineBuffer`].  Reads never block.
//! 3. `disconnect()` shuts the client socket down and drops unread input.
//! 4. A client that hangs up is closed as soon as no complete line is
//!    left to parse.
//! 5. Writes switch the socket to blocking mode for their duration, with
//!    a timeout, so a response is never cut short by a full send buffer.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::{LineChannel, SocketStatus};
use crate::error::ChannelError;
use crate::protocol::line_buffer::{LineBuffer, RX_CAPACITY};

/// Longest a single response write may stall on a slow client.
const WRITE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct TcpLineChannel {
    status: SocketStatus,
    listener: Option<TcpListener>,
    stream: Option<TcpStream>,
    rx: LineBuffer<RX_CAPACITY>,
    /// The client sent EOF; buffered lines may still be parsed.
    peer_closed: bool,
}

impl Default for TcpLineChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl TcpLineChannel {
    /// A closed channel.  Nothing is bound until `open_listening`.
    pub fn new() -> Self {
        Self {
            status: SocketStatus::Closed,
            listener: None,
            stream: None,
            rx: LineBuffer::new(),
            peer_closed: false,
        }
    }

    /// The bound address, once listening.  Useful when port `0` was
    /// requested.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    fn bind(port: u16) -> Result<TcpListener, ChannelError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).map_err(|e| {
            warn!("TCP: bind to port {} failed: {}", port, e);
            ChannelError::ListenFailed
        })?;
        listener
            .set_nonblocking(true)
            .map_err(|_| ChannelError::ListenFailed)?;
        info!("TCP: listening on port {}", port);
        Ok(listener)
    }

    fn poll_accept(&mut self) {
        let Some(listener) = self.listener.as_ref() else {
            return;
        };
        match listener.accept() {
            Ok((stream, addr)) => {
                if stream.set_nonblocking(true).is_err() {
                    warn!("TCP: failed to set non-blocking on client socket");
                    return;
                }
                info!("TCP: client connected from {}", addr);
                self.stream = Some(stream);
                self.peer_closed = false;
                self.status = SocketStatus::Established;
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => warn!("TCP: accept error: {}", e),
        }
    }

    /// Move whatever the client has sent into the line buffer.
    fn poll_read(&mut self) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        let mut chunk = [0u8; RX_CAPACITY];
        while !self.peer_closed {
            let room = self.rx.spare_capacity();
            if room == 0 {
                break;
            }
            match stream.read(&mut chunk[..room]) {
                Ok(0) => {
                    debug!("TCP: client sent EOF");
                    self.peer_closed = true;
                }
                Ok(n) => {
                    self.rx.push(&chunk[..n]);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("TCP: read error: {}", e);
                    self.close();
                    return;
                }
            }
        }

        if self.peer_closed {
            if self.rx.has_line() {
                self.status = SocketStatus::Other;
            } else {
                info!("TCP: client disconnected");
                self.close();
            }
        }
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.rx.clear();
        self.peer_closed = false;
        self.status = SocketStatus::Closed;
    }
}

impl LineChannel for TcpLineChannel {
    fn status(&self) -> SocketStatus {
        self.status
    }

    fn open_listening(&mut self, port: u16) -> Result<(), ChannelError> {
        let rebind = match self.local_addr() {
            Some(addr) => port != 0 && addr.port() != port,
            None => true,
        };
        if rebind {
            self.listener = Some(Self::bind(port)?);
        }
        self.status = SocketStatus::Listening;
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.stream.is_some() {
            debug!("TCP: closing client connection");
        }
        self.close();
    }

    fn line_available(&mut self) -> bool {
        if self.status == SocketStatus::Listening {
            self.poll_accept();
        }
        self.poll_read();
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
    }

    fn bytes_pending(&self) -> usize {
        self.rx.len()
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        let stream = self.stream.as_mut().ok_or(ChannelError::NotConnected)?;
        // Writes block (bounded by WRITE_TIMEOUT) so a full send buffer
        // cannot cut a response short; reads stay non-blocking.
        stream
            .set_nonblocking(false)
            .and_then(|()| stream.set_write_timeout(Some(WRITE_TIMEOUT)))
            .map_err(|e| {
                warn!("TCP: cannot switch socket to blocking writes: {}", e);
                ChannelError::Io
            })?;
        let written = stream.write_all(data).and_then(|()| stream.flush());
        if let Err(e) = stream.set_nonblocking(true) {
            warn!("TCP: cannot restore non-blocking mode: {}", e);
        }
        written.map_err(|e| {
            warn!("TCP: write failed: {}", e);
            ChannelError::Io
        })
    }
}
