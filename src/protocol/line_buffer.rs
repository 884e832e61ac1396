//! Fixed-capacity receive buffer with line framing.
//!
//! Shared by every [`LineChannel`](crate::app::ports::LineChannel)
//! adapter.  Lines end in `\n`; a preceding `\r` is stripped when the
//! line is inspected.  When the buffer fills up without a line ending
//! the whole buffer is surfaced as one (truncated) line, so a client
//! can never wedge the parser with an over-long line.  If such a
//! truncated line ended in `\r`, a `\n` arriving next completes it and
//! is dropped rather than read as a blank line.

/// Receive buffer size used by the socket adapters.
pub const RX_CAPACITY: usize = 256;

/// Line-framed receive buffer holding at most `N` bytes.
#[derive(Debug, Default)]
pub struct LineBuffer<const N: usize> {
    buf: heapless::Vec<u8, N>,
    /// The last truncated line ended in `\r`; a leading `\n` belongs to it.
    skip_lf: bool,
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buf: heapless::Vec::new(),
            skip_lf: false,
        }
    }

    /// Append received bytes.  Returns how many fit; the caller keeps the
    /// rest for a later push.
    pub fn push(&mut self, mut data: &[u8]) -> usize {
        let mut skipped = 0;
        if self.skip_lf && !data.is_empty() {
            self.skip_lf = false;
            if let Some(rest) = data.strip_prefix(b"\n") {
                data = rest;
                skipped = 1;
            }
        }
        let n = data.len().min(self.spare_capacity());
        // Cannot fail: `n` is bounded by the spare capacity.
        let _ = self.buf.extend_from_slice(&data[..n]);
        n + skipped
    }

    /// Bytes that can still be pushed.
    pub fn spare_capacity(&self) -> usize {
        N - self.buf.len()
    }

    /// Bytes held, complete lines or not.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.skip_lf = false;
    }

    /// Number of bytes the current line occupies, terminator included.
    fn line_span(&self) -> Option<usize> {
        match self.buf.iter().position(|&b| b == b'\n') {
            Some(i) => Some(i + 1),
            None if self.buf.is_full() => Some(self.buf.len()),
            None => None,
        }
    }

    /// A complete (or truncated) line is ready.
    pub fn has_line(&self) -> bool {
        self.line_span().is_some()
    }

    /// Content of the current line without its terminator.
    pub fn line(&self) -> Option<&[u8]> {
        let span = self.line_span()?;
        let mut line = &self.buf[..span];
        if let Some(rest) = line.strip_suffix(b"\n") {
            line = rest;
        }
        if let Some(rest) = line.strip_suffix(b"\r") {
            line = rest;
        }
        Some(line)
    }

    pub fn line_starts_with(&self, prefix: &[u8]) -> bool {
        self.line().is_some_and(|l| l.starts_with(prefix))
    }

    pub fn is_blank_line(&self) -> bool {
        self.line().is_some_and(<[u8]>::is_empty)
    }

    /// Discard the current line.  No-op without a complete line.
    pub fn consume_line(&mut self) {
        let Some(span) = self.line_span() else {
            return;
        };
        if self.buf[span - 1] != b'\n' {
            self.skip_lf = self.buf[span - 1] == b'\r';
        }
        let len = self.buf.len();
        self.buf.copy_within(span..len, 0);
        self.buf.truncate(len - span);
    }
}
