// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Frame output buffering.
//
// A frame is every byte of one redraw: cursor hide, home, each visible row
// with its clear-to-end-of-line, the final cursor placement, cursor show.
// All of it accumulates in an `OutputBuffer` and leaves in one `write()`
// so a slow terminal never shows a half-drawn screen.
//
// The buffer lives for exactly one frame. The renderer creates it, fills
// it, and consumes it with `flush_to`; nothing carries over.
//
// `RawStdout` is the matching sink. `io::stdout()` is line-buffered and
// would split a multi-line frame at its last newline; writing to fd 1
// directly keeps the frame in one `write()`.

use std::io::{self, Write};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()` syscall.
///
/// Growth goes through `Vec`'s checked reallocation, so a frame of any size
/// either fits or aborts on allocation failure; there is no silent partial
/// append.
///
/// Default capacity: 4 KB, enough for an 80×24 screen of plain text.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 4096;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (4 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Create an empty buffer sized for a `cols × rows` screen plus escape
    /// overhead.
    #[must_use]
    pub fn for_screen(cols: usize, rows: usize) -> Self {
        // Each row carries at most `cols` bytes, `\x1b[K` and `\r\n`.
        let estimate = rows.saturating_mul(cols.saturating_add(5)).saturating_add(32);
        Self {
            buf: Vec::with_capacity(estimate.max(DEFAULT_CAPACITY)),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append raw bytes (row content, banner text).
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append `n` copies of `byte` (banner padding).
    pub fn push_repeated(&mut self, byte: u8, n: usize) {
        self.buf.resize(self.buf.len() + n, byte);
    }

    /// Write the whole frame to `w` with a single `write_all` and consume
    /// the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // No-op; the frame leaves through flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── RawStdout ───────────────────────────────────────────────────────────────

/// Unbuffered writer on the stdout file descriptor.
///
/// Each `write` is one `write(2)`; `write_all` only loops if the kernel
/// accepts a partial write.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawStdout;

#[cfg(unix)]
impl Write for RawStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe { libc::write(libc::STDOUT_FILENO, buf.as_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
        Ok(n as usize)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(not(unix))]
impl Write for RawStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi;

    /// Writer that records how many `write` calls it received.
    #[derive(Default)]
    struct CountingWriter {
        bytes: Vec<u8>,
        writes: usize,
    }

    impl Write for CountingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn new_buffer_is_empty() {
        let out = OutputBuffer::new();
        assert!(out.is_empty());
        assert_eq!(out.len(), 0);
    }

    #[test]
    fn default_is_new() {
        assert!(OutputBuffer::default().is_empty());
    }

    #[test]
    fn for_screen_reserves_capacity() {
        let out = OutputBuffer::for_screen(200, 60);
        assert!(out.buf.capacity() >= 200 * 60);
    }

    #[test]
    fn push_bytes_appends() {
        let mut out = OutputBuffer::new();
        out.push_bytes(b"hello");
        out.push_bytes(b" world");
        assert_eq!(out.as_bytes(), b"hello world");
    }

    #[test]
    fn push_repeated_pads() {
        let mut out = OutputBuffer::new();
        out.push_bytes(b"~");
        out.push_repeated(b' ', 3);
        assert_eq!(out.as_bytes(), b"~   ");
    }

    #[test]
    fn push_repeated_zero_is_noop() {
        let mut out = OutputBuffer::new();
        out.push_repeated(b' ', 0);
        assert!(out.is_empty());
    }

    #[test]
    fn write_trait_accumulates_escapes() {
        let mut out = OutputBuffer::new();
        ansi::cursor_hide(&mut out).unwrap();
        ansi::cursor_home(&mut out).unwrap();
        assert_eq!(out.as_bytes(), b"\x1b[?25l\x1b[H");
    }

    #[test]
    fn flush_to_writes_once() {
        let mut out = OutputBuffer::new();
        out.push_bytes(b"row one\r\n");
        out.push_bytes(b"row two");
        ansi::clear_line(&mut out).unwrap();

        let mut w = CountingWriter::default();
        out.flush_to(&mut w).unwrap();
        assert_eq!(w.writes, 1);
        assert_eq!(w.bytes, b"row one\r\nrow two\x1b[K");
    }

    #[test]
    fn raw_stdout_accepts_empty_write() {
        assert_eq!(RawStdout.write(b"").unwrap(), 0);
    }

    #[test]
    fn flush_empty_writes_nothing() {
        let mut w = CountingWriter::default();
        OutputBuffer::new().flush_to(&mut w).unwrap();
        assert_eq!(w.writes, 0);
    }
}
