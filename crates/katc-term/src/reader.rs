// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Timed byte reads from the terminal.
//
// Raw mode configures stdin with VMIN=0, VTIME=1: `read()` returns as soon
// as a byte is available, or returns zero bytes after a tenth of a second.
// That timeout is what lets the key decoder tell a lone Escape keypress
// apart from the start of an escape sequence, and keeps the process from
// ever hanging indefinitely in `read()`.
//
// Everything above this module talks to a `ByteSource`, so the decoder and
// the dispatcher run the same way against the real terminal and against a
// scripted `Replay` in tests.

use std::collections::VecDeque;
use std::io;

use crate::error::TermError;

// ─── ByteSource ──────────────────────────────────────────────────────────────

/// One timed byte read.
///
/// `Ok(Some(b))` delivers a byte. `Ok(None)` means the read window elapsed
/// with nothing available; callers decide whether to retry or to treat it as
/// "the sequence ended here". `Err` is a real failure and is fatal.
pub trait ByteSource {
    /// Read at most one byte, waiting no longer than the read window.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying `read` fails for a reason other
    /// than a timeout or an interrupted call.
    fn read_byte(&mut self) -> Result<Option<u8>, TermError>;
}

// ─── StdinReader ─────────────────────────────────────────────────────────────

/// Reads the controlling terminal's stdin one byte at a time.
///
/// Relies on the read timeout installed by
/// [`RawMode`](crate::terminal::RawMode); outside raw mode a read blocks
/// until input (or EOF) arrives.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinReader;

impl StdinReader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl ByteSource for StdinReader {
    fn read_byte(&mut self) -> Result<Option<u8>, TermError> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };

        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    // EAGAIN: Cygwin-style timeout. EINTR: a signal landed mid-read.
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(TermError::Sys {
                        call: "read",
                        source: err,
                    }),
                }
            }
        }
    }
}

#[cfg(not(unix))]
impl ByteSource for StdinReader {
    fn read_byte(&mut self) -> Result<Option<u8>, TermError> {
        read_blocking(&mut io::stdin().lock())
    }
}

/// One byte from a reader with no read timeout.
///
/// Without VTIME a zero-byte read is end of input, not a timeout; retrying
/// it would spin forever, so it is an error.
#[cfg(any(test, not(unix)))]
fn read_blocking(r: &mut impl io::Read) -> Result<Option<u8>, TermError> {
    let mut byte = [0u8; 1];
    match r.read(&mut byte) {
        Ok(0) => Err(TermError::Sys {
            call: "read",
            source: io::Error::from(io::ErrorKind::UnexpectedEof),
        }),
        Ok(_) => Ok(Some(byte[0])),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(TermError::Sys {
            call: "read",
            source: e,
        }),
    }
}

// ─── Replay ──────────────────────────────────────────────────────────────────

/// A scripted byte source: yields its bytes in order, then times out
/// forever.
///
/// Used to drive the decoder and dispatcher without a terminal, and to
/// answer the cursor-position query in tests.
#[derive(Debug, Default, Clone)]
pub struct Replay {
    bytes: VecDeque<u8>,
}

impl Replay {
    /// Create a source that will deliver `bytes`.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.iter().copied().collect(),
        }
    }

    /// Bytes not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl ByteSource for Replay {
    fn read_byte(&mut self) -> Result<Option<u8>, TermError> {
        Ok(self.bytes.pop_front())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
