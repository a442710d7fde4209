// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, screen size, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd writes. These are
// the standard POSIX interfaces for terminal control; there is no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// `RawMode` is a scoped guard: `enable` snapshots the terminal's termios
// and switches to raw mode, `Drop` puts the snapshot back. Whatever way the
// viewer leaves its main scope (quit, fatal error, panic unwinding) the
// original configuration is restored exactly once.
//
// The panic hook covers the one path a destructor can miss: a panic while
// stdout's lock is held. It writes a pre-built clear-and-home sequence
// straight to fd 1 and restores termios from a process-wide backup, then
// hands over to the original hook so the message prints on a sane terminal.

use std::io::Write;
use std::sync::{Mutex, Once};

use tracing::{debug, error, warn};

use crate::ansi;
use crate::error::TermError;
use crate::input::{parse_cursor_report, read_cursor_report};
use crate::reader::ByteSource;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: usize,
    /// Number of rows (height in character cells).
    pub rows: usize,
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// kernel reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: usize::from(ws.ws_col),
            rows: usize::from(ws.ws_row),
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Measure the screen by parking the cursor in the bottom-right corner and
/// asking the terminal where it ended up.
///
/// `out` receives the movement and query sequences; `input` supplies the
/// terminal's `ESC [ <row> ; <col> R` reply.
///
/// # Errors
///
/// Returns [`TermError::WindowSize`] if the reply is missing, malformed, or
/// reports a zero dimension, and [`TermError::Write`] if `out` fails.
pub fn size_from_cursor_report(
    out: &mut impl Write,
    input: &mut impl ByteSource,
) -> Result<Size, TermError> {
    ansi::cursor_far_corner(out)?;
    ansi::request_cursor_position(out)?;
    out.flush()?;

    let reply = read_cursor_report(input)?;
    let (rows, cols) = parse_cursor_report(&reply).ok_or(TermError::WindowSize {
        reason: "malformed cursor position report",
    })?;

    if rows == 0 || cols == 0 {
        return Err(TermError::WindowSize {
            reason: "terminal reported a zero dimension",
        });
    }
    Ok(Size { cols, rows })
}

/// Screen size for the viewer: `TIOCGWINSZ` first, the cursor-report probe
/// when that is unavailable.
///
/// Queried once at startup; live resizes are not tracked.
///
/// # Errors
///
/// Returns an error when both methods fail.
pub fn window_size(out: &mut impl Write, input: &mut impl ByteSource) -> Result<Size, TermError> {
    if let Some(size) = get_size() {
        debug!(?size, "window size from TIOCGWINSZ");
        return Ok(size);
    }

    warn!("TIOCGWINSZ unavailable, probing with cursor position report");
    size_from_cursor_report(out, input)
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// [`RawMode`] owns its own copy, but the panic hook can't reach it. This
/// backup, behind a [`Mutex`] rather than `static mut`, lets the hook
/// restore the terminal without the guard.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Emergency restore sequence: clear screen, home cursor, show cursor.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[2J\x1b[H\x1b[?25h";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal with no
/// echo and no line editing, and the message itself comes out staircased
/// because output post-processing is off.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write [`EMERGENCY_RESTORE`] directly to stdout's file descriptor.
///
/// Bypasses Rust's `io::stdout()` lock to avoid deadlocking if the panic
/// occurred while the lock was held (e.g., mid-frame flush).
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(EMERGENCY_RESTORE);
        let _ = stdout.flush();
    }
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// Raw-mode guard with RAII cleanup.
///
/// While alive, stdin delivers bytes one at a time with no echo, no line
/// buffering, no signal keys, no flow control and no CR/LF translation;
/// output post-processing is off. Reads return as soon as a byte is
/// available or after 100 ms with nothing.
///
/// # Example
///
/// ```no_run
/// use katc_term::terminal::RawMode;
///
/// let raw = RawMode::enable()?;
/// // ... draw frames, read keys ...
/// raw.disable()?; // or just let it drop
/// # Ok::<(), katc_term::TermError>(())
/// ```
pub struct RawMode {
    /// Original termios saved before entering raw mode. `None` once
    /// restored.
    #[cfg(unix)]
    original: Option<libc::termios>,
}

impl RawMode {
    /// Snapshot the terminal configuration and switch to raw mode.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Sys`] tagged `tcgetattr` if stdin is not a
    /// terminal or its attributes cannot be read, and `tcsetattr` if the
    /// raw configuration cannot be applied.
    #[cfg(unix)]
    pub fn enable() -> Result<Self, TermError> {
        let fd = libc::STDIN_FILENO;

        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut termios) } != 0 {
            return Err(TermError::last_os("tcgetattr"));
        }

        // The guard owns the snapshot from here on, so even a failed
        // tcsetattr below leads to a restore attempt on drop.
        let guard = Self {
            original: Some(termios),
        };
        if let Ok(mut backup) = TERMIOS_BACKUP.lock() {
            *backup = Some(termios);
        }
        install_panic_hook();

        let raw_attrs = raw_termios(termios);
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const raw_attrs) } != 0 {
            return Err(TermError::last_os("tcsetattr"));
        }

        debug!("raw mode enabled");
        Ok(guard)
    }

    #[cfg(not(unix))]
    pub fn enable() -> Result<Self, TermError> {
        install_panic_hook();
        Ok(Self {})
    }

    /// Restore the captured configuration now instead of at drop.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Sys`] tagged `tcsetattr` if the restore fails.
    pub fn disable(mut self) -> Result<(), TermError> {
        self.restore()
    }

    #[cfg(unix)]
    fn restore(&mut self) -> Result<(), TermError> {
        let Some(original) = self.original.take() else {
            return Ok(());
        };

        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original) }
            != 0
        {
            return Err(TermError::last_os("tcsetattr"));
        }

        // Clear the global backup — we've restored successfully.
        if let Ok(mut backup) = TERMIOS_BACKUP.lock() {
            *backup = None;
        }

        debug!("raw mode disabled");
        Ok(())
    }

    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps)]
    fn restore(&mut self) -> Result<(), TermError> {
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            error!(error = %e, "failed to restore terminal");
        }
    }
}

/// Derive the raw configuration from the captured one.
#[cfg(unix)]
fn raw_termios(mut termios: libc::termios) -> libc::termios {
    // Input: no break-to-SIGINT, no CR→NL, no parity check, no 8th-bit
    // strip, no Ctrl-S/Ctrl-Q flow control.
    termios.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    // Output: no "\n" → "\r\n" post-processing.
    termios.c_oflag &= !libc::OPOST;
    // 8-bit characters.
    termios.c_cflag |= libc::CS8;
    // Local: no echo, byte-at-a-time, no Ctrl-C/Ctrl-Z, no Ctrl-V.
    termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

    // VMIN=0, VTIME=1: return whatever is available, or nothing after 100 ms.
    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = 1;
    termios
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Replay;
    use pretty_assertions::assert_eq;

    // ── Terminal queries ─────────────────────────────────────────────

    #[test]
    fn get_size_does_not_panic() {
        if let Some(size) = get_size() {
            assert!(size.cols > 0 && size.rows > 0);
        }
    }

    // ── Cursor-report fallback ───────────────────────────────────────

    #[test]
    fn cursor_report_probe_writes_query_and_parses_reply() {
        let mut out = Vec::new();
        let mut input = Replay::new(b"\x1b[24;80R");
        let size = size_from_cursor_report(&mut out, &mut input).unwrap();

        assert_eq!(size, Size { cols: 80, rows: 24 });
        assert_eq!(out, b"\x1b[999C\x1b[999B\x1b[6n");
    }

    #[test]
    fn cursor_report_probe_without_reply_fails() {
        let mut out = Vec::new();
        let err = size_from_cursor_report(&mut out, &mut Replay::default()).unwrap_err();
        assert!(matches!(err, TermError::WindowSize { .. }));
    }

    #[test]
    fn cursor_report_probe_rejects_garbage() {
        let mut out = Vec::new();
        let mut input = Replay::new(b"hello");
        let err = size_from_cursor_report(&mut out, &mut input).unwrap_err();
        assert!(matches!(err, TermError::WindowSize { .. }));
    }

    #[test]
    fn cursor_report_probe_rejects_zero() {
        let mut out = Vec::new();
        let mut input = Replay::new(b"\x1b[0;80R");
        let err = size_from_cursor_report(&mut out, &mut input).unwrap_err();
        assert!(matches!(err, TermError::WindowSize { .. }));
    }

    #[test]
    fn window_size_prefers_ioctl_or_falls_back() {
        let mut out = Vec::new();
        let mut input = Replay::new(b"\x1b[30;100R");
        let size = window_size(&mut out, &mut input).unwrap();
        if get_size().is_none() {
            assert_eq!(size, Size { cols: 100, rows: 30 });
        } else {
            assert!(out.is_empty());
        }
    }

    // ── Emergency restore sequence ──────────────────────────────────

    #[test]
    fn emergency_restore_clears_homes_and_shows_cursor() {
        assert_eq!(EMERGENCY_RESTORE, b"\x1b[2J\x1b[H\x1b[?25h");
    }

    // ── Raw mode ─────────────────────────────────────────────────────

    #[cfg(unix)]
    #[test]
    fn raw_termios_clears_line_discipline() {
        let original: libc::termios = unsafe { std::mem::zeroed() };
        let mut cooked = original;
        cooked.c_lflag |= libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN;
        cooked.c_iflag |= libc::ICRNL | libc::IXON | libc::BRKINT;
        cooked.c_oflag |= libc::OPOST;

        let raw = raw_termios(cooked);
        assert_eq!(raw.c_lflag & (libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN), 0);
        assert_eq!(raw.c_iflag & (libc::ICRNL | libc::IXON | libc::BRKINT), 0);
        assert_eq!(raw.c_oflag & libc::OPOST, 0);
        assert_eq!(raw.c_cflag & libc::CS8, libc::CS8);
        assert_eq!(raw.c_cc[libc::VMIN], 0);
        assert_eq!(raw.c_cc[libc::VTIME], 1);
    }

    #[cfg(unix)]
    #[test]
    fn enable_without_tty_reports_tcgetattr() {
        if unsafe { libc::isatty(libc::STDIN_FILENO) } != 0 {
            return;
        }
        let Err(err) = RawMode::enable() else {
            panic!("raw mode must fail without a terminal");
        };
        assert!(err.to_string().starts_with("tcgetattr: "));
    }
}
