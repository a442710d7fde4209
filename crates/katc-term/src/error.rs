// SPDX-License-Identifier: MIT
//
// Terminal errors.
//
// Every variant is fatal to the viewer: a terminal whose mode or size is
// unknown cannot be drawn on safely. Read timeouts never show up here; the
// byte source reports them as "nothing available".

use std::io;

use thiserror::Error;

/// A failed terminal operation.
#[derive(Debug, Error)]
pub enum TermError {
    /// A system call on the terminal failed. `call` names it the way a
    /// `perror` label would (`tcgetattr`, `tcsetattr`, `read`, ...).
    #[error("{call}: {source}")]
    Sys {
        call: &'static str,
        #[source]
        source: io::Error,
    },

    /// Neither `TIOCGWINSZ` nor the cursor-position report produced a usable
    /// screen size.
    #[error("getWindowSize: {reason}")]
    WindowSize { reason: &'static str },

    /// Writing escape sequences or a frame to the terminal failed.
    #[error("write: {0}")]
    Write(#[from] io::Error),
}

impl TermError {
    /// Wrap the calling thread's last OS error, tagged with `call`.
    #[must_use]
    pub fn last_os(call: &'static str) -> Self {
        Self::Sys {
            call,
            source: io::Error::last_os_error(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sys_error_names_the_call() {
        let err = TermError::Sys {
            call: "tcgetattr",
            source: io::Error::other("not a tty"),
        };
        assert!(err.to_string().starts_with("tcgetattr: "));
    }

    #[test]
    fn window_size_error_message() {
        let err = TermError::WindowSize {
            reason: "malformed cursor report",
        };
        assert_eq!(err.to_string(), "getWindowSize: malformed cursor report");
    }

    #[test]
    fn io_error_converts_to_write() {
        let err: TermError = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, TermError::Write(_)));
        assert_eq!(err.to_string(), "write: gone");
    }

    #[test]
    fn sys_error_exposes_source() {
        use std::error::Error as _;
        let err = TermError::Sys {
            call: "read",
            source: io::Error::other("boom"),
        };
        assert!(err.source().is_some());
    }
}
