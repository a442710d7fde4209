// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; the renderer decides that. This module
// only knows the byte-level encoding of each terminal command the viewer
// sends.
//
// Cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI CUP uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// They never fail when writing to `OutputBuffer` (backed by a Vec).
use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: usize, y: usize) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Move the cursor to the top-left corner (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Push the cursor as far right and down as the terminal allows.
///
/// CUF/CUD stop at the screen edge, so 999 lands on the bottom-right cell
/// of any realistic terminal. Used before [`request_cursor_position`] to
/// measure the screen.
#[inline]
pub fn cursor_far_corner(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[999C\x1b[999B")
}

/// Ask the terminal to report the cursor position (DSR 6).
///
/// The reply arrives on stdin as `ESC [ <row> ; <col> R`.
#[inline]
pub fn request_cursor_position(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Clear from the cursor to the end of the line (EL 0).
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Clear the screen and home the cursor.
///
/// The clean slate left behind on quit and on every fatal error.
pub fn reset_screen(w: &mut impl Write) -> io::Result<()> {
    clear_screen(w)?;
    cursor_home(w)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    // ── Cursor ────────────────────────────────────────────────────────

    #[test]
    fn cursor_to_origin() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
    }

    #[test]
    fn cursor_to_is_one_indexed_row_then_col() {
        assert_eq!(emit(|w| cursor_to(w, 9, 4)), "\x1b[5;10H");
    }

    #[test]
    fn cursor_to_large_coordinates() {
        assert_eq!(emit(|w| cursor_to(w, 299, 99)), "\x1b[100;300H");
    }

    #[test]
    fn cursor_home_sequence() {
        assert_eq!(emit(cursor_home), "\x1b[H");
    }

    #[test]
    fn cursor_hide_show() {
        assert_eq!(emit(cursor_hide), "\x1b[?25l");
        assert_eq!(emit(cursor_show), "\x1b[?25h");
    }

    #[test]
    fn far_corner_moves_right_then_down() {
        assert_eq!(emit(cursor_far_corner), "\x1b[999C\x1b[999B");
    }

    #[test]
    fn cursor_position_request() {
        assert_eq!(emit(request_cursor_position), "\x1b[6n");
    }

    // ── Screen ────────────────────────────────────────────────────────

    #[test]
    fn clear_screen_sequence() {
        assert_eq!(emit(clear_screen), "\x1b[2J");
    }

    #[test]
    fn clear_line_sequence() {
        assert_eq!(emit(clear_line), "\x1b[K");
    }

    #[test]
    fn reset_screen_clears_then_homes() {
        assert_eq!(emit(reset_screen), "\x1b[2J\x1b[H");
    }
}
