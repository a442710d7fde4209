// SPDX-License-Identifier: MIT
//
// Terminal input decoder.
//
// Turns raw stdin bytes into key events, one key per call:
//
// - Printable ASCII and raw non-ASCII bytes
// - Control characters (Ctrl+letter, Enter, Tab, Backspace)
// - CSI sequences: arrows (`ESC [ A..D`), Home/End (`ESC [ H/F`) and the
//   tilde family (`ESC [ <digit> ~`: Delete, Home, End, PageUp, PageDown)
// - SS3 Home/End (`ESC O H/F`)
//
// # Read protocol
//
// `read_key` waits for a first byte, retrying through read timeouts. If
// that byte is ESC it reads up to three more bytes, each bounded by the
// read window. A timeout anywhere inside the sequence means the user
// pressed Escape on its own, so the decoder never blocks for more than
// three read windows after ESC.
//
// Anything unrecognized after ESC collapses to a bare Escape event. New
// keys go into `csi_letter_key`, `ss3_key` or `tilde_key`; the read
// protocol stays as it is.
//
// Also parses the cursor-position report (`ESC [ <row> ; <col> R`) that
// the window-size fallback asks the terminal for.

use bitflags::bitflags;
use tracing::{debug, warn};

use crate::error::TermError;
use crate::reader::ByteSource;

/// The escape byte that starts every multi-byte sequence.
pub const ESC: u8 = 0x1B;

/// Longest sequence body we read after ESC: `[`, a digit, `~`.
const MAX_SEQUENCE_LEN: usize = 3;

/// Longest cursor-position report we accept, terminator excluded.
const MAX_REPORT_LEN: usize = 31;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// A Ctrl+key combination.
    #[must_use]
    pub const fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::CTRL,
        }
    }

    /// Whether this is Ctrl+`ch`.
    #[must_use]
    pub fn is_ctrl(&self, ch: char) -> bool {
        self.code == KeyCode::Char(ch) && self.modifiers.contains(Modifiers::CTRL)
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A printable ASCII character, or the letter of a Ctrl combination.
    Char(char),
    /// A byte outside ASCII, passed through undecoded.
    Byte(u8),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Legacy terminals only encode Ctrl for letters (the byte is the
    /// letter with the top three bits cleared), so that is the one flag
    /// the decoder can produce.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const CTRL = 0b0000_0100;
    }
}

// ─── Decoding ───────────────────────────────────────────────────────────────

/// Read and decode one key event.
///
/// Retries silently while the source times out with nothing read; returns
/// as soon as a complete key is known.
///
/// # Errors
///
/// Returns an error only if the byte source itself fails.
pub fn read_key(src: &mut impl ByteSource) -> Result<KeyEvent, TermError> {
    let first = loop {
        if let Some(byte) = src.read_byte()? {
            break byte;
        }
    };

    let key = if first == ESC {
        read_escape(src)?
    } else {
        decode_byte(first)
    };

    debug!(?key, "key");
    Ok(key)
}

/// Decode the bytes following an ESC.
fn read_escape(src: &mut impl ByteSource) -> Result<KeyEvent, TermError> {
    let escape = KeyEvent::plain(KeyCode::Escape);
    let mut seq = [0u8; MAX_SEQUENCE_LEN];

    let Some(b0) = src.read_byte()? else {
        return Ok(escape);
    };
    seq[0] = b0;
    let Some(b1) = src.read_byte()? else {
        return Ok(escape);
    };
    seq[1] = b1;

    let code = match (b0, b1) {
        (b'[', b'0'..=b'9') => {
            let Some(b2) = src.read_byte()? else {
                return Ok(escape);
            };
            seq[2] = b2;
            if b2 == b'~' { tilde_key(b1) } else { None }
        }
        (b'[', letter) => csi_letter_key(letter),
        (b'O', letter) => ss3_key(letter),
        _ => None,
    };

    Ok(code.map_or_else(
        || {
            warn!(sequence = ?seq, "unrecognized escape sequence");
            escape
        },
        KeyEvent::plain,
    ))
}

/// `ESC [ <letter>`
const fn csi_letter_key(letter: u8) -> Option<KeyCode> {
    match letter {
        b'A' => Some(KeyCode::Up),
        b'B' => Some(KeyCode::Down),
        b'C' => Some(KeyCode::Right),
        b'D' => Some(KeyCode::Left),
        b'H' => Some(KeyCode::Home),
        b'F' => Some(KeyCode::End),
        _ => None,
    }
}

/// `ESC O <letter>`
const fn ss3_key(letter: u8) -> Option<KeyCode> {
    match letter {
        b'H' => Some(KeyCode::Home),
        b'F' => Some(KeyCode::End),
        _ => None,
    }
}

/// `ESC [ <digit> ~`
const fn tilde_key(digit: u8) -> Option<KeyCode> {
    match digit {
        b'1' | b'7' => Some(KeyCode::Home),
        b'3' => Some(KeyCode::Delete),
        b'4' | b'8' => Some(KeyCode::End),
        b'5' => Some(KeyCode::PageUp),
        b'6' => Some(KeyCode::PageDown),
        _ => None,
    }
}

/// Decode a single byte that did not start an escape sequence.
#[must_use]
pub const fn decode_byte(byte: u8) -> KeyEvent {
    match byte {
        0x00 => KeyEvent::ctrl(KeyCode::Char('@')),
        0x08 | 0x7F => KeyEvent::plain(KeyCode::Backspace),
        0x09 => KeyEvent::plain(KeyCode::Tab),
        0x0A | 0x0D => KeyEvent::plain(KeyCode::Enter),
        b @ 0x01..=0x1A => KeyEvent::ctrl(KeyCode::Char((b + b'a' - 1) as char)),
        ESC => KeyEvent::plain(KeyCode::Escape),
        b @ 0x1C..=0x1F => KeyEvent::ctrl(KeyCode::Char((b + 0x40) as char)),
        b @ 0x20..=0x7E => KeyEvent::plain(KeyCode::Char(b as char)),
        b => KeyEvent::plain(KeyCode::Byte(b)),
    }
}

// ─── Cursor Position Report ─────────────────────────────────────────────────

/// Collect a cursor-position reply from `src`, up to (not including) the
/// terminating `R`.
///
/// Stops early on a read timeout or after [`MAX_REPORT_LEN`] bytes; the
/// caller validates the result with [`parse_cursor_report`].
///
/// # Errors
///
/// Returns an error if the byte source fails.
pub fn read_cursor_report(src: &mut impl ByteSource) -> Result<Vec<u8>, TermError> {
    let mut reply = Vec::with_capacity(MAX_REPORT_LEN);
    while reply.len() < MAX_REPORT_LEN {
        match src.read_byte()? {
            Some(b'R') | None => break,
            Some(byte) => reply.push(byte),
        }
    }
    Ok(reply)
}

/// Parse `ESC [ <row> ; <col>` into `(row, col)`, both 1-based as the
/// terminal reports them.
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<(usize, usize)> {
    let body = reply.strip_prefix(&[ESC, b'['])?;
    let text = std::str::from_utf8(body).ok()?;
    let (row, col) = text.split_once(';')?;
    Some((row.parse().ok()?, col.parse().ok()?))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
