//! View — scroll model and frame composition.
//!
//! A `Viewport` maps the row store onto the terminal: `row_offset` is the
//! first visible row, `screen_rows × screen_cols` is the terminal size
//! queried at startup. Each redraw goes through [`Viewport::frame`]:
//!
//! ```text
//! scroll ─▶ hide cursor ─▶ home ─▶ rows ─▶ place cursor ─▶ show cursor
//!                                   │
//!                 ┌─────────────────┴─────────────────┐
//!                 │ file row: up to screen_cols bytes │
//!                 │ past EOF: "~" (or the banner)     │
//!                 │ each: "\x1b[K", "\r\n" between    │
//!                 └───────────────────────────────────┘
//! ```
//!
//! The frame is returned as one `OutputBuffer`; the caller writes it to the
//! terminal in a single call.

use std::io;

use katc_term::ansi;
use katc_term::output::OutputBuffer;
use katc_term::terminal::Size;
use tracing::debug;

use crate::VERSION;
use crate::cursor::{Bounds, Cursor};
use crate::row::RowStore;

/// Marker drawn at the left margin of rows past the end of the file.
const EMPTY_ROW_MARKER: &[u8] = b"~";

/// The welcome banner shown when no file is loaded.
#[must_use]
pub fn welcome_message() -> String {
    format!("KATC editor -- version {VERSION}")
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The visible window onto the row store.
///
/// Invariant after [`scroll`](Self::scroll): the cursor's row lies in
/// `row_offset..row_offset + screen_rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    screen_rows: usize,
    screen_cols: usize,
    row_offset: usize,
}

impl Viewport {
    /// A viewport for a terminal of `size`, scrolled to the top.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self {
            screen_rows: size.rows,
            screen_cols: size.cols,
            row_offset: 0,
        }
    }

    /// Visible rows.
    #[inline]
    #[must_use]
    pub const fn screen_rows(&self) -> usize {
        self.screen_rows
    }

    /// Visible columns.
    #[inline]
    #[must_use]
    pub const fn screen_cols(&self) -> usize {
        self.screen_cols
    }

    /// Index of the first visible row.
    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// Movement limits for a cursor over `rows` in this viewport.
    #[must_use]
    pub fn bounds(&self, rows: &RowStore) -> Bounds {
        Bounds {
            screen_cols: self.screen_cols(),
            screen_rows: self.screen_rows(),
            row_count: rows.len(),
        }
    }

    // -- Scrolling ----------------------------------------------------------

    /// Move `row_offset` the least distance that brings `cursor.y` on
    /// screen.
    ///
    /// Idempotent: a second call with the same cursor changes nothing.
    pub fn scroll(&mut self, cursor: &Cursor) {
        let before = self.row_offset;

        if cursor.y < self.row_offset {
            self.row_offset = cursor.y;
        }
        if cursor.y >= self.row_offset + self.screen_rows {
            // cursor.y >= screen_rows here, so this cannot underflow.
            self.row_offset = cursor.y + 1 - self.screen_rows;
        }

        if self.row_offset != before {
            debug!(from = before, to = self.row_offset, "scrolled");
        }
    }

    // -- Rendering ----------------------------------------------------------

    /// Build a complete frame for `rows` with the cursor at `cursor`.
    ///
    /// Scrolls first, so the frame always shows the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if an escape sequence cannot be written into the
    /// frame.
    pub fn frame(&mut self, rows: &RowStore, cursor: &Cursor) -> io::Result<OutputBuffer> {
        self.scroll(cursor);

        let mut out = OutputBuffer::for_screen(self.screen_cols, self.screen_rows);
        ansi::cursor_hide(&mut out)?;
        ansi::cursor_home(&mut out)?;

        self.draw_rows(rows, &mut out)?;

        let screen_y = cursor.y.saturating_sub(self.row_offset);
        ansi::cursor_to(&mut out, cursor.x, screen_y)?;
        ansi::cursor_show(&mut out)?;
        Ok(out)
    }

    /// Draw every screen row into `out`.
    ///
    /// Rows are separated by `\r\n`; the last one is not followed by a line
    /// break, so the terminal never scrolls.
    ///
    /// # Errors
    ///
    /// Returns an error if the clear-line sequence cannot be written.
    pub fn draw_rows(&self, rows: &RowStore, out: &mut OutputBuffer) -> io::Result<()> {
        for y in 0..self.screen_rows {
            match rows.get(y + self.row_offset) {
                Some(row) => out.push_bytes(row.visible(self.screen_cols)),
                None if rows.is_empty() && y == self.screen_rows / 3 => self.draw_welcome(out),
                None => out.push_bytes(EMPTY_ROW_MARKER),
            }

            ansi::clear_line(out)?;
            if y + 1 < self.screen_rows {
                out.push_bytes(b"\r\n");
            }
        }
        Ok(())
    }

    /// The banner, centered, with the usual left-margin marker when there is
    /// room for it.
    fn draw_welcome(&self, out: &mut OutputBuffer) {
        let message = welcome_message();
        let text = &message.as_bytes()[..message.len().min(self.screen_cols)];

        let mut padding = (self.screen_cols - text.len()) / 2;
        if padding > 0 {
            out.push_bytes(EMPTY_ROW_MARKER);
            padding -= 1;
        }
        out.push_repeated(b' ', padding);
        out.push_bytes(text);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
