//! Cursor — logical position and clamped movement.
//!
//! `y` indexes the row store; `y == row_count` is allowed and puts the
//! cursor on the empty line just past the end of the file. `x` is a screen
//! column within the row, and it is *virtual*: it may sit past the end of a
//! short row, bounded only by the last screen column. Vertical movement
//! keeps `x` as it is.

/// A motion the cursor can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Up,
    Down,
    Left,
    Right,
    /// One screen height up.
    PageUp,
    /// One screen height down.
    PageDown,
    /// Column 0.
    LineStart,
    /// Last screen column.
    LineEnd,
}

/// The limits a motion is clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Screen width; `x` stays below it.
    pub screen_cols: usize,
    /// Screen height; the page size for `PageUp`/`PageDown`.
    pub screen_rows: usize,
    /// Rows in the store; `y` stays at or below it.
    pub row_count: usize,
}

impl Bounds {
    const fn max_x(self) -> usize {
        self.screen_cols.saturating_sub(1)
    }
}

/// Cursor position, 0-indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
}

impl Cursor {
    /// The top-left corner.
    #[must_use]
    pub const fn new() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Apply `motion`, clamped to `bounds`.
    ///
    /// Moving into a wall is a no-op rather than an error: up from row 0,
    /// left from column 0, right from the last column and down from
    /// `row_count` all leave the cursor where it was.
    pub fn apply(&mut self, motion: Motion, bounds: Bounds) {
        match motion {
            Motion::Up => self.y = self.y.saturating_sub(1),
            Motion::Down => {
                if self.y < bounds.row_count {
                    self.y += 1;
                }
            }
            Motion::Left => self.x = self.x.saturating_sub(1),
            Motion::Right => {
                if self.x < bounds.max_x() {
                    self.x += 1;
                }
            }
            Motion::PageUp => self.y = self.y.saturating_sub(bounds.screen_rows),
            Motion::PageDown => {
                self.y = self.y.saturating_add(bounds.screen_rows).min(bounds.row_count);
            }
            Motion::LineStart => self.x = 0,
            Motion::LineEnd => self.x = bounds.max_x(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
