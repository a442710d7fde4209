//! Row store — the file's lines, one owned byte buffer each.
//!
//! Rows are raw bytes, not `str`: the viewer draws whatever the file holds
//! and never needs to know its encoding. A row's slice length is its size;
//! there is no terminator and no line ending stored.
//!
//! The store is append-only. It is filled once at startup and read by the
//! renderer and the dispatcher afterwards.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use crate::error::EditorError;

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of the file, without its line ending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    chars: Box<[u8]>,
}

impl Row {
    /// Copy `bytes` into a new row.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            chars: bytes.into(),
        }
    }

    /// The row's content.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.chars
    }

    /// Size in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the row has no content.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The part of the row that fits in `cols` screen columns.
    ///
    /// Rows wider than the screen are cut, not wrapped.
    #[inline]
    #[must_use]
    pub fn visible(&self, cols: usize) -> &[u8] {
        &self.chars[..self.chars.len().min(cols)]
    }
}

// ---------------------------------------------------------------------------
// RowStore
// ---------------------------------------------------------------------------

/// The file's rows, in order.
///
/// Index `i` is valid iff `i < len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    /// An empty store (no file given).
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Append a copy of `bytes` as the last row.
    pub fn append_row(&mut self, bytes: &[u8]) {
        self.rows.push(Row::new(bytes));
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store has no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index`, if it exists.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Append every line of the file at `path`.
    ///
    /// The file is open only for the duration of this call.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Open`] if the file cannot be opened and
    /// [`EditorError::Read`] if reading it fails partway.
    pub fn load_from_file(&mut self, path: &Path) -> Result<(), EditorError> {
        let file = File::open(path).map_err(|source| EditorError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let before = self.len();
        self.load_from_reader(BufReader::new(file))
            .map_err(|source| EditorError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        info!(path = %path.display(), rows = self.len() - before, "file loaded");
        Ok(())
    }

    /// Append every line read from `reader`, stripping trailing `\n` and
    /// `\r` bytes from each.
    ///
    /// A final line without a newline still becomes a row; an empty input
    /// adds nothing.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from `reader`.
    pub fn load_from_reader(&mut self, mut reader: impl BufRead) -> std::io::Result<()> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(());
            }
            let mut len = line.len();
            while len > 0 && matches!(line[len - 1], b'\n' | b'\r') {
                len -= 1;
            }
            self.append_row(&line[..len]);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
