//! # katc-editor — Editor core for katc
//!
//! The state behind the viewer and the pieces that act on it:
//!
//! - **[`row`]** — `RowStore`, the file's lines as owned byte buffers
//! - **[`cursor`]** — `Cursor` (x, y) with clamped one-cell movement
//! - **[`view`]** — `Viewport` scroll model and per-frame row drawing
//! - **[`command`]** — key events mapped to cursor moves or quit
//! - **[`error`]** — `EditorError`, the fatal-error taxonomy
//!
//! Terminal I/O lives in `katc-term`; nothing here touches a file
//! descriptor except [`row::RowStore::load_from_file`].

pub mod command;
pub mod cursor;
pub mod error;
pub mod row;
pub mod view;

pub use error::EditorError;

/// Version shown in the welcome banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
