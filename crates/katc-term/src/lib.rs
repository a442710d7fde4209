// SPDX-License-Identifier: MIT
//
// katc-term — Terminal layer for the katc viewer.
//
// Puts the controlling terminal into raw mode through termios, decodes
// keystrokes (including ESC-prefixed arrow/navigation sequences) from a
// timed byte source, and assembles whole frames of ANSI output so each
// redraw reaches the terminal in a single write.
//
// No TUI framework sits underneath: raw termios for the mode switch,
// hand-written escape sequences for output.

pub mod ansi;
pub mod error;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;

pub use error::TermError;
