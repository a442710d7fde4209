//! Editor errors.
//!
//! Every variant ends the program: the binary clears the screen, prints the
//! message and exits with status 1. Terminal failures arrive wrapped from
//! `katc-term`; file failures carry the path that could not be read.

use std::io;
use std::path::PathBuf;

use katc_term::TermError;
use thiserror::Error;

/// A fatal editor error.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Terminal configuration, size query, read, or frame write failed.
    #[error(transparent)]
    Term(#[from] TermError),

    /// The file named on the command line could not be opened.
    #[error("fopen: {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading a line from an opened file failed.
    #[error("getline: {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_error_names_path() {
        let err = EditorError::Open {
            path: PathBuf::from("/no/such/file"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("fopen: /no/such/file: "), "{msg}");
    }

    #[test]
    fn term_error_is_transparent() {
        let err: EditorError = TermError::WindowSize { reason: "no reply" }.into();
        assert_eq!(err.to_string(), "getWindowSize: no reply");
    }

    #[test]
    fn read_error_names_path() {
        let err = EditorError::Read {
            path: PathBuf::from("notes.txt"),
            source: io::Error::from(io::ErrorKind::InvalidData),
        };
        assert!(err.to_string().starts_with("getline: notes.txt: "));
    }
}
