// SPDX-License-Identifier: MIT
//
// katc — a minimal raw-mode terminal text viewer.
//
// This is the binary that wires the two crates together:
//
//   katc-term   → raw mode, window size, key decoding, frame output
//   katc-editor → row store, cursor, viewport, command dispatch
//
// The Editor value owns all per-process state and runs one cooperative
// loop on one thread:
//
//   render frame → read one key → dispatch → render frame → ...
//
// Raw mode is held by a scoped guard inside `run`, so it is released on
// every way out of that function. Errors then land in `report_fatal`, the
// single fatal path: clear the screen, home the cursor, print the error,
// exit 1. A quit exits 0.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use katc_editor::EditorError;
use katc_editor::command::{Action, Command};
use katc_editor::cursor::Cursor;
use katc_editor::row::RowStore;
use katc_editor::view::Viewport;

use katc_term::TermError;
use katc_term::ansi;
use katc_term::input;
use katc_term::output::RawStdout;
use katc_term::reader::{ByteSource, StdinReader};
use katc_term::terminal::{self, RawMode, Size};

// ─── Command line ───────────────────────────────────────────────────────────

/// A minimal raw-mode terminal text viewer.
///
/// Arrow keys move the cursor, Page Up/Down move a screen, Home/End jump to
/// the first/last column, Ctrl-Q quits.
#[derive(Debug, Parser)]
#[command(name = "katc", version, about)]
struct Cli {
    /// File to view. Starts with an empty buffer when omitted.
    file: Option<PathBuf>,

    /// Append logs to this file. Verbosity comes from `KATC_LOG`
    /// (an env-filter directive, default `info`).
    #[arg(long, env = "KATC_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,
}

/// Environment variable holding the log filter directive.
const LOG_FILTER_ENV: &str = "KATC_LOG";

/// Install a file-backed subscriber when a log path is given.
///
/// Stdout is the screen, so without a path nothing is logged at all.
fn init_logging(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ─── Editor ─────────────────────────────────────────────────────────────────

/// The viewer's state: the file's rows, the cursor, and the window onto
/// them.
///
/// Owned by `run` and handed by reference to each step of the loop; there
/// is no global state.
struct Editor {
    rows: RowStore,
    cursor: Cursor,
    view: Viewport,
}

impl Editor {
    /// An empty editor for a screen of `size`.
    fn new(size: Size) -> Self {
        Self {
            rows: RowStore::new(),
            cursor: Cursor::new(),
            view: Viewport::new(size),
        }
    }

    /// Load the file at `path` into the row store.
    fn open(&mut self, path: &Path) -> Result<(), EditorError> {
        self.rows.load_from_file(path)
    }

    /// Draw one frame and write it to `out` in a single call.
    fn refresh(&mut self, out: &mut impl Write) -> Result<(), TermError> {
        self.view.frame(&self.rows, &self.cursor)?.flush_to(out)?;
        Ok(())
    }

    /// Read one key and act on it.
    ///
    /// On quit the screen is cleared and the cursor homed before returning.
    fn process_keypress(
        &mut self,
        src: &mut impl ByteSource,
        out: &mut impl Write,
    ) -> Result<Action, TermError> {
        let key = input::read_key(src)?;
        let bounds = self.view.bounds(&self.rows);
        let action = Command::from_key(&key).execute(&mut self.cursor, bounds);

        if action == Action::Quit {
            ansi::reset_screen(out)?;
            out.flush()?;
        }
        Ok(action)
    }

    /// Render, wait for a key, dispatch; until quit.
    fn run(&mut self, src: &mut impl ByteSource, out: &mut impl Write) -> Result<(), TermError> {
        loop {
            self.refresh(out)?;
            if self.process_keypress(src, out)? == Action::Quit {
                return Ok(());
            }
        }
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

/// Exit status after a quit.
const EXIT_OK: i32 = 0;

/// Exit status after a fatal error.
const EXIT_FATAL: i32 = 1;

/// An editor for a screen of `size`, with the file from the command line
/// loaded.
fn start(cli: &Cli, size: Size) -> Result<Editor, EditorError> {
    let mut editor = Editor::new(size);
    if let Some(path) = &cli.file {
        editor.open(path)?;
    }
    Ok(editor)
}

/// Set up the terminal, load the file, and run the loop.
///
/// The raw-mode guard lives exactly as long as this function.
fn run(cli: &Cli) -> Result<(), EditorError> {
    let raw = RawMode::enable()?;
    let mut keys = StdinReader::new();
    let mut out = RawStdout;

    let size = terminal::window_size(&mut out, &mut keys)?;
    info!(cols = size.cols, rows = size.rows, "terminal ready");

    start(cli, size)?.run(&mut keys, &mut out)?;
    raw.disable()?;
    Ok(())
}

/// Leave a clean screen on `screen` and print `katc: <err>` to `stderr`.
fn report_fatal(
    screen: &mut impl Write,
    stderr: &mut impl Write,
    err: &dyn Display,
) -> io::Result<()> {
    ansi::reset_screen(screen)?;
    screen.flush()?;
    writeln!(stderr, "katc: {err}")
}

/// The process exit status for the outcome of `run`, reporting a failure
/// first.
fn finish(
    result: Result<(), EditorError>,
    screen: &mut impl Write,
    stderr: &mut impl Write,
) -> i32 {
    match result {
        Ok(()) => {
            info!("quit");
            EXIT_OK
        }
        Err(e) => {
            error!(error = %e, "fatal");
            let _ = report_fatal(screen, stderr, &e);
            EXIT_FATAL
        }
    }
}

/// Fatal error before the editor starts.
fn die(err: &dyn Display) -> ! {
    error!(error = %err, "fatal");
    let _ = report_fatal(&mut RawStdout, &mut io::stderr(), err);
    process::exit(EXIT_FATAL);
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_deref()) {
        die(&format!("log file: {e}"));
    }
    info!(file = ?cli.file, "starting");

    let code = finish(run(&cli), &mut RawStdout, &mut io::stderr());
    process::exit(code);
}

// ─── Tests ───────────────────────────────────────────────────────────────────
