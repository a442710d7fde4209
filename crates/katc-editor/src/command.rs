//! Command dispatch — key events to editor actions.
//!
//! The viewer has a tiny vocabulary: move the cursor, or quit. Keys with no
//! binding map to [`Command::Noop`] and are reserved for editing commands.
//!
//! | Key                  | Command                     |
//! |----------------------|-----------------------------|
//! | `Ctrl-Q`             | quit                        |
//! | arrows               | move one cell               |
//! | `PageUp`/`PageDown`  | move one screen height      |
//! | `Home`/`End`         | first / last screen column  |
//! | anything else        | nothing                     |

use katc_term::input::{KeyCode, KeyEvent};

use crate::cursor::{Bounds, Cursor, Motion};

/// The quit combination is Ctrl plus this letter.
pub const QUIT_KEY: char = 'q';

/// A dispatched key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Leave the viewer.
    Quit,
    /// Move the cursor.
    Move(Motion),
    /// No binding.
    Noop,
}

/// What the main loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Render the next frame and wait for the next key.
    Continue,
    /// Leave the loop.
    Quit,
}

impl Command {
    /// Look up the binding for `key`.
    #[must_use]
    pub fn from_key(key: &KeyEvent) -> Self {
        if key.is_ctrl(QUIT_KEY) {
            return Self::Quit;
        }

        let motion = match key.code {
            KeyCode::Up => Motion::Up,
            KeyCode::Down => Motion::Down,
            KeyCode::Left => Motion::Left,
            KeyCode::Right => Motion::Right,
            KeyCode::PageUp => Motion::PageUp,
            KeyCode::PageDown => Motion::PageDown,
            KeyCode::Home => Motion::LineStart,
            KeyCode::End => Motion::LineEnd,
            _ => return Self::Noop,
        };
        Self::Move(motion)
    }

    /// Carry out the command against `cursor`.
    pub fn execute(self, cursor: &mut Cursor, bounds: Bounds) -> Action {
        match self {
            Self::Quit => Action::Quit,
            Self::Move(motion) => {
                cursor.apply(motion, bounds);
                Action::Continue
            }
            Self::Noop => Action::Continue,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use katc_term::input::decode_byte;

    const BOUNDS: Bounds = Bounds {
        screen_cols: 80,
        screen_rows: 24,
        row_count: 10,
    };

    fn command(code: KeyCode) -> Command {
        Command::from_key(&KeyEvent::plain(code))
    }

    #[test]
    fn ctrl_q_quits() {
        assert_eq!(Command::from_key(&decode_byte(0x11)), Command::Quit);
    }

    #[test]
    fn plain_q_does_nothing() {
        assert_eq!(command(KeyCode::Char('q')), Command::Noop);
    }

    #[test]
    fn other_ctrl_keys_do_nothing() {
        assert_eq!(Command::from_key(&decode_byte(0x03)), Command::Noop);
    }

    #[test]
    fn arrows_move() {
        assert_eq!(command(KeyCode::Up), Command::Move(Motion::Up));
        assert_eq!(command(KeyCode::Down), Command::Move(Motion::Down));
        assert_eq!(command(KeyCode::Left), Command::Move(Motion::Left));
        assert_eq!(command(KeyCode::Right), Command::Move(Motion::Right));
    }

    #[test]
    fn navigation_keys_move() {
        assert_eq!(command(KeyCode::PageUp), Command::Move(Motion::PageUp));
        assert_eq!(command(KeyCode::PageDown), Command::Move(Motion::PageDown));
        assert_eq!(command(KeyCode::Home), Command::Move(Motion::LineStart));
        assert_eq!(command(KeyCode::End), Command::Move(Motion::LineEnd));
    }

    #[test]
    fn editing_keys_are_reserved() {
        for code in [
            KeyCode::Delete,
            KeyCode::Backspace,
            KeyCode::Enter,
            KeyCode::Tab,
            KeyCode::Escape,
            KeyCode::Char('x'),
            KeyCode::Byte(0xE9),
        ] {
            assert_eq!(command(code), Command::Noop, "{code:?}");
        }
    }

    #[test]
    fn execute_quit() {
        let mut c = Cursor::new();
        assert_eq!(Command::Quit.execute(&mut c, BOUNDS), Action::Quit);
        assert_eq!(c, Cursor::new());
    }

    #[test]
    fn execute_move() {
        let mut c = Cursor::new();
        let action = Command::Move(Motion::Down).execute(&mut c, BOUNDS);
        assert_eq!(action, Action::Continue);
        assert_eq!(c, Cursor { x: 0, y: 1 });
    }

    #[test]
    fn execute_noop_leaves_cursor() {
        let mut c = Cursor { x: 2, y: 2 };
        assert_eq!(Command::Noop.execute(&mut c, BOUNDS), Action::Continue);
        assert_eq!(c, Cursor { x: 2, y: 2 });
    }
}
