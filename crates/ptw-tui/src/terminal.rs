//! Terminal abstraction for keystroke capture and menu output.
//!
//! The interactive loop talks to the terminal only through the [`Terminal`]
//! trait. [`CrosstermTerminal`] drives a real TTY; [`DummyTerminal`] is used
//! when no TTY is available and turns every operation into a no-op, so the
//! watch-and-rerun behaviour keeps working headlessly.
//!
//! # Capture Mode
//!
//! While capturing, the terminal is in raw mode: keystrokes arrive one at a
//! time without echo, and the terminal no longer translates `\n` into
//! `\r\n` or turns Ctrl-C into a signal. [`CrosstermTerminal::print`]
//! compensates for the former; Ctrl-C and Ctrl-D are reported as
//! [`Key::Interrupt`].
//!
//! ```text
//!   enter_capturing_mode ──► capture_keystroke* ──► reset
//!          ▲                                          │
//!          └──────────── runner invocation ◄──────────┘
//! ```

use std::io::{self, BufRead, IsTerminal, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode};
use tracing::{debug, error, warn};

use crate::error::TuiError;

/// A single captured keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character. Enter is reported as `'\r'`.
    Char(char),
    /// Ctrl-C or Ctrl-D.
    Interrupt,
}

/// Operations the interactive loop needs from a terminal.
pub trait Terminal: Send {
    /// Clears the screen and homes the cursor.
    fn clear(&mut self) -> Result<(), TuiError>;

    /// Writes `text` verbatim.
    fn print(&mut self, text: &str) -> Result<(), TuiError>;

    /// Switches to single-keystroke capture, discarding buffered input.
    fn enter_capturing_mode(&mut self) -> Result<(), TuiError>;

    /// Returns the next buffered keystroke without blocking.
    fn capture_keystroke(&mut self) -> Result<Option<Key>, TuiError>;

    /// Restores the terminal mode found at startup.
    fn reset(&mut self) -> Result<(), TuiError>;

    /// Prints `prompt` and reads one line in normal mode.
    ///
    /// Returns `None` at end of input. Capture mode is restored afterwards
    /// if it was active.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, TuiError>;

    /// Returns `true` if keystrokes can be captured.
    fn is_interactive(&self) -> bool;
}

impl<T: Terminal + ?Sized> Terminal for Box<T> {
    fn clear(&mut self) -> Result<(), TuiError> {
        (**self).clear()
    }

    fn print(&mut self, text: &str) -> Result<(), TuiError> {
        (**self).print(text)
    }

    fn enter_capturing_mode(&mut self) -> Result<(), TuiError> {
        (**self).enter_capturing_mode()
    }

    fn capture_keystroke(&mut self) -> Result<Option<Key>, TuiError> {
        (**self).capture_keystroke()
    }

    fn reset(&mut self) -> Result<(), TuiError> {
        (**self).reset()
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, TuiError> {
        (**self).read_line(prompt)
    }

    fn is_interactive(&self) -> bool {
        (**self).is_interactive()
    }
}

/// A TTY driven through crossterm.
pub struct CrosstermTerminal {
    stdout: Stdout,
    capturing: bool,
}

impl std::fmt::Debug for CrosstermTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrosstermTerminal")
            .field("capturing", &self.capturing)
            .finish_non_exhaustive()
    }
}

impl CrosstermTerminal {
    /// Opens the controlling terminal.
    ///
    /// # Errors
    ///
    /// Fails if stdin is not a TTY or its mode cannot be queried.
    pub fn new() -> Result<Self, TuiError> {
        if !io::stdin().is_terminal() {
            return Err(io::Error::other("stdin is not a terminal").into());
        }
        crossterm::terminal::is_raw_mode_enabled()?;

        Ok(Self {
            stdout: io::stdout(),
            capturing: false,
        })
    }

    /// Drops keystrokes typed while the terminal was not capturing.
    fn drain_input() -> Result<(), TuiError> {
        while event::poll(Duration::ZERO)? {
            event::read()?;
        }
        Ok(())
    }
}

impl Terminal for CrosstermTerminal {
    fn clear(&mut self) -> Result<(), TuiError> {
        execute!(self.stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<(), TuiError> {
        if self.capturing {
            self.stdout.write_all(text.replace('\n', "\r\n").as_bytes())?;
        } else {
            self.stdout.write_all(text.as_bytes())?;
        }
        self.stdout.flush()?;
        Ok(())
    }

    fn enter_capturing_mode(&mut self) -> Result<(), TuiError> {
        if !self.capturing {
            enable_raw_mode()?;
            self.capturing = true;
            debug!("Entered capture mode");
        }
        Self::drain_input()
    }

    fn capture_keystroke(&mut self) -> Result<Option<Key>, TuiError> {
        if !self.capturing || !event::poll(Duration::ZERO)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(map_key(key)),
            _ => Ok(None),
        }
    }

    fn reset(&mut self) -> Result<(), TuiError> {
        if self.capturing {
            disable_raw_mode()?;
            self.capturing = false;
            debug!("Left capture mode");
        }
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, TuiError> {
        let was_capturing = self.capturing;
        self.reset()?;
        self.print(prompt)?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;

        if was_capturing {
            self.enter_capturing_mode()?;
        }

        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        // Attempt to restore terminal on drop
        if let Err(e) = self.reset() {
            error!(error = %e, "Failed to restore terminal on drop");
        }
    }
}

/// Maps a key press onto a [`Key`]. Releases, unmapped keys and Ctrl- or
/// Alt-modified characters other than the interrupts yield `None`.
fn map_key(key: KeyEvent) -> Option<Key> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let modified = key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Key::Interrupt)
        }
        KeyCode::Char(_) if modified => None,
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Char('\r')),
        _ => None,
    }
}

/// A terminal without keystroke capture. Every operation is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyTerminal;

impl Terminal for DummyTerminal {
    fn clear(&mut self) -> Result<(), TuiError> {
        Ok(())
    }

    fn print(&mut self, _text: &str) -> Result<(), TuiError> {
        Ok(())
    }

    fn enter_capturing_mode(&mut self) -> Result<(), TuiError> {
        Ok(())
    }

    fn capture_keystroke(&mut self) -> Result<Option<Key>, TuiError> {
        Ok(None)
    }

    fn reset(&mut self) -> Result<(), TuiError> {
        Ok(())
    }

    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>, TuiError> {
        Ok(None)
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Returns the controlling terminal, or a [`DummyTerminal`] when there is
/// none.
#[must_use]
pub fn acquire() -> Box<dyn Terminal> {
    match CrosstermTerminal::new() {
        Ok(terminal) => Box::new(terminal),
        Err(e) => {
            warn!(error = %e, "Unable to initialize terminal state, interactive mode is disabled");
            Box::new(DummyTerminal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_map_plain_char() {
        let key = press(KeyCode::Char('r'), KeyModifiers::NONE);
        assert_eq!(map_key(key), Some(Key::Char('r')));
    }

    #[test]
    fn test_map_enter() {
        let key = press(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(map_key(key), Some(Key::Char('\r')));
    }

    #[test]
    fn test_map_interrupts() {
        for c in ['c', 'd'] {
            let key = press(KeyCode::Char(c), KeyModifiers::CONTROL);
            assert_eq!(map_key(key), Some(Key::Interrupt));
        }
    }

    #[test]
    fn test_map_ignores_modified_chars() {
        for modifiers in [
            KeyModifiers::CONTROL,
            KeyModifiers::ALT,
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        ] {
            for c in ['r', 'q', 'w'] {
                assert_eq!(map_key(press(KeyCode::Char(c), modifiers)), None, "{modifiers:?}+{c}");
            }
        }
        assert_eq!(map_key(press(KeyCode::Char('d'), KeyModifiers::ALT)), None);

        let shifted = press(KeyCode::Char('R'), KeyModifiers::SHIFT);
        assert_eq!(map_key(shifted), Some(Key::Char('R')));
    }

    #[test]
    fn test_map_ignores_release_and_unmapped() {
        let mut key = press(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(key), None);

        assert_eq!(map_key(press(KeyCode::Up, KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_dummy_terminal_is_inert() {
        let mut terminal = DummyTerminal;
        terminal.enter_capturing_mode().expect("no-op");
        assert_eq!(terminal.capture_keystroke().expect("no-op"), None);
        assert_eq!(terminal.read_line("args: ").expect("no-op"), None);
        assert!(!terminal.is_interactive());
    }

    #[test]
    fn test_boxed_terminal_delegates() {
        let mut terminal: Box<dyn Terminal> = Box::new(DummyTerminal);
        terminal.print("hello").expect("no-op");
        assert!(!terminal.is_interactive());
    }
}
