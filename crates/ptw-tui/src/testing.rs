//! In-memory terminal, runner and notifier doubles for the loop tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::TuiError;
use crate::notify::Notifier;
use crate::runner::{RunOutcome, Runner};
use crate::terminal::{Key, Terminal};

/// A terminal fed from scripted keystrokes and lines.
///
/// Each tick consumes one entry from `keys`; `None` entries model ticks
/// without input.
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    pub keys: VecDeque<Option<Key>>,
    pub lines: VecDeque<String>,
    pub output: String,
    pub capturing: bool,
    pub clears: usize,
    pub resets: usize,
    pub headless: bool,
}

impl ScriptedTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: impl IntoIterator<Item = Option<Key>>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn headless() -> Self {
        Self {
            headless: true,
            ..Self::default()
        }
    }

    pub fn push_line(&mut self, line: &str) {
        self.lines.push_back(line.to_owned());
    }
}

impl Terminal for ScriptedTerminal {
    fn clear(&mut self) -> Result<(), TuiError> {
        self.clears += 1;
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<(), TuiError> {
        self.output.push_str(text);
        Ok(())
    }

    fn enter_capturing_mode(&mut self) -> Result<(), TuiError> {
        self.capturing = true;
        Ok(())
    }

    fn capture_keystroke(&mut self) -> Result<Option<Key>, TuiError> {
        Ok(self.keys.pop_front().flatten())
    }

    fn reset(&mut self) -> Result<(), TuiError> {
        self.capturing = false;
        self.resets += 1;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, TuiError> {
        self.output.push_str(prompt);
        Ok(self.lines.pop_front())
    }

    fn is_interactive(&self) -> bool {
        !self.headless
    }
}

/// A runner that records invocations instead of spawning processes.
#[derive(Debug, Clone)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    code: Option<i32>,
    launch_fails: bool,
}

impl RecordingRunner {
    pub fn exiting_with(code: i32) -> Self {
        Self {
            calls: Arc::default(),
            code: Some(code),
            launch_fails: false,
        }
    }

    pub fn failing_to_launch() -> Self {
        Self {
            launch_fails: true,
            ..Self::exiting_with(0)
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl Runner for RecordingRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<RunOutcome, TuiError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((program.to_owned(), args.to_vec()));
        if self.launch_fails {
            return Err(TuiError::Launch {
                program: program.to_owned(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        Ok(RunOutcome { code: self.code })
    }
}

/// A notifier that records every message.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("messages lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, _title: &str, message: &str) {
        self.messages
            .lock()
            .expect("messages lock")
            .push(message.to_owned());
    }
}
