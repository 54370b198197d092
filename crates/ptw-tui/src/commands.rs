//! Keystroke commands.
//!
//! A [`CommandRegistry`] is a table of [`Command`] descriptors built once at
//! startup. Each descriptor names its keystrokes, a caption and description
//! for the menu, and a [`CommandAction`] tag that
//! [`CommandRegistry::run_command`] dispatches on.
//!
//! # Built-in Commands
//!
//! | Key     | Action                                               |
//! |---------|------------------------------------------------------|
//! | `Enter` | run now                                              |
//! | `r`     | clear the runner arguments, run now                  |
//! | `c`     | prompt for new runner arguments, run now             |
//! | `f`     | append the only-failed flag, run now                 |
//! | `p`     | append the debug-on-failure flag, run now            |
//! | `v`     | append the verbose flag, run now                     |
//! | `w`     | clear the screen and show the full menu              |
//! | `e`     | redraw the status line                               |
//! | `q`     | quit                                                 |
//!
//! Flag commands never add a flag twice.

use ptw_core::{RunnerConfig, RunnerFlags, Trigger};
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::error::TuiError;
use crate::menu;
use crate::terminal::Terminal;

/// What a command does when its key is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// Request an immediate run.
    Invoke,
    /// Clear all runner arguments and run.
    ResetArgs,
    /// Prompt for a replacement argument list and run.
    ChangeArgs,
    /// Append a flag unless present and run.
    AppendFlag(String),
    /// Clear the screen and print the full menu.
    ShowMenu,
    /// Print the short status menu.
    ShowShortMenu,
    /// Leave the interactive loop.
    Quit,
}

/// A registered keystroke command.
#[derive(Debug, Clone)]
pub struct Command {
    /// Keystrokes bound to this command.
    pub keys: &'static [char],
    /// Short label shown in the menu.
    pub caption: &'static str,
    /// Human description shown in the menu.
    pub description: String,
    /// Whether the full menu lists this command.
    pub show_in_menu: bool,
    /// The operation to perform.
    pub action: CommandAction,
}

impl Command {
    fn new(
        keys: &'static [char],
        caption: &'static str,
        description: impl Into<String>,
        action: CommandAction,
    ) -> Self {
        Self {
            keys,
            caption,
            description: description.into(),
            show_in_menu: true,
            action,
        }
    }

    const fn hidden(mut self) -> Self {
        self.show_in_menu = false;
        self
    }
}

/// Result of running a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Keep looping.
    Continue,
    /// Leave the loop.
    Quit,
}

/// An ordered table of commands indexed by keystroke.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    index: FxHashMap<char, usize>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in commands.
    ///
    /// # Errors
    ///
    /// Returns [`TuiError::DuplicateKeystroke`] if two built-ins share a key.
    pub fn builtin(flags: &RunnerFlags) -> Result<Self, TuiError> {
        let mut registry = Self::new();

        registry.register(Command::new(
            &['\r', '\n'],
            "Enter",
            "trigger test run",
            CommandAction::Invoke,
        ))?;
        registry.register(Command::new(
            &['r'],
            "r",
            "reset all runner args",
            CommandAction::ResetArgs,
        ))?;
        registry.register(Command::new(
            &['c'],
            "c",
            "change runner args",
            CommandAction::ChangeArgs,
        ))?;
        registry.register(Command::new(
            &['f'],
            "f",
            format!("run only failed tests ({})", flags.only_failed),
            CommandAction::AppendFlag(flags.only_failed.clone()),
        ))?;
        registry.register(Command::new(
            &['p'],
            "p",
            format!("drop to pdb on fail ({})", flags.debug_on_failure),
            CommandAction::AppendFlag(flags.debug_on_failure.clone()),
        ))?;
        registry.register(Command::new(
            &['v'],
            "v",
            format!("increase verbosity ({})", flags.verbose),
            CommandAction::AppendFlag(flags.verbose.clone()),
        ))?;
        registry.register(Command::new(&['w'], "w", "show menu", CommandAction::ShowMenu).hidden())?;
        registry.register(Command::new(
            &['e'],
            "e",
            "redraw status line",
            CommandAction::ShowShortMenu,
        ))?;
        registry.register(Command::new(&['q'], "q", "quit ptw", CommandAction::Quit))?;

        Ok(registry)
    }

    /// Adds `command`, claiming all of its keys.
    ///
    /// # Errors
    ///
    /// Returns [`TuiError::DuplicateKeystroke`] if any key is already claimed
    /// or listed twice in `command`.
    /// The registry is left unchanged in that case.
    pub fn register(&mut self, command: Command) -> Result<(), TuiError> {
        for (i, &key) in command.keys.iter().enumerate() {
            let existing = match self.index.get(&key) {
                Some(&slot) => self.commands.get(slot).map_or("", |c| c.caption),
                None if command.keys[..i].contains(&key) => command.caption,
                None => continue,
            };
            return Err(TuiError::DuplicateKeystroke {
                key,
                existing,
                new: command.caption,
            });
        }

        let slot = self.commands.len();
        for &key in command.keys {
            self.index.insert(key, slot);
        }
        self.commands.push(command);
        Ok(())
    }

    /// Returns the commands in registration order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Looks up the command bound to `key`.
    #[must_use]
    pub fn get(&self, key: char) -> Option<&Command> {
        self.index.get(&key).and_then(|&slot| self.commands.get(slot))
    }

    /// Runs the command bound to `key`. Unbound keys are ignored.
    ///
    /// # Errors
    ///
    /// Propagates terminal failures from menu output and prompting.
    pub fn run_command(
        &self,
        key: char,
        trigger: &Trigger,
        terminal: &mut dyn Terminal,
        config: &mut RunnerConfig,
    ) -> Result<CommandOutcome, TuiError> {
        let Some(command) = self.get(key) else {
            debug!(key = ?key, "Unbound key");
            return Ok(CommandOutcome::Continue);
        };

        match &command.action {
            CommandAction::Invoke => trigger.emit_now(),
            CommandAction::ResetArgs => {
                config.runner_args.clear();
                trigger.emit_now();
            }
            CommandAction::ChangeArgs => change_args(trigger, terminal, config)?,
            CommandAction::AppendFlag(flag) => {
                config.add_runner_arg(flag);
                trigger.emit_now();
            }
            CommandAction::ShowMenu => {
                terminal.clear()?;
                menu::print_menu(terminal, &config.runner_args, &self.commands)?;
            }
            CommandAction::ShowShortMenu => {
                menu::print_short_menu(terminal, &config.runner_args)?;
            }
            CommandAction::Quit => return Ok(CommandOutcome::Quit),
        }

        Ok(CommandOutcome::Continue)
    }
}

/// Prompts for a new argument list. End of input leaves everything unchanged.
fn change_args(
    trigger: &Trigger,
    terminal: &mut dyn Terminal,
    config: &mut RunnerConfig,
) -> Result<(), TuiError> {
    let Some(line) = terminal.read_line("\nEnter new runner args: ")? else {
        return Ok(());
    };

    match shell_words::split(&line) {
        Ok(args) => {
            info!(args = ?args, "Runner args changed");
            config.runner_args = args;
            trigger.emit_now();
        }
        Err(source) => {
            let err = TuiError::InvalidArgs {
                input: line,
                source,
            };
            warn!(error = %err, "Runner args left unchanged");
        }
    }
    Ok(())
}
