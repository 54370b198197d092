//! Status line and command menu rendering.

use std::fmt::Write as _;

use crate::commands::Command;
use crate::error::TuiError;
use crate::terminal::Terminal;

/// Renders the header showing the current runner arguments.
#[must_use]
pub fn header(runner_args: &[String]) -> String {
    format!("[ptw]\nCurrent runner args: [{}]", runner_args.join(" "))
}

/// Renders the short status menu shown after every run.
#[must_use]
pub fn short_menu(runner_args: &[String]) -> String {
    format!("{}\nPress w to show menu\n", header(runner_args))
}

/// Renders the full menu listing every visible command.
#[must_use]
pub fn full_menu(runner_args: &[String], commands: &[Command]) -> String {
    let mut menu = header(runner_args);
    menu.push_str("\n\nControls:\n");
    for command in commands.iter().filter(|c| c.show_in_menu) {
        let _ = writeln!(menu, "> {:<5} : {}", command.caption, command.description);
    }
    menu
}

/// Prints the short status menu.
pub fn print_short_menu(terminal: &mut dyn Terminal, runner_args: &[String]) -> Result<(), TuiError> {
    terminal.print(&short_menu(runner_args))
}

/// Prints the full command menu.
pub fn print_menu(
    terminal: &mut dyn Terminal,
    runner_args: &[String],
    commands: &[Command],
) -> Result<(), TuiError> {
    terminal.print(&full_menu(runner_args, commands))
}
