//! Interactive keystroke loop, command registry and test runner invocation.
//!
//! This crate drives a watch session: it wires the file watcher into the
//! debounce trigger, runs the test runner whenever the trigger is due, and
//! lets the user adjust runner arguments with single keystrokes.
//!
//! # Architecture
//!
//! ```text
//! crates/ptw-tui/src/
//!   lib.rs        # run(): wiring and shutdown
//!   app.rs        # App: the polling loop
//!   commands.rs   # CommandRegistry and the built-in commands
//!   menu.rs       # status line and menu rendering
//!   runner.rs     # Runner trait and process invocation
//!   terminal.rs   # Terminal trait, crossterm and dummy terminals
//!   notify.rs     # desktop notifications on failure
//!   error.rs      # TuiError
//! ```
//!
//! # Threads
//!
//! ```text
//! notify thread ──► EventDispatcher ──► Trigger ◄── App (blocking task)
//!                                                    ├─► Terminal
//!                                                    └─► Runner (child process)
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use ptw_core::RunnerConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ptw_tui::TuiError> {
//!     let config = RunnerConfig::new(".");
//!     ptw_tui::run(config, CancellationToken::new()).await
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod app;
pub mod commands;
pub mod error;
pub mod menu;
pub mod notify;
pub mod runner;
pub mod terminal;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use ptw_core::{RunnerConfig, RunnerFlags, Trigger};
use ptw_watcher::{EventDispatcher, FileWatcher, PatternFilter};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

// Public re-exports
pub use app::App;
pub use commands::{Command, CommandAction, CommandOutcome, CommandRegistry};
pub use error::TuiError;
pub use notify::{DesktopNotifier, NoopNotifier, Notifier};
pub use runner::{ProcessRunner, RunOutcome, Runner};
pub use terminal::{CrosstermTerminal, DummyTerminal, Key, Terminal};

/// Runs a watch session until the user quits or `cancel` fires.
///
/// This is the main entry point for the ptw-tui crate. It:
///
/// 1. Builds the command registry and the pattern filter
/// 2. Starts the file watcher feeding the trigger
/// 3. Runs the interactive loop on a blocking task
/// 4. Stops and joins the watcher
///
/// # Errors
///
/// Returns an error if:
/// - Two commands claim the same keystroke
/// - A pattern is not a valid glob
/// - The file watcher fails to start
/// - The terminal fails while the loop is running
pub async fn run(config: RunnerConfig, cancel: CancellationToken) -> Result<(), TuiError> {
    let registry = CommandRegistry::builtin(&RunnerFlags::default())?;
    let filter = PatternFilter::new(&config.patterns, &config.ignore_patterns)?;

    let trigger = Arc::new(Trigger::new(config.delay));
    let dispatcher = EventDispatcher::new(Arc::clone(&trigger), filter);

    let watcher = FileWatcher::start(&config.path, true, dispatcher).await?;
    info!(path = %watcher.watch_path(), "Waiting for file changes");

    let mut app = App::new(config, trigger, registry, terminal::acquire(), ProcessRunner)
        .with_notifier(Box::new(DesktopNotifier))
        .with_cancellation(cancel);

    let result = tokio::task::spawn_blocking(move || app.run())
        .await
        .map_err(|_join_error| TuiError::TaskFailed)
        .and_then(|result| result);

    info!("Shutting down file watcher");
    if let Err(e) = watcher.shutdown().await {
        error!(error = %e, "Error shutting down watcher");
        result?;
        return Err(e.into());
    }

    result
}
