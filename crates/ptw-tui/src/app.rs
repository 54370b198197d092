//! The interactive loop.
//!
//! [`App`] owns the runner configuration, the command registry, the terminal
//! and the runner. It shares only the [`Trigger`] with the watcher thread.
//!
//! # State Machine
//!
//! ```text
//!            emit / emit_now               due time reached
//!   IDLE ──────────────────────► PENDING ──────────────────► DUE
//!    ▲                                                        │
//!    └──────── reset → run → release → capture → menu ◄───────┘
//! ```
//!
//! Every [`tick`](App::tick):
//!
//! 1. If the trigger is due, run the tests and release the trigger.
//! 2. Dispatch at most one buffered keystroke.
//!
//! [`run`](App::run) repeats ticks with a fixed sleep in between until a quit
//! command, an interrupt key or cancellation, and restores the terminal
//! however the loop ended.

use std::sync::Arc;
use std::time::Duration;

use ptw_core::{LOOP_INTERVAL, RunnerConfig, Trigger};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::commands::{CommandOutcome, CommandRegistry};
use crate::error::TuiError;
use crate::menu;
use crate::notify::{self, NoopNotifier, Notifier};
use crate::runner::{self, RunOutcome, Runner};
use crate::terminal::{Key, Terminal};

/// Title used for failure notifications.
const NOTIFICATION_TITLE: &str = "ptw";

/// Interactive loop state.
pub struct App<T, R> {
    config: RunnerConfig,
    trigger: Arc<Trigger>,
    registry: CommandRegistry,
    terminal: T,
    runner: R,
    notifier: Box<dyn Notifier>,
    loop_interval: Duration,
    cancel: CancellationToken,
    should_quit: bool,
}

impl<T, R> std::fmt::Debug for App<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("trigger", &self.trigger)
            .field("loop_interval", &self.loop_interval)
            .field("should_quit", &self.should_quit)
            .finish_non_exhaustive()
    }
}

impl<T: Terminal, R: Runner> App<T, R> {
    /// Creates a loop that never notifies and is never cancelled.
    #[must_use]
    pub fn new(
        config: RunnerConfig,
        trigger: Arc<Trigger>,
        registry: CommandRegistry,
        terminal: T,
        runner: R,
    ) -> Self {
        Self {
            config,
            trigger,
            registry,
            terminal,
            runner,
            notifier: Box::new(NoopNotifier),
            loop_interval: LOOP_INTERVAL,
            cancel: CancellationToken::new(),
            should_quit: false,
        }
    }

    /// Sets the notifier used when `notify_on_failure` is enabled.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Sets the token that stops the loop from outside.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets the sleep between two ticks.
    #[must_use]
    pub fn with_loop_interval(mut self, interval: Duration) -> Self {
        self.loop_interval = interval;
        self
    }

    /// Returns the current runner configuration.
    #[must_use]
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Returns the shared trigger.
    #[must_use]
    pub const fn trigger(&self) -> &Arc<Trigger> {
        &self.trigger
    }

    /// Returns the terminal.
    #[must_use]
    pub const fn terminal(&self) -> &T {
        &self.terminal
    }

    /// Returns the runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Returns `true` once a quit was requested.
    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Enters capture mode and either schedules an immediate run (`now`) or
    /// shows the full menu on an interactive terminal.
    ///
    /// # Errors
    ///
    /// Propagates terminal failures.
    pub fn start(&mut self) -> Result<(), TuiError> {
        self.terminal.enter_capturing_mode()?;
        if self.config.now {
            self.trigger.emit_now();
        } else if self.terminal.is_interactive() {
            menu::print_menu(
                &mut self.terminal,
                &self.config.runner_args,
                self.registry.commands(),
            )?;
        }
        Ok(())
    }

    /// Performs one iteration of the loop without sleeping.
    ///
    /// # Errors
    ///
    /// Propagates terminal failures.
    pub fn tick(&mut self) -> Result<(), TuiError> {
        if self.trigger.check() {
            self.run_tests()?;
        }

        if let Some(key) = self.terminal.capture_keystroke()? {
            self.handle_key(key)?;
        }

        Ok(())
    }

    /// Runs the loop until quit or cancellation, then restores the terminal.
    ///
    /// # Errors
    ///
    /// Propagates terminal failures. The terminal is reset in every case.
    pub fn run(&mut self) -> Result<(), TuiError> {
        let result = self.start().and_then(|()| self.event_loop());
        let reset = self.terminal.reset();
        result.and(reset)
    }

    fn event_loop(&mut self) -> Result<(), TuiError> {
        info!("Entering main loop");
        loop {
            if self.cancel.is_cancelled() {
                info!("Shutdown requested");
                break;
            }

            self.tick()?;

            if self.should_quit {
                info!("Quit requested");
                break;
            }

            std::thread::sleep(self.loop_interval);
        }
        Ok(())
    }

    fn run_tests(&mut self) -> Result<(), TuiError> {
        let outcome = runner::invoke(&mut self.terminal, &mut self.runner, &self.config)?;
        self.trigger.release();

        self.terminal.enter_capturing_mode()?;
        if self.terminal.is_interactive() {
            menu::print_short_menu(&mut self.terminal, &self.config.runner_args)?;
        }

        if let Some(outcome) = outcome {
            self.report(outcome);
        }
        Ok(())
    }

    fn report(&self, outcome: RunOutcome) {
        if outcome.success() || !self.config.notify_on_failure {
            return;
        }
        let message = notify::failure_message(&self.config.runner, outcome);
        debug!(message = %message, "Sending failure notification");
        self.notifier.notify(NOTIFICATION_TITLE, &message);
    }

    fn handle_key(&mut self, key: Key) -> Result<(), TuiError> {
        match key {
            Key::Interrupt => {
                debug!("Interrupt key");
                self.should_quit = true;
            }
            Key::Char(c) => {
                let outcome = self.registry.run_command(
                    c,
                    &self.trigger,
                    &mut self.terminal,
                    &mut self.config,
                )?;
                if outcome == CommandOutcome::Quit {
                    self.should_quit = true;
                }
            }
        }
        Ok(())
    }
}
