//! Test runner invocation.
//!
//! [`invoke`] performs one run: it leaves capture mode so the child gets a
//! normal terminal, optionally clears the screen, and blocks until the runner
//! exits. The runner's exit status is informational only. A runner that
//! cannot be launched is logged and reported on the terminal, and the loop
//! carries on.

use std::process::Command;

use ptw_core::RunnerConfig;
use tracing::{info, warn};

use crate::error::TuiError;
use crate::terminal::Terminal;

/// Exit status of one runner invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit code, or `None` if the runner was killed by a signal.
    pub code: Option<i32>,
}

impl RunOutcome {
    /// Returns `true` if the runner exited with code 0.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Spawns the test runner and waits for it.
pub trait Runner: Send {
    /// Runs `program` with `args` in the foreground.
    ///
    /// # Errors
    ///
    /// Returns [`TuiError::Launch`] if the process cannot be started.
    fn run(&mut self, program: &str, args: &[String]) -> Result<RunOutcome, TuiError>;
}

impl<R: Runner + ?Sized> Runner for Box<R> {
    fn run(&mut self, program: &str, args: &[String]) -> Result<RunOutcome, TuiError> {
        (**self).run(program, args)
    }
}

/// Runs the test runner as a child process sharing this terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<RunOutcome, TuiError> {
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|source| TuiError::Launch {
                program: program.to_owned(),
                source,
            })?;
        Ok(RunOutcome {
            code: status.code(),
        })
    }
}

/// Runs the configured runner once.
///
/// Returns `None` if the runner could not be launched.
///
/// # Errors
///
/// Only terminal failures are returned.
pub fn invoke(
    terminal: &mut dyn Terminal,
    runner: &mut dyn Runner,
    config: &RunnerConfig,
) -> Result<Option<RunOutcome>, TuiError> {
    terminal.reset()?;
    if config.clear {
        terminal.clear()?;
    }

    info!(runner = %config.runner, args = ?config.runner_args, "Running tests");

    match runner.run(&config.runner, &config.runner_args) {
        Ok(outcome) => {
            info!(code = ?outcome.code, "Runner finished");
            Ok(Some(outcome))
        }
        Err(e) if e.is_recoverable() => {
            warn!(error = %e, "Runner could not be started");
            terminal.print(&format!("{e}\n"))?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingRunner, ScriptedTerminal};

    #[test]
    fn test_run_outcome_success() {
        assert!(RunOutcome { code: Some(0) }.success());
        assert!(!RunOutcome { code: Some(1) }.success());
        assert!(!RunOutcome { code: None }.success());
    }

    #[test]
    fn test_invoke_passes_args_positionally() {
        let mut terminal = ScriptedTerminal::new();
        let mut runner = RecordingRunner::exiting_with(0);
        let mut config = RunnerConfig::new(".");
        config.runner_args = vec!["--lf".to_owned(), "tests/".to_owned()];

        let outcome = invoke(&mut terminal, &mut runner, &config).expect("invoke");

        assert_eq!(outcome, Some(RunOutcome { code: Some(0) }));
        assert_eq!(runner.calls(), [("pytest".to_owned(), config.runner_args.clone())]);
    }

    #[test]
    fn test_invoke_resets_terminal_before_run() {
        let mut terminal = ScriptedTerminal::new();
        terminal.enter_capturing_mode().expect("capture");
        let mut runner = RecordingRunner::exiting_with(0);

        invoke(&mut terminal, &mut runner, &RunnerConfig::new(".")).expect("invoke");

        assert!(!terminal.capturing);
        assert_eq!(terminal.clears, 0);
    }

    #[test]
    fn test_invoke_clears_when_configured() {
        let mut terminal = ScriptedTerminal::new();
        let mut runner = RecordingRunner::exiting_with(0);
        let mut config = RunnerConfig::new(".");
        config.clear = true;

        invoke(&mut terminal, &mut runner, &config).expect("invoke");

        assert_eq!(terminal.clears, 1);
    }

    #[test]
    fn test_invoke_failing_runner_is_not_an_error() {
        let mut terminal = ScriptedTerminal::new();
        let mut runner = RecordingRunner::exiting_with(2);

        let outcome = invoke(&mut terminal, &mut runner, &RunnerConfig::new(".")).expect("invoke");

        assert_eq!(outcome, Some(RunOutcome { code: Some(2) }));
    }

    #[test]
    fn test_invoke_launch_failure_is_reported() {
        let mut terminal = ScriptedTerminal::new();
        let mut runner = RecordingRunner::failing_to_launch();

        let outcome = invoke(&mut terminal, &mut runner, &RunnerConfig::new(".")).expect("invoke");

        assert_eq!(outcome, None);
        assert!(terminal.output.contains("failed to launch 'pytest'"));
    }

    #[test]
    fn test_process_runner_missing_executable() {
        let err = ProcessRunner
            .run("ptw-definitely-not-a-real-runner", &[])
            .expect_err("missing executable");
        assert!(matches!(err, TuiError::Launch { .. }));
    }
}
