//! Runner configuration.
//!
//! This module provides the configuration types that describe how the test
//! runner is invoked:
//!
//! - [`RunnerConfig`] - watch path, runner command, debounce delay, patterns
//! - [`RunnerFlags`] - flag spellings appended by the interactive commands
//!
//! A [`RunnerConfig`] is built once at startup from defaults, the
//! `[tool.pytest-watcher]` table of the nearest `pyproject.toml`, and the
//! command line, in that order. After startup it is owned by the interactive
//! loop, which is its only writer.

use std::time::Duration;

use camino::Utf8PathBuf;

use crate::error::ConfigError;
use crate::pyproject::FileConfig;

/// Default debounce delay applied after the last relevant file event.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(200);

/// Interval between two ticks of the interactive loop.
///
/// Bounds CPU usage and keystroke latency. Deliberately independent of the
/// debounce delay.
pub const LOOP_INTERVAL: Duration = Duration::from_millis(100);

/// Test runner executable used when none is configured.
pub const DEFAULT_RUNNER: &str = "pytest";

/// Largest accepted debounce delay, in seconds.
const MAX_DELAY_SECS: f64 = 86_400.0;

/// Configuration describing what to watch and how to run the tests.
///
/// # Examples
///
/// ```
/// use ptw_core::{RunnerConfig, DEFAULT_DELAY};
///
/// let config = RunnerConfig::new(".");
/// assert_eq!(config.runner, "pytest");
/// assert_eq!(config.delay, DEFAULT_DELAY);
/// assert!(config.runner_args.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Directory watched recursively for changes.
    pub path: Utf8PathBuf,

    /// Request a run right after startup.
    pub now: bool,

    /// Clear the screen before every run.
    pub clear: bool,

    /// Debounce delay between the last file event and the run.
    pub delay: Duration,

    /// Test runner executable.
    pub runner: String,

    /// Arguments passed positionally to the runner. Order is significant.
    pub runner_args: Vec<String>,

    /// Glob patterns selecting the files that trigger a run.
    ///
    /// Empty means the watcher's default (`*.py`).
    pub patterns: Vec<String>,

    /// Glob patterns excluding files from triggering a run.
    pub ignore_patterns: Vec<String>,

    /// Deliver a desktop notification when the runner fails.
    pub notify_on_failure: bool,
}

impl RunnerConfig {
    /// Creates a configuration with default values for the given path.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            now: false,
            clear: false,
            delay: DEFAULT_DELAY,
            runner: DEFAULT_RUNNER.to_owned(),
            runner_args: Vec::new(),
            patterns: Vec::new(),
            ignore_patterns: Vec::new(),
            notify_on_failure: false,
        }
    }

    /// Applies the values present in a config file section.
    ///
    /// Keys missing from the file leave the current value untouched.
    pub fn apply_file(&mut self, file: FileConfig) -> Result<(), ConfigError> {
        if let Some(now) = file.now {
            self.now = now;
        }
        if let Some(clear) = file.clear {
            self.clear = clear;
        }
        if let Some(delay) = file.delay {
            self.delay = delay_from_secs(delay)?;
        }
        if let Some(runner) = file.runner {
            self.runner = runner;
        }
        if let Some(runner_args) = file.runner_args {
            self.runner_args = runner_args;
        }
        if let Some(patterns) = file.patterns {
            self.patterns = patterns;
        }
        if let Some(ignore_patterns) = file.ignore_patterns {
            self.ignore_patterns = ignore_patterns;
        }
        if let Some(notify_on_failure) = file.notify_on_failure {
            self.notify_on_failure = notify_on_failure;
        }
        Ok(())
    }

    /// Checks that the watch path exists and is a directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::MissingDirectory(self.path.clone()));
        }
        if !self.path.is_dir() {
            return Err(ConfigError::NotADirectory(self.path.clone()));
        }
        Ok(())
    }

    /// Appends `flag` to the runner arguments unless it is already present.
    ///
    /// Returns `true` if the flag was added.
    pub fn add_runner_arg(&mut self, flag: &str) -> bool {
        if self.runner_args.iter().any(|arg| arg == flag) {
            return false;
        }
        self.runner_args.push(flag.to_owned());
        true
    }
}

/// Converts a delay given in seconds into a [`Duration`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidOption`] if the value is negative, not
/// finite, or larger than one day.
pub fn delay_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    if !secs.is_finite() || secs < 0.0 || secs > MAX_DELAY_SECS {
        return Err(ConfigError::InvalidOption {
            option: "delay".to_owned(),
            reason: format!("expected a number of seconds between 0 and {MAX_DELAY_SECS}, got {secs}"),
        });
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Flag spellings appended to the runner arguments by interactive commands.
///
/// The defaults are pytest's spellings.
///
/// # Examples
///
/// ```
/// use ptw_core::RunnerFlags;
///
/// let flags = RunnerFlags::default();
/// assert_eq!(flags.only_failed, "--lf");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerFlags {
    /// Run only the tests that failed last time.
    pub only_failed: String,

    /// Drop into the debugger on failure.
    pub debug_on_failure: String,

    /// Increase verbosity.
    pub verbose: String,
}

impl Default for RunnerFlags {
    fn default() -> Self {
        Self {
            only_failed: "--lf".to_owned(),
            debug_on_failure: "--pdb".to_owned(),
            verbose: "-v".to_owned(),
        }
    }
}
