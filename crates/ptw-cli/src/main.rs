//! CLI entry point for ptw.
//!
//! Watches a directory and re-runs the test runner shortly after files stop
//! changing. Single keystrokes adjust the runner arguments while it waits.
//!
//! # Usage
//!
//! ```bash
//! ptw [OPTIONS] <PATH> [RUNNER ARGS]...
//!
//! # Run pytest now and on every change below the current directory
//! ptw . --now
//!
//! # Pass arguments through to pytest
//! ptw src --lf -x
//!
//! # Use another runner and watch templates as well
//! ptw . --runner tox --patterns '*.py,templates/*.html'
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod args;

use std::io::{self, IsTerminal, Write};

use ptw_core::{RunnerConfig, delay_from_secs, find_config, load_config};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::Cli;

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
/// The `notify` crate is filtered to `warn` level.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},notify=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(StderrWriter::new()),
        )
        .with(filter)
        .init();
}

/// Log destination that keeps lines aligned while the terminal is in raw
/// capture mode.
#[derive(Debug, Clone, Copy)]
struct StderrWriter {
    crlf: bool,
}

impl StderrWriter {
    fn new() -> Self {
        Self {
            crlf: io::stderr().is_terminal(),
        }
    }
}

impl<'a> MakeWriter<'a> for StderrWriter {
    type Writer = LineEndingWriter<io::StderrLock<'static>>;

    fn make_writer(&'a self) -> Self::Writer {
        LineEndingWriter {
            inner: io::stderr().lock(),
            crlf: self.crlf,
        }
    }
}

/// Rewrites bare `\n` as `\r\n` when `crlf` is set.
struct LineEndingWriter<W> {
    inner: W,
    crlf: bool,
}

impl<W: Write> Write for LineEndingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.crlf {
            return self.inner.write(buf);
        }
        for line in buf.split_inclusive(|&b| b == b'\n') {
            match line.strip_suffix(b"\n") {
                Some(body) if !body.ends_with(b"\r") => {
                    self.inner.write_all(body)?;
                    self.inner.write_all(b"\r\n")?;
                }
                _ => self.inner.write_all(line)?,
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Builds the [`RunnerConfig`] from defaults, the config file and the CLI,
/// in that order.
///
/// # Errors
///
/// Returns an error if the path is not a directory, the config file is
/// malformed or has unknown keys, or an option value is invalid.
fn build_config(cli: Cli) -> color_eyre::Result<RunnerConfig> {
    let mut config = RunnerConfig::new(cli.path);
    config.validate()?;

    if let Some(file) = find_config(&config.path) {
        if let Some(table) = load_config(&file)? {
            info!(path = %file, "Using configuration");
            config.apply_file(table)?;
        }
    }

    if cli.now {
        config.now = true;
    }
    if cli.clear {
        config.clear = true;
    }
    if let Some(secs) = cli.delay {
        config.delay = delay_from_secs(secs)?;
    }
    if let Some(runner) = cli.runner {
        config.runner = runner;
    }
    if let Some(patterns) = cli.patterns {
        config.patterns = patterns.0;
    }
    if let Some(ignore_patterns) = cli.ignore_patterns {
        config.ignore_patterns = ignore_patterns.0;
    }
    if cli.notify_on_failure {
        config.notify_on_failure = true;
    }
    if !cli.runner_args.is_empty() {
        config.runner_args = cli.runner_args;
    }

    debug!(?config, "Resolved configuration");
    Ok(config)
}

/// Cancels `cancel` on Ctrl-C, and on SIGTERM on Unix.
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("Received shutdown signal");
        cancel.cancel();
    });
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "Unable to listen for SIGTERM");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments, splitting off the runner's
    let cli = Cli::parse_with_runner_args(
        std::env::args_os().map(|arg| arg.to_string_lossy().into_owned()),
    );

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Merge configuration
    let config = build_config(cli)?;

    info!("ptw version {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Runner command: {} {}",
        config.runner,
        config.runner_args.join(" ")
    );

    // 5. Run until quit or signal
    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    ptw_tui::run(config, cancel).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn cli(dir: &TempDir, extra: &[&str]) -> Cli {
        let path = Utf8Path::from_path(dir.path()).expect("utf-8 temp dir");
        let args = ["ptw", path.as_str()]
            .into_iter()
            .chain(extra.iter().copied())
            .map(str::to_owned);
        Cli::parse_with_runner_args(args)
    }

    fn write_pyproject(dir: &TempDir, table: &str) {
        let content = format!("[tool.pytest-watcher]\n{table}");
        fs::write(dir.path().join("pyproject.toml"), content).expect("write pyproject");
    }

    #[test]
    fn test_build_config_defaults() {
        let dir = TempDir::new().expect("temp dir");

        let config = build_config(cli(&dir, &[])).expect("config");

        assert_eq!(config.runner, "pytest");
        assert_eq!(config.delay, ptw_core::DEFAULT_DELAY);
        assert!(config.runner_args.is_empty());
        assert!(!config.now);
    }

    #[test]
    fn test_build_config_file_then_cli() {
        let dir = TempDir::new().expect("temp dir");
        write_pyproject(
            &dir,
            "runner = \"tox\"\ndelay = 2.0\nrunner_args = [\"--lf\"]\nclear = true\n",
        );

        let config = build_config(cli(&dir, &["--delay", "0.5"])).expect("config");

        assert_eq!(config.runner, "tox");
        assert_eq!(config.delay, Duration::from_millis(500));
        assert_eq!(config.runner_args, ["--lf"]);
        assert!(config.clear);
    }

    #[test]
    fn test_build_config_cli_runner_args_replace_file() {
        let dir = TempDir::new().expect("temp dir");
        write_pyproject(&dir, "runner_args = [\"--lf\"]\n");

        let config = build_config(cli(&dir, &["-x", "-k", "slow"])).expect("config");

        assert_eq!(config.runner_args, ["-x", "-k", "slow"]);
    }

    #[test]
    fn test_build_config_unknown_key_is_fatal() {
        let dir = TempDir::new().expect("temp dir");
        write_pyproject(&dir, "colour = true\n");

        assert!(build_config(cli(&dir, &[])).is_err());
    }

    #[test]
    fn test_build_config_negative_delay_is_fatal() {
        let dir = TempDir::new().expect("temp dir");

        assert!(build_config(cli(&dir, &["--delay", "-1"])).is_err());
    }

    #[test]
    fn test_line_ending_writer() {
        let mut writer = LineEndingWriter {
            inner: Vec::new(),
            crlf: true,
        };
        writer.write_all(b"one\ntwo\r\nthree").expect("write");
        assert_eq!(writer.inner, b"one\r\ntwo\r\nthree");

        let mut plain = LineEndingWriter {
            inner: Vec::new(),
            crlf: false,
        };
        plain.write_all(b"one\n").expect("write");
        assert_eq!(plain.inner, b"one\n");
    }
}
