//! Command-line arguments.
//!
//! Anything ptw does not recognise belongs to the test runner, so the raw
//! arguments are first partitioned by [`split_known_args`]: known options and
//! the watch path go to clap, everything else is collected in order as
//! runner arguments.
//!
//! ```text
//! ptw . --now --lf -k slow --delay 1 tests/
//!     │  │     └──────┘     └──────┘ └────┘
//!     │  │   runner args    ptw     runner args
//!   path ptw
//! ```

use std::convert::Infallible;
use std::str::FromStr;

use camino::Utf8PathBuf;
use clap::Parser;

/// Options that consume the following argument as their value.
const VALUE_OPTIONS: &[&str] = &["--delay", "--runner", "--patterns", "--ignore-patterns"];

/// Options that stand alone.
const FLAG_OPTIONS: &[&str] = &[
    "--now",
    "--clear",
    "--notify-on-failure",
    "--verbose",
    "--no-color",
    "--version",
    "--help",
    "-h",
];

/// Watch a directory and re-run the test runner (pytest by default) after
/// every change.
///
/// Arguments ptw does not recognise are passed to the test runner.
#[derive(Debug, Parser)]
#[command(name = "ptw", version, about, long_about = None)]
pub struct Cli {
    /// The directory to watch for file changes.
    pub path: Utf8PathBuf,

    /// Trigger a test run immediately.
    #[arg(long)]
    pub now: bool,

    /// Clear the terminal screen before each test run.
    #[arg(long)]
    pub clear: bool,

    /// Seconds to wait after the last change before running (default: 0.2).
    #[arg(long, value_name = "SECS", allow_negative_numbers = true)]
    pub delay: Option<f64>,

    /// Executable that runs the tests (default: pytest).
    #[arg(long, value_name = "EXE")]
    pub runner: Option<String>,

    /// Comma-separated glob patterns to watch (default: '*.py').
    #[arg(long, value_name = "LIST")]
    pub patterns: Option<PatternList>,

    /// Comma-separated glob patterns to ignore (default: '').
    #[arg(long, value_name = "LIST")]
    pub ignore_patterns: Option<PatternList>,

    /// Show a desktop notification when the test run fails.
    #[arg(long)]
    pub notify_on_failure: bool,

    /// Enable verbose logging (debug level).
    #[arg(long)]
    pub verbose: bool,

    /// Disable colored log output.
    #[arg(long)]
    pub no_color: bool,

    /// Arguments passed through to the runner.
    #[arg(skip)]
    pub runner_args: Vec<String>,
}

impl Cli {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse_with_runner_args(args: impl IntoIterator<Item = String>) -> Self {
        let (known, runner_args) = split_known_args(args);
        let mut cli = Self::parse_from(known);
        cli.runner_args = runner_args;
        cli
    }
}

/// A comma-separated list of glob patterns. Empty entries are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternList(pub Vec<String>);

impl FromStr for PatternList {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect(),
        ))
    }
}

/// Splits raw arguments (program name first) into the arguments clap should
/// parse and the arguments for the runner.
///
/// The first positional argument is the watch path; later positionals belong
/// to the runner. Everything after a bare `--` belongs to the runner.
pub fn split_known_args(args: impl IntoIterator<Item = String>) -> (Vec<String>, Vec<String>) {
    let mut args = args.into_iter();
    let mut known: Vec<String> = args.next().into_iter().collect();
    let mut runner = Vec::new();
    let mut seen_path = false;

    while let Some(arg) = args.next() {
        if arg == "--" {
            runner.extend(args.by_ref());
            break;
        }

        let name = arg.split_once('=').map_or(arg.as_str(), |(name, _)| name);

        if VALUE_OPTIONS.contains(&name) {
            let inline_value = name.len() < arg.len();
            known.push(arg);
            if !inline_value {
                known.extend(args.next());
            }
        } else if FLAG_OPTIONS.contains(&arg.as_str()) {
            known.push(arg);
        } else if !seen_path && !arg.starts_with('-') {
            seen_path = true;
            known.push(arg);
        } else {
            runner.push(arg);
        }
    }

    (known, runner)
}
