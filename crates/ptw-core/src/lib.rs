//! Core types, configuration and the debounce trigger for ptw.
//!
//! This crate provides the foundational pieces shared across the workspace:
//!
//! - [`Trigger`], the only object shared between the filesystem-event thread
//!   and the interactive loop
//! - [`RunnerConfig`] and [`RunnerFlags`], describing how the test runner is
//!   invoked
//! - Discovery and parsing of the `[tool.pytest-watcher]` table in
//!   `pyproject.toml`
//! - [`ConfigError`] for fatal startup configuration failures
//!
//! # Crate Dependencies
//!
//! ```text
//! ptw-cli ──► ptw-tui ──► ptw-watcher ──► ptw-core
//!                   └────────────────────►
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod pyproject;
pub mod trigger;

pub use config::{
    DEFAULT_DELAY, DEFAULT_RUNNER, LOOP_INTERVAL, RunnerConfig, RunnerFlags, delay_from_secs,
};
pub use error::ConfigError;
pub use pyproject::{CONFIG_FILE_NAME, CONFIG_SECTION_NAME, FileConfig, find_config, load_config};
pub use trigger::Trigger;
