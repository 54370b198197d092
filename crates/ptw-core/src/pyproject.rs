//! Project config file discovery and parsing.
//!
//! Defaults may be stored in the `[tool.pytest-watcher]` table of the nearest
//! `pyproject.toml`, searched from the watch path upwards:
//!
//! ```toml
//! [tool.pytest-watcher]
//! now = true
//! clear = true
//! delay = 0.5
//! runner = "tox"
//! runner_args = ["-x"]
//! patterns = ["*.py", "*.toml"]
//! ignore_patterns = ["build/**"]
//! notify_on_failure = false
//! ```
//!
//! Unknown keys in the table are rejected; other tables are ignored.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// File name searched for project configuration.
pub const CONFIG_FILE_NAME: &str = "pyproject.toml";

/// Name of the table under `[tool]` holding ptw's settings.
pub const CONFIG_SECTION_NAME: &str = "pytest-watcher";

/// Settings read from the `[tool.pytest-watcher]` table.
///
/// Every field is optional; absent keys keep the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Request a run right after startup.
    pub now: Option<bool>,
    /// Clear the screen before every run.
    pub clear: Option<bool>,
    /// Debounce delay in seconds.
    pub delay: Option<f64>,
    /// Test runner executable.
    pub runner: Option<String>,
    /// Arguments passed to the runner.
    pub runner_args: Option<Vec<String>>,
    /// Include glob patterns.
    pub patterns: Option<Vec<String>>,
    /// Exclude glob patterns.
    pub ignore_patterns: Option<Vec<String>>,
    /// Deliver a desktop notification when the runner fails.
    pub notify_on_failure: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct PyProject {
    #[serde(default)]
    tool: Option<ToolTable>,
}

#[derive(Debug, Default, Deserialize)]
struct ToolTable {
    #[serde(rename = "pytest-watcher", default)]
    pytest_watcher: Option<FileConfig>,
}

/// Finds the nearest config file, starting at `start` and walking up its
/// ancestors.
///
/// `start` is canonicalized first so that relative paths like `.` still see
/// their parent directories.
#[must_use]
pub fn find_config(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let start = start
        .canonicalize_utf8()
        .unwrap_or_else(|_| start.to_path_buf());

    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Reads the `[tool.pytest-watcher]` table from the file at `path`.
///
/// Returns `Ok(None)` if the file has no such table.
pub fn load_config(path: &Utf8Path) -> Result<Option<FileConfig>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let section = parse_config(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path, found = section.is_some(), "Loaded config file");
    Ok(section)
}

fn parse_config(content: &str) -> Result<Option<FileConfig>, toml::de::Error> {
    let project: PyProject = toml::from_str(content)?;
    Ok(project.tool.and_then(|tool| tool.pytest_watcher))
}
