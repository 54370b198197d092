//! Error types for the ptw-watcher crate.
//!
//! This module provides the [`WatchError`] type for errors that can occur
//! while building filters and running the file watcher.

use camino::Utf8PathBuf;

/// Errors that can occur during file watching operations.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`WatchError::Notify`]): Fatal at startup
/// - **Path not found** ([`WatchError::PathNotFound`]): Fatal - path must exist
/// - **Invalid pattern** ([`WatchError::InvalidPattern`]): Fatal at startup
/// - **Task failed** ([`WatchError::TaskFailed`]): Fatal - the watch thread is gone
/// - **Non-UTF-8 path** ([`WatchError::NonUtf8Path`]): Recoverable - skip and continue
/// - **I/O errors** ([`WatchError::Io`]): Fatal - propagate immediately
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize or operate the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The specified path does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// An include or exclude pattern is not a valid glob.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern as configured.
        pattern: String,
        /// The underlying glob error.
        #[source]
        source: globset::Error,
    },

    /// The blocking watch task stopped unexpectedly.
    #[error("watcher task stopped unexpectedly")]
    TaskFailed,

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_watch_error_path_not_found() {
        let err = WatchError::path_not_found("src/missing");
        assert_eq!(err.to_string(), "path does not exist: src/missing");
    }

    #[test]
    fn test_watch_error_invalid_pattern() {
        let source = globset::Glob::new("[").expect_err("unclosed class");
        let err = WatchError::InvalidPattern {
            pattern: "[".to_owned(),
            source,
        };
        assert!(err.to_string().starts_with("invalid pattern '['"));
    }

    #[test]
    fn test_watch_error_non_utf8() {
        let err = WatchError::NonUtf8Path(PathBuf::from("test"));
        assert!(err.to_string().contains("not valid UTF-8"));
    }
}
