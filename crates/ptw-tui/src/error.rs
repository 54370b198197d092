//! Interactive-loop error types.
//!
//! This module provides the [`TuiError`] type for handling errors that can
//! occur while wiring up and running the interactive loop.

use thiserror::Error;

/// Errors that can occur in the interactive loop.
///
/// Startup errors ([`Watcher`](Self::Watcher),
/// [`DuplicateKeystroke`](Self::DuplicateKeystroke)) are fatal before the loop
/// starts. A runner that cannot be launched ([`Launch`](Self::Launch)) is
/// reported and the loop keeps going.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TuiError {
    /// Terminal operation failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// File watcher operation failed.
    #[error("watcher error: {0}")]
    Watcher(#[from] ptw_watcher::WatchError),

    /// Two commands claim the same keystroke.
    #[error("keystroke {key:?} is claimed by both '{existing}' and '{new}'")]
    DuplicateKeystroke {
        /// The contested keystroke.
        key: char,
        /// Caption of the command registered first.
        existing: &'static str,
        /// Caption of the command being registered.
        new: &'static str,
    },

    /// The runner executable could not be started.
    #[error("failed to launch '{program}': {source}")]
    Launch {
        /// The executable that failed to start.
        program: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// Runner arguments typed at the prompt could not be split.
    #[error("invalid runner arguments '{input}': {source}")]
    InvalidArgs {
        /// The line as typed.
        input: String,
        /// The underlying parse error.
        #[source]
        source: shell_words::ParseError,
    },

    /// The interactive loop task stopped unexpectedly.
    #[error("interactive loop stopped unexpectedly")]
    TaskFailed,
}

impl TuiError {
    /// Returns `true` if the loop can continue after this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Launch { .. } | Self::InvalidArgs { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_keystroke_display() {
        let err = TuiError::DuplicateKeystroke {
            key: 'r',
            existing: "r",
            new: "reload",
        };
        assert_eq!(
            err.to_string(),
            "keystroke 'r' is claimed by both 'r' and 'reload'"
        );
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_launch_is_recoverable() {
        let err = TuiError::Launch {
            program: "pytest".to_owned(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.is_recoverable());
        assert!(err.to_string().starts_with("failed to launch 'pytest'"));
    }

    #[test]
    fn test_invalid_args_is_recoverable() {
        let source = shell_words::split("-k 'unterminated").expect_err("unbalanced quote");
        let err = TuiError::InvalidArgs {
            input: "-k 'unterminated".to_owned(),
            source,
        };
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_task_failed_display() {
        assert_eq!(
            TuiError::TaskFailed.to_string(),
            "interactive loop stopped unexpectedly"
        );
    }
}
