//! Error types for the ptw-core crate.
//!
//! This module provides the [`ConfigError`] type for configuration failures.
//! All of them are fatal at startup: the process reports the error and exits
//! before the watch loop starts.

use camino::Utf8PathBuf;

/// Errors that can occur while loading and validating configuration.
///
/// # Examples
///
/// ```
/// use ptw_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::MissingDirectory(Utf8PathBuf::from("/some/path"));
/// assert!(error.to_string().contains("/some/path"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The watch path does not exist.
    #[error("path does not exist: {0}")]
    MissingDirectory(Utf8PathBuf),

    /// The watch path exists but is not a directory.
    #[error("path is not a directory: {0}")]
    NotADirectory(Utf8PathBuf),

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// The config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The config file being read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is malformed or contains an unrecognized option.
    #[error("error parsing {path}: {source}")]
    Parse {
        /// The config file being parsed.
        path: Utf8PathBuf,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// Returns the file or directory path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::MissingDirectory(path)
            | Self::NotADirectory(path)
            | Self::Io { path, .. }
            | Self::Parse { path, .. } => Some(path),
            Self::InvalidOption { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_display() {
        let error = ConfigError::MissingDirectory(Utf8PathBuf::from("/missing/dir"));
        assert_eq!(error.to_string(), "path does not exist: /missing/dir");
        assert_eq!(error.path().map(|p| p.as_str()), Some("/missing/dir"));
    }

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::InvalidOption {
            option: "delay".to_owned(),
            reason: "must be positive".to_owned(),
        };
        let msg = error.to_string();
        assert!(msg.contains("delay"));
        assert!(msg.contains("must be positive"));
        assert!(error.path().is_none());
    }

    #[test]
    fn test_io_display() {
        let error = ConfigError::Io {
            path: Utf8PathBuf::from("pyproject.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(error.to_string().starts_with("failed to read pyproject.toml"));
    }
}
