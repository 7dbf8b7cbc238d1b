//! Error types for the tsp-core crate.
//!
//! This module provides [`ConfigError`] for configuration and project file
//! failures, and [`RemoveError`] for deletions that fail for any reason other
//! than the target already being gone.

use camino::{Utf8Path, Utf8PathBuf};

/// Errors that can occur during configuration loading and validation.
///
/// This error type covers option validation, missing directories, and
/// failures reading or parsing `tsconfig.json` files.
///
/// # Examples
///
/// ```
/// use tsp_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::MissingDirectory(Utf8PathBuf::from("/some/path"));
/// assert!(error.to_string().contains("/some/path"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The provided path is invalid or malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path.
        path: Utf8PathBuf,
        /// Explanation of why the path is invalid.
        reason: String,
    },

    /// A required directory does not exist.
    #[error("missing required directory: {0}")]
    MissingDirectory(Utf8PathBuf),

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// A project configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file that could not be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A project configuration file is not valid JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The file that could not be parsed.
        path: Utf8PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A chain of `extends` entries loops back on itself.
    #[error("tsconfig extends cycle through {0}")]
    ExtendsCycle(Utf8PathBuf),
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidOption`] error.
    #[inline]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new [`ConfigError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::InvalidPath { path, .. }
            | Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::MissingDirectory(path)
            | Self::ExtendsCycle(path) => Some(path),
            Self::InvalidOption { .. } => None,
        }
    }
}

/// A file or directory that exists but could not be removed.
///
/// A target that is already absent is never reported: removal is
/// delete-if-exists throughout the workspace.
#[derive(Debug, thiserror::Error)]
#[error("failed to remove {path}: {source}")]
pub struct RemoveError {
    /// The path that could not be removed.
    pub path: Utf8PathBuf,
    /// The underlying I/O error.
    #[source]
    pub source: std::io::Error,
}

impl RemoveError {
    /// Creates a new [`RemoveError`].
    #[inline]
    pub fn new(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}
