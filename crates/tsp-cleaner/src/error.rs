//! Error types for the tsp-cleaner crate.
//!
//! This module provides the [`CleanError`] type for errors that can occur
//! while walking the output tree and removing orphaned artifacts.

use camino::{Utf8Path, Utf8PathBuf};
use tsp_core::{ConfigError, RemoveError};

/// Errors that can occur during a clean.
///
/// # Error Recovery Strategy
///
/// - **Walk errors** ([`CleanError::Walk`]): Fatal - the pass stops before
///   anything further is deleted
/// - **Remove errors** ([`CleanError::Remove`]): Fatal - a file that exists
///   but cannot be removed is reported, not skipped
/// - **Missing source** ([`CleanError::MissingSourceDir`]): Recoverable -
///   project traversal logs it and moves on to the next project
///
/// # Examples
///
/// ```
/// use tsp_cleaner::CleanError;
///
/// fn handle_error(err: CleanError) {
///     match err {
///         CleanError::Walk(e) => eprintln!("Walk error: {e}"),
///         CleanError::Remove(e) => eprintln!("Remove error: {}", e.path),
///         CleanError::MissingSourceDir(p) => eprintln!("No sources in {p}"),
///         CleanError::NotADirectory(p) => eprintln!("Not a directory: {p}"),
///         CleanError::Config(e) => eprintln!("Config error: {e}"),
///         CleanError::NonUtf8Path(p) => eprintln!("Invalid path: {}", p.display()),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    /// Failed to walk the output directory.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Failed to remove an artifact.
    #[error(transparent)]
    Remove(#[from] RemoveError),

    /// The source directory does not exist.
    ///
    /// Every output file would look orphaned, so the clean refuses to run.
    #[error("source directory does not exist: {0}")]
    MissingSourceDir(Utf8PathBuf),

    /// The output path exists but is not a directory.
    #[error("output path is not a directory: {0}")]
    NotADirectory(Utf8PathBuf),

    /// Invalid cleaner configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl CleanError {
    /// Returns `true` if this error only affects the current project.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::MissingSourceDir(_))
    }

    /// Returns `true` if this error is fatal (cleaning should stop).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Remove(e) => Some(&e.path),
            Self::MissingSourceDir(path) | Self::NotADirectory(path) => Some(path),
            Self::Config(e) => e.path(),
            Self::Walk(_) | Self::NonUtf8Path(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_missing_source_is_recoverable() {
        let err = CleanError::MissingSourceDir(Utf8PathBuf::from("pkg/src"));
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
        assert_eq!(err.path().map(Utf8Path::as_str), Some("pkg/src"));
        assert_eq!(err.to_string(), "source directory does not exist: pkg/src");
    }

    #[test]
    fn test_remove_error_is_fatal() {
        let err = CleanError::from(RemoveError::new(
            "dist/a.js",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        ));
        assert!(err.is_fatal());
        assert_eq!(err.path().map(Utf8Path::as_str), Some("dist/a.js"));
        assert!(err.to_string().contains("dist/a.js"));
    }

    #[test]
    fn test_config_error_path() {
        let err = CleanError::from(ConfigError::MissingDirectory(Utf8PathBuf::from("x")));
        assert!(err.is_fatal());
        assert_eq!(err.path().map(Utf8Path::as_str), Some("x"));
    }

    #[test]
    fn test_non_utf8() {
        use std::path::PathBuf;
        let err = CleanError::NonUtf8Path(PathBuf::from("test"));
        assert!(err.is_fatal());
        assert!(err.path().is_none());
    }
}
