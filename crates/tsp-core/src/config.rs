//! Configuration structures for tsprune.
//!
//! This module provides configuration types for both components:
//!
//! - [`CleanConfig`] - Batch cleaner settings (directories, exclusions, scan mode)
//! - [`WatchConfig`] - Incremental watcher settings (directory removal, channel size)
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] with the compiler's
//! conventional `src`/`dist` layout.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::artifact::ScanMode;
use crate::error::ConfigError;
use crate::exclude::ExclusionList;

/// Default source directory when neither the user nor `tsconfig.json` names one.
pub const DEFAULT_SOURCE_DIR: &str = "src";

/// Default output directory when neither the user nor `tsconfig.json` names one.
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Configuration for a batch clean of one source/output pair.
///
/// # Examples
///
/// ```
/// use tsp_core::{CleanConfig, ScanMode};
///
/// let config = CleanConfig::new("src", "dist")
///     .with_exclude(["vendor"])
///     .with_strict_declarations(true);
/// assert_eq!(config.scan_mode(), ScanMode::Declarations);
/// assert_eq!(config.exclude.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Root of the source tree (`.ts`/`.tsx`/`.d.ts` files).
    pub source_dir: Utf8PathBuf,

    /// Root of the output tree the compiler writes into.
    pub output_dir: Utf8PathBuf,

    /// Relative paths that are never deleted.
    pub exclude: ExclusionList,

    /// Scan for `.d.ts` markers instead of `.js` markers.
    pub strict_declarations: bool,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            source_dir: Utf8PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: Utf8PathBuf::from(DEFAULT_OUTPUT_DIR),
            exclude: ExclusionList::new(),
            strict_declarations: false,
        }
    }
}

impl CleanConfig {
    /// Creates a configuration for the given source and output directories.
    #[must_use]
    pub fn new(source_dir: impl Into<Utf8PathBuf>, output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Adds exclusion entries.
    #[must_use]
    pub fn with_exclude<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for entry in entries {
            self.exclude.insert(entry);
        }
        self
    }

    /// Replaces the exclusion list.
    #[must_use]
    pub fn with_exclusion_list(mut self, exclude: ExclusionList) -> Self {
        self.exclude = exclude;
        self
    }

    /// Enables or disables strict declaration mode.
    #[must_use]
    pub const fn with_strict_declarations(mut self, strict: bool) -> Self {
        self.strict_declarations = strict;
        self
    }

    /// Returns the scan mode selected by [`strict_declarations`](Self::strict_declarations).
    #[inline]
    #[must_use]
    pub const fn scan_mode(&self) -> ScanMode {
        ScanMode::from_strict(self.strict_declarations)
    }

    /// Returns a copy with relative directories joined onto `base`.
    ///
    /// Absolute directories are kept as they are.
    #[must_use]
    pub fn resolved_against(&self, base: &Utf8Path) -> Self {
        Self {
            source_dir: base.join(&self.source_dir),
            output_dir: base.join(&self.output_dir),
            ..self.clone()
        }
    }

    /// Checks that both directories are named.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] if either directory is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.source_dir, &self.output_dir] {
            if path.as_str().trim().is_empty() {
                return Err(ConfigError::InvalidPath {
                    path: path.clone(),
                    reason: "directory path is empty".to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Configuration for the incremental watcher.
///
/// # Examples
///
/// ```
/// use tsp_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert!(config.remove_empty_dirs);
/// assert!(config.recursive);
/// assert_eq!(config.channel_capacity, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Remove the mirrored output directory when a source directory is deleted.
    pub remove_empty_dirs: bool,

    /// Whether to watch subdirectories recursively.
    pub recursive: bool,

    /// Capacity of the channel between the notify thread and the consumer.
    pub channel_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            remove_empty_dirs: true,
            recursive: true,
            channel_capacity: 100,
        }
    }
}

impl WatchConfig {
    /// Enables or disables output directory removal.
    #[must_use]
    pub const fn with_remove_empty_dirs(mut self, remove: bool) -> Self {
        self.remove_empty_dirs = remove;
        self
    }

    /// Checks option values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the channel capacity is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::invalid_option(
                "channel_capacity",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Root configuration for tsprune.
///
/// # Examples
///
/// ```
/// use tsp_core::Config;
///
/// let config = Config::default();
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("\"output_dir\": \"dist\""));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Batch cleaner configuration.
    pub clean: CleanConfig,

    /// Incremental watcher configuration.
    pub watch: WatchConfig,
}

impl Config {
    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.clean.validate()?;
        self.watch.validate()
    }
}
