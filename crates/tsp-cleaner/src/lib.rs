//! Batch removal of orphaned compiler output.
//!
//! This crate walks a compiler output directory, finds artifact groups whose
//! source file no longer exists, and deletes them. It also follows
//! `tsconfig.json` project references so a whole tree of projects can be
//! cleaned in one call.
//!
//! # Overview
//!
//! The main entry point is [`Cleaner`], which combines:
//!
//! - [`OutputWalker`]: Output tree traversal with exclusion pruning
//! - [`ArtifactSet`](tsp_core::ArtifactSet): The files one source compiles to
//! - [`CleanReport`]: What was removed
//!
//! [`clean_projects`] runs a [`Cleaner`] per project, depth-first through
//! `references`.
//!
//! # Example
//!
//! ```no_run
//! use tsp_cleaner::Cleaner;
//! use tsp_core::CleanConfig;
//!
//! let config = CleanConfig::new("src", "dist").with_exclude(["vendor"]);
//! let report = Cleaner::new(config)?.clean()?;
//! println!("Removed {} groups", report.removed_groups());
//! # Ok::<(), tsp_cleaner::CleanError>(())
//! ```
//!
//! # Orphan rule
//!
//! A group `dist/<rel>` is orphaned iff none of `src/<rel>.d.ts`,
//! `src/<rel>.ts`, `src/<rel>.tsx` exists. The rule is the same in both scan
//! modes; the mode only picks which marker file (`.js` or `.d.ts`) makes a
//! group visible.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod projects;
mod report;
mod walker;

pub use error::CleanError;
pub use projects::{ProjectCleanOptions, ProjectReport, ProjectsReport, clean_projects};
pub use report::{CleanReport, RemovedGroup};
pub use walker::OutputWalker;

use camino::Utf8Path;
use tracing::{debug, info};
use tsp_core::{ArtifactSet, CleanConfig, has_source};

/// Removes orphaned artifact groups from one output directory.
///
/// # Examples
///
/// ```no_run
/// use tsp_cleaner::Cleaner;
/// use tsp_core::CleanConfig;
///
/// let cleaner = Cleaner::new(CleanConfig::default())?;
/// let first = cleaner.clean()?;
/// let second = cleaner.clean()?;
/// assert!(second.is_empty());
/// # let _ = first;
/// # Ok::<(), tsp_cleaner::CleanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Cleaner {
    config: CleanConfig,
}

impl Cleaner {
    /// Creates a cleaner for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CleanError::Config`] if the configuration is invalid.
    pub fn new(config: CleanConfig) -> Result<Self, CleanError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Runs one clean pass.
    ///
    /// The output tree is walked first; deletion happens afterwards, group by
    /// group, so the walk never sees its own removals.
    ///
    /// # Errors
    ///
    /// - [`CleanError::MissingSourceDir`] if the source directory is absent
    /// - [`CleanError::NotADirectory`] if the output path is a file
    /// - [`CleanError::Walk`] if the output tree cannot be read
    /// - [`CleanError::Remove`] if an existing artifact cannot be deleted
    pub fn clean(&self) -> Result<CleanReport, CleanError> {
        let source_dir = &self.config.source_dir;
        let output_dir = &self.config.output_dir;
        let mode = self.config.scan_mode();

        if !source_dir.is_dir() {
            return Err(CleanError::MissingSourceDir(source_dir.clone()));
        }
        if !output_dir.exists() {
            debug!(output = %output_dir, "Output directory does not exist, nothing to clean");
            return Ok(CleanReport::new(output_dir.clone()));
        }

        debug!(source = %source_dir, output = %output_dir, ?mode, "Starting clean");

        let stems = OutputWalker::new(output_dir, mode)?
            .with_exclude(self.config.exclude.clone())
            .collect_stems()?;

        let mut report = CleanReport::new(output_dir.clone());
        report.inspected = stems.len();

        for stem in stems {
            if self.config.exclude.is_group_excluded(&stem) {
                report.excluded += 1;
                continue;
            }
            if let Some(group) = self.remove_if_orphaned(&stem)? {
                report.push(group);
            }
        }

        info!(
            output = %output_dir,
            removed = report.removed_groups(),
            files = report.removed_files(),
            "Cleaned \"{output_dir}\""
        );
        Ok(report)
    }

    fn remove_if_orphaned(&self, stem: &Utf8Path) -> Result<Option<RemovedGroup>, CleanError> {
        if has_source(&self.config.source_dir.join(stem)) {
            return Ok(None);
        }

        let files = ArtifactSet::new(self.config.output_dir.join(stem)).remove()?;
        if files.is_empty() {
            return Ok(None);
        }

        debug!(path = %stem, files = files.len(), "Removed \"{stem}\" from output");
        Ok(Some(RemovedGroup {
            stem: stem.to_owned(),
            files: files.into_vec(),
        }))
    }
}

/// Runs one clean pass with `config`.
///
/// Shorthand for `Cleaner::new(config.clone())?.clean()`.
///
/// # Errors
///
/// See [`Cleaner::clean`].
pub fn clean(config: &CleanConfig) -> Result<CleanReport, CleanError> {
    Cleaner::new(config.clone())?.clean()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;

    use camino::{Utf8Path, Utf8PathBuf};
    use tempfile::TempDir;

    pub fn temp_root() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    pub fn touch(root: &Utf8Path, files: &[&str]) {
        for file in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }
    }
}
