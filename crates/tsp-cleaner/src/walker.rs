//! Output tree traversal.
//!
//! This module provides [`OutputWalker`], which uses the `ignore` crate to
//! walk a compiler output directory and collect the stems of every artifact
//! group it finds.
//!
//! Unlike a source walk, nothing is hidden from it: `.gitignore` files are
//! irrelevant to what the compiler emitted, and `dist/` is almost always
//! ignored anyway. Only the exclusion list prunes the walk.
//!
//! # Examples
//!
//! ```no_run
//! use tsp_cleaner::OutputWalker;
//! use tsp_core::ScanMode;
//! use camino::Utf8Path;
//!
//! let walker = OutputWalker::new(Utf8Path::new("./dist"), ScanMode::Js)?;
//! for stem in walker.collect_stems()? {
//!     println!("Found group: {stem}");
//! }
//! # Ok::<(), tsp_cleaner::CleanError>(())
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use ignore::{DirEntry, WalkBuilder};
use tsp_core::{ExclusionList, FxHashSet, ScanMode, fx_hash_set};

use crate::error::CleanError;

/// Walks an output directory and yields artifact group stems.
///
/// # Design
///
/// The walker uses a "collect-then-delete" pattern:
/// 1. The walk collects every marker file's stem (single-threaded, I/O bound)
/// 2. The caller decides which groups are orphaned and removes them
///
/// Deleting while the walk is still iterating a directory would race with
/// the walker's own `readdir` handles.
#[derive(Debug, Clone)]
pub struct OutputWalker {
    /// The output directory to walk.
    root: Utf8PathBuf,
    /// Which marker file identifies a group.
    mode: ScanMode,
    /// Relative paths that are not visited.
    exclude: ExclusionList,
}

impl OutputWalker {
    /// Creates a walker for the given output directory.
    ///
    /// # Errors
    ///
    /// Returns [`CleanError::NotADirectory`] if `root` exists but is not a
    /// directory, or [`CleanError::Config`] if it does not exist.
    pub fn new(root: &Utf8Path, mode: ScanMode) -> Result<Self, CleanError> {
        if !root.exists() {
            return Err(tsp_core::ConfigError::MissingDirectory(root.to_owned()).into());
        }
        if !root.is_dir() {
            return Err(CleanError::NotADirectory(root.to_owned()));
        }

        Ok(Self {
            root: root.to_owned(),
            mode,
            exclude: ExclusionList::new(),
        })
    }

    /// Sets the exclusion list. Excluded directories are not descended into.
    #[must_use]
    pub fn with_exclude(mut self, exclude: ExclusionList) -> Self {
        self.exclude = exclude;
        self
    }

    /// Collects the stem of every marker file, relative to the root.
    ///
    /// Stems are returned in walk order (sorted by file name within each
    /// directory) with duplicates removed.
    ///
    /// # Errors
    ///
    /// Returns [`CleanError::Walk`] if directory traversal fails.
    /// Returns [`CleanError::NonUtf8Path`] if a non-UTF-8 path is encountered.
    pub fn collect_stems(&self) -> Result<Vec<Utf8PathBuf>, CleanError> {
        let mut stems = Vec::new();
        let mut seen: FxHashSet<Utf8PathBuf> = fx_hash_set();

        for result in self.build_walker() {
            let entry = result?;
            if entry.depth() == 0 {
                continue;
            }

            // Directories are recursed into by the walker itself
            if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                continue;
            }

            let path = entry.path();
            let utf8_path =
                Utf8Path::from_path(path).ok_or_else(|| CleanError::NonUtf8Path(path.to_owned()))?;
            let Ok(rel) = utf8_path.strip_prefix(&self.root) else {
                continue;
            };

            let Some(stem) = self.mode.strip_marker(rel) else {
                continue;
            };
            if seen.insert(stem.clone()) {
                stems.push(stem);
            }
        }

        Ok(stems)
    }

    /// Builds the ignore walker with configured settings.
    fn build_walker(&self) -> ignore::Walk {
        let root = self.root.clone();
        let exclude = self.exclude.clone();

        WalkBuilder::new(&self.root)
            // Output trees are usually gitignored; look at everything
            .standard_filters(false)
            .hidden(false)
            // Symlinked directories are not descended into
            .follow_links(false)
            .threads(1)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| !is_excluded_entry(&root, &exclude, entry))
            .build()
    }
}

/// Checks an entry against the exclusion list, relative to `root`.
fn is_excluded_entry(root: &Utf8Path, exclude: &ExclusionList, entry: &DirEntry) -> bool {
    if exclude.is_empty() || entry.depth() == 0 {
        return false;
    }
    Utf8Path::from_path(entry.path())
        .and_then(|path| path.strip_prefix(root).ok())
        .is_some_and(|rel| exclude.is_excluded(rel))
}
