//! Applies delete events to the output tree.
//!
//! [`Pruner`] is the consumer side of the watcher. It handles one event at
//! a time; running two prunes concurrently could race on the same group.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use smallvec::SmallVec;
use tracing::debug;
use tsp_core::{
    ArtifactSet, CleanConfig, ExclusionList, RemoveError, WatchConfig, has_source,
    remove_dir_all_if_exists, source_stem,
};

use crate::events::{DeleteEvent, RemovedKind};

/// What a single event did to the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneOutcome {
    /// The group for a deleted source was removed.
    RemovedGroup {
        /// Group stem relative to the output directory.
        stem: Utf8PathBuf,
        /// Files that existed and were deleted.
        files: SmallVec<[Utf8PathBuf; 4]>,
    },
    /// A mirrored output directory was removed.
    RemovedDir(Utf8PathBuf),
    /// Another source for the same stem still exists (`a.ts` gone, `a.tsx` kept).
    SourceRemains(Utf8PathBuf),
    /// The path or its group is excluded.
    Excluded,
    /// Nothing applied: not a source file, nothing on disk, or directory
    /// removal is disabled.
    Ignored,
}

/// Removes output artifacts in response to source deletions.
///
/// # Examples
///
/// ```no_run
/// use tsp_watcher::{DeleteEvent, Pruner, RemovedKind};
/// use tsp_core::{CleanConfig, WatchConfig};
/// use camino::Utf8PathBuf;
///
/// let pruner = Pruner::new(&CleanConfig::default(), &WatchConfig::default());
/// let event = DeleteEvent::new(Utf8PathBuf::from("b.ts"), RemovedKind::File);
/// let outcome = pruner.apply(&event)?;
/// println!("{outcome:?}");
/// # Ok::<(), tsp_core::RemoveError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Pruner {
    source_dir: Utf8PathBuf,
    output_dir: Utf8PathBuf,
    exclude: ExclusionList,
    remove_dirs: bool,
}

impl Pruner {
    /// Creates a pruner for the directories in `clean`.
    ///
    /// The scan mode in `clean` does not apply: a deleted source always
    /// takes its whole group with it.
    #[must_use]
    pub fn new(clean: &CleanConfig, watch: &WatchConfig) -> Self {
        Self {
            source_dir: clean.source_dir.clone(),
            output_dir: clean.output_dir.clone(),
            exclude: clean.exclude.clone(),
            remove_dirs: watch.remove_empty_dirs,
        }
    }

    /// Returns the output directory being pruned.
    #[inline]
    #[must_use]
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    /// Applies one event.
    ///
    /// # Errors
    ///
    /// Returns [`RemoveError`] if an existing artifact or directory cannot be
    /// deleted. Absent targets are not errors.
    pub fn apply(&self, event: &DeleteEvent) -> Result<PruneOutcome, RemoveError> {
        let rel = event.path.as_path();
        if rel.as_str().is_empty() {
            return Ok(PruneOutcome::Ignored);
        }
        if self.exclude.is_excluded(rel) {
            debug!(path = %rel, "Skipping excluded path");
            return Ok(PruneOutcome::Excluded);
        }

        match event.kind {
            RemovedKind::File => self.prune_file(rel),
            RemovedKind::Dir => self.prune_dir(rel),
            RemovedKind::Unknown if event.is_source_file() => self.prune_file(rel),
            RemovedKind::Unknown if self.output_dir.join(rel).is_dir() => self.prune_dir(rel),
            RemovedKind::Unknown => Ok(PruneOutcome::Ignored),
        }
    }

    fn prune_file(&self, rel: &Utf8Path) -> Result<PruneOutcome, RemoveError> {
        let Some(stem) = source_stem(rel) else {
            return Ok(PruneOutcome::Ignored);
        };
        if self.exclude.is_group_excluded(&stem) {
            debug!(path = %stem, "Skipping excluded group");
            return Ok(PruneOutcome::Excluded);
        }
        if has_source(&self.source_dir.join(&stem)) {
            debug!(path = %stem, "Another source remains, keeping output");
            return Ok(PruneOutcome::SourceRemains(stem));
        }

        let files = ArtifactSet::new(self.output_dir.join(&stem)).remove()?;
        if files.is_empty() {
            return Ok(PruneOutcome::Ignored);
        }

        debug!(path = %stem, files = files.len(), "Removed \"{stem}\" from output");
        Ok(PruneOutcome::RemovedGroup { stem, files })
    }

    fn prune_dir(&self, rel: &Utf8Path) -> Result<PruneOutcome, RemoveError> {
        if !self.remove_dirs {
            return Ok(PruneOutcome::Ignored);
        }

        let target = self.output_dir.join(rel);
        if !remove_dir_all_if_exists(&target)? {
            return Ok(PruneOutcome::Ignored);
        }

        debug!(path = %rel, "Removed directory \"{rel}\" from output");
        Ok(PruneOutcome::RemovedDir(target))
    }
}

/// Running totals for a watch session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneStats {
    /// Delete events received.
    pub events: usize,
    /// Artifact groups removed.
    pub groups_removed: usize,
    /// Individual files removed.
    pub files_removed: usize,
    /// Output directories removed.
    pub dirs_removed: usize,
    /// Removals that failed.
    pub failures: usize,
}

impl PruneStats {
    /// Records the result of one [`Pruner::apply`] call.
    pub fn record(&mut self, result: &Result<PruneOutcome, RemoveError>) {
        self.events += 1;
        match result {
            Ok(PruneOutcome::RemovedGroup { files, .. }) => {
                self.groups_removed += 1;
                self.files_removed += files.len();
            }
            Ok(PruneOutcome::RemovedDir(_)) => self.dirs_removed += 1,
            Ok(_) => {}
            Err(_) => self.failures += 1,
        }
    }
}
