//! Deletion events.
//!
//! The watcher only cares about paths that disappeared from the source tree.
//! This module turns raw `notify` events into [`DeleteEvent`]s.
//!
//! # Event Flow
//!
//! ```text
//! File System Change
//!        │
//!        ▼
//! notify::Event (Remove / rename-away)
//!        │
//!        ▼
//!   removed_paths() ──► DeleteEvent (relative to the source root)
//!        │
//!        ▼
//!   Sent via channel to the pruner
//! ```
//!
//! Renames count as deletions of the old name: a source moved to another
//! name leaves its old artifacts orphaned, and the new name is picked up by
//! the compiler's own watch.

use std::path::Path;

use camino::Utf8PathBuf;
use notify::event::{ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tsp_core::source_stem;

/// What kind of entry disappeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovedKind {
    /// A file.
    File,
    /// A directory.
    Dir,
    /// The platform did not say; the pruner infers it.
    Unknown,
}

/// A path that disappeared from the source tree.
///
/// # Examples
///
/// ```
/// use tsp_watcher::{DeleteEvent, RemovedKind};
/// use camino::Utf8PathBuf;
///
/// let event = DeleteEvent::new(Utf8PathBuf::from("lib/b.ts"), RemovedKind::File);
/// assert!(event.is_source_file());
/// assert_eq!(event.path.as_str(), "lib/b.ts");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeleteEvent {
    /// Path relative to the watched source directory.
    pub path: Utf8PathBuf,

    /// Whether a file or a directory was removed.
    pub kind: RemovedKind,
}

impl DeleteEvent {
    /// Creates a new event.
    #[inline]
    #[must_use]
    pub const fn new(path: Utf8PathBuf, kind: RemovedKind) -> Self {
        Self { path, kind }
    }

    /// Returns `true` if the path names a `.ts`/`.tsx` source (not `.d.ts`).
    #[inline]
    #[must_use]
    pub fn is_source_file(&self) -> bool {
        source_stem(&self.path).is_some()
    }
}

/// Returns the paths a raw notify event reports as gone.
///
/// - `Remove(File)`/`Remove(Folder)` carry their kind.
/// - `Remove(Any | Other)` is [`RemovedKind::Unknown`].
/// - `Modify(Name(From))` and the first path of `Modify(Name(Both))` are the
///   old side of a rename.
/// - `Modify(Name(Any | Other))` does not say which side it is, so only
///   paths that no longer exist count.
///
/// Everything else (creations, content edits, access) yields nothing.
#[must_use]
pub fn removed_paths(event: &Event) -> SmallVec<[(RemovedKind, &Path); 2]> {
    let mut removed = SmallVec::new();
    match event.kind {
        EventKind::Remove(kind) => {
            let kind = match kind {
                RemoveKind::File => RemovedKind::File,
                RemoveKind::Folder => RemovedKind::Dir,
                RemoveKind::Any | RemoveKind::Other => RemovedKind::Unknown,
            };
            removed.extend(event.paths.iter().map(|p| (kind, p.as_path())));
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            removed.extend(
                event
                    .paths
                    .iter()
                    .map(|p| (RemovedKind::Unknown, p.as_path())),
            );
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            if let Some(from) = event.paths.first() {
                removed.push((RemovedKind::Unknown, from.as_path()));
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Any | RenameMode::Other)) => {
            removed.extend(
                event
                    .paths
                    .iter()
                    .filter(|p| p.symlink_metadata().is_err())
                    .map(|p| (RemovedKind::Unknown, p.as_path())),
            );
        }
        _ => {}
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange};
    use std::path::PathBuf;

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |e, p| e.add_path(PathBuf::from(p)))
    }

    #[test]
    fn test_remove_kinds() {
        let file = event(EventKind::Remove(RemoveKind::File), &["/s/a.ts"]);
        let dir = event(EventKind::Remove(RemoveKind::Folder), &["/s/lib"]);
        let any = event(EventKind::Remove(RemoveKind::Any), &["/s/x"]);

        assert_eq!(
            removed_paths(&file).as_slice(),
            &[(RemovedKind::File, Path::new("/s/a.ts"))]
        );
        assert_eq!(removed_paths(&dir)[0].0, RemovedKind::Dir);
        assert_eq!(removed_paths(&any)[0].0, RemovedKind::Unknown);
    }

    #[test]
    fn test_rename_from_and_both() {
        let from = event(EventKind::Modify(ModifyKind::Name(RenameMode::From)), &["/s/old.ts"]);
        let both = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/s/old.ts", "/s/new.ts"],
        );

        assert_eq!(
            removed_paths(&from).as_slice(),
            &[(RemovedKind::Unknown, Path::new("/s/old.ts"))]
        );
        assert_eq!(
            removed_paths(&both).as_slice(),
            &[(RemovedKind::Unknown, Path::new("/s/old.ts"))]
        );
    }

    #[test]
    fn test_generic_rename_keeps_only_missing_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let present = dir.path().join("present.ts");
        std::fs::write(&present, "").unwrap();
        let missing = dir.path().join("missing.ts");

        let rename = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Any)))
            .add_path(present)
            .add_path(missing.clone());

        assert_eq!(
            removed_paths(&rename).as_slice(),
            &[(RemovedKind::Unknown, missing.as_path())]
        );
    }

    #[test]
    fn test_non_removals_are_ignored() {
        let create = event(EventKind::Create(CreateKind::File), &["/s/a.ts"]);
        let write = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/s/a.ts"],
        );
        let rename_to = event(EventKind::Modify(ModifyKind::Name(RenameMode::To)), &["/s/b.ts"]);

        assert!(removed_paths(&create).is_empty());
        assert!(removed_paths(&write).is_empty());
        assert!(removed_paths(&rename_to).is_empty());
    }

    #[test]
    fn test_is_source_file() {
        let ts = DeleteEvent::new(Utf8PathBuf::from("a.ts"), RemovedKind::File);
        let tsx = DeleteEvent::new(Utf8PathBuf::from("A.tsx"), RemovedKind::Unknown);
        let dts = DeleteEvent::new(Utf8PathBuf::from("g.d.ts"), RemovedKind::File);
        let dir = DeleteEvent::new(Utf8PathBuf::from("lib"), RemovedKind::Dir);

        assert!(ts.is_source_file());
        assert!(tsx.is_source_file());
        assert!(!dts.is_source_file());
        assert!(!dir.is_source_file());
    }
}
