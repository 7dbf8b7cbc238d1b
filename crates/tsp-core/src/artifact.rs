//! Artifact sets and the source-existence test.
//!
//! The compiler turns `src/foo.ts` into up to four siblings under the output
//! tree: `foo.js`, `foo.js.map`, `foo.d.ts`, and `foo.d.ts.map`. They share
//! the extension-stripped path `foo`, called the *stem*. An [`ArtifactSet`]
//! names those four files for one stem; [`has_source`] decides whether the
//! stem still has a source file behind it.
//!
//! # Examples
//!
//! ```
//! use tsp_core::{ArtifactSet, ScanMode};
//! use camino::Utf8Path;
//!
//! let stem = ScanMode::Js.strip_marker(Utf8Path::new("dist/lib/foo.js"));
//! assert_eq!(stem.as_deref().map(Utf8Path::as_str), Some("dist/lib/foo"));
//!
//! let set = ArtifactSet::new("dist/lib/foo");
//! let members: Vec<_> = set.members().iter().map(|p| p.to_string()).collect();
//! assert_eq!(
//!     members,
//!     ["dist/lib/foo.js", "dist/lib/foo.js.map", "dist/lib/foo.d.ts", "dist/lib/foo.d.ts.map"]
//! );
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::RemoveError;
use crate::fs::remove_file_if_exists;

/// Suffixes of the compiled files that make up an artifact set.
pub const ARTIFACT_SUFFIXES: [&str; 4] = [".js", ".js.map", ".d.ts", ".d.ts.map"];

/// Suffixes whose presence in the source tree keeps an artifact set alive.
pub const SOURCE_SUFFIXES: [&str; 3] = [".d.ts", ".ts", ".tsx"];

/// Which compiled file marks an artifact group during a batch scan.
///
/// The mode only selects the files the scanner treats as group markers. The
/// orphan test ([`has_source`]) is the same in both modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Groups are found through their `.js` file.
    #[default]
    Js,
    /// Groups are found through their `.d.ts` file (strict declaration mode).
    Declarations,
}

impl ScanMode {
    /// Maps the strict-declarations flag onto a mode.
    #[inline]
    #[must_use]
    pub const fn from_strict(strict_declarations: bool) -> Self {
        if strict_declarations {
            Self::Declarations
        } else {
            Self::Js
        }
    }

    /// Returns the suffix that marks a group in this mode.
    #[inline]
    #[must_use]
    pub const fn marker_suffix(self) -> &'static str {
        match self {
            Self::Js => ".js",
            Self::Declarations => ".d.ts",
        }
    }

    /// Strips the marker suffix from `path`, returning the group stem.
    ///
    /// Returns `None` when the file name does not end in the marker or when
    /// nothing would be left of the file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use tsp_core::ScanMode;
    /// use camino::Utf8Path;
    ///
    /// assert!(ScanMode::Js.strip_marker(Utf8Path::new("a.js.map")).is_none());
    /// assert_eq!(
    ///     ScanMode::Declarations.strip_marker(Utf8Path::new("types/a.d.ts")).unwrap(),
    ///     "types/a"
    /// );
    /// ```
    #[must_use]
    pub fn strip_marker(self, path: &Utf8Path) -> Option<Utf8PathBuf> {
        strip_file_suffix(path, self.marker_suffix())
    }
}

/// Returns the stem of a source file, or `None` if `path` is not one.
///
/// `.ts` and `.tsx` files produce output; `.d.ts` files are inputs only and
/// produce nothing, so they have no stem here.
///
/// # Examples
///
/// ```
/// use tsp_core::source_stem;
/// use camino::Utf8Path;
///
/// assert_eq!(source_stem(Utf8Path::new("app/main.ts")).unwrap(), "app/main");
/// assert_eq!(source_stem(Utf8Path::new("App.tsx")).unwrap(), "App");
/// assert!(source_stem(Utf8Path::new("global.d.ts")).is_none());
/// assert!(source_stem(Utf8Path::new("notes.txt")).is_none());
/// ```
#[must_use]
pub fn source_stem(path: &Utf8Path) -> Option<Utf8PathBuf> {
    if path.file_name()?.ends_with(".d.ts") {
        return None;
    }
    strip_file_suffix(path, ".tsx").or_else(|| strip_file_suffix(path, ".ts"))
}

/// Returns `true` if `candidate` plus any of [`SOURCE_SUFFIXES`] exists.
///
/// `candidate` is an extension-stripped path inside the source tree.
#[must_use]
pub fn has_source(candidate: &Utf8Path) -> bool {
    SOURCE_SUFFIXES
        .iter()
        .any(|suffix| with_suffix(candidate, suffix).exists())
}

/// Appends `suffix` to the final component of `path`.
#[inline]
#[must_use]
pub fn with_suffix(path: &Utf8Path, suffix: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{path}{suffix}"))
}

fn strip_file_suffix(path: &Utf8Path, suffix: &str) -> Option<Utf8PathBuf> {
    let name = path.file_name()?.strip_suffix(suffix)?;
    if name.is_empty() {
        return None;
    }
    Some(path.with_file_name(name))
}

/// The compiled siblings of one stem.
///
/// Members are derived from the stem on demand; none of them need exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactSet {
    stem: Utf8PathBuf,
}

impl ArtifactSet {
    /// Creates the artifact set for `stem`.
    #[inline]
    #[must_use]
    pub fn new(stem: impl Into<Utf8PathBuf>) -> Self {
        Self { stem: stem.into() }
    }

    /// Returns the extension-stripped path shared by all members.
    #[inline]
    #[must_use]
    pub fn stem(&self) -> &Utf8Path {
        &self.stem
    }

    /// Returns every member path, present or not, in [`ARTIFACT_SUFFIXES`] order.
    #[must_use]
    pub fn members(&self) -> SmallVec<[Utf8PathBuf; 4]> {
        ARTIFACT_SUFFIXES
            .iter()
            .map(|suffix| with_suffix(&self.stem, suffix))
            .collect()
    }

    /// Removes every member that exists.
    ///
    /// Absent members are skipped. Returns the paths that were removed.
    ///
    /// # Errors
    ///
    /// Returns [`RemoveError`] for the first member that exists but cannot
    /// be removed. Members before it have already been removed.
    pub fn remove(&self) -> Result<SmallVec<[Utf8PathBuf; 4]>, RemoveError> {
        let mut removed = SmallVec::new();
        for member in self.members() {
            if remove_file_if_exists(&member)? {
                removed.push(member);
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("Invalid path");
        (dir, root)
    }

    #[test]
    fn test_scan_mode_from_strict() {
        assert_eq!(ScanMode::from_strict(false), ScanMode::Js);
        assert_eq!(ScanMode::from_strict(true), ScanMode::Declarations);
    }

    #[test]
    fn test_strip_marker_js() {
        let mode = ScanMode::Js;
        assert_eq!(
            mode.strip_marker(Utf8Path::new("dist/a/b.js")),
            Some(Utf8PathBuf::from("dist/a/b"))
        );
        assert_eq!(
            mode.strip_marker(Utf8Path::new("dist/b.min.js")),
            Some(Utf8PathBuf::from("dist/b.min"))
        );
        assert!(mode.strip_marker(Utf8Path::new("dist/b.js.map")).is_none());
        assert!(mode.strip_marker(Utf8Path::new("dist/b.d.ts")).is_none());
        assert!(mode.strip_marker(Utf8Path::new("dist/data.json")).is_none());
        assert!(mode.strip_marker(Utf8Path::new("dist/.js")).is_none());
    }

    #[test]
    fn test_strip_marker_declarations() {
        let mode = ScanMode::Declarations;
        assert_eq!(
            mode.strip_marker(Utf8Path::new("dist/b.d.ts")),
            Some(Utf8PathBuf::from("dist/b"))
        );
        assert!(mode.strip_marker(Utf8Path::new("dist/b.js")).is_none());
        assert!(mode.strip_marker(Utf8Path::new("dist/b.d.ts.map")).is_none());
    }

    #[test]
    fn test_source_stem() {
        assert_eq!(source_stem(Utf8Path::new("a.ts")), Some(Utf8PathBuf::from("a")));
        assert_eq!(
            source_stem(Utf8Path::new("ui/App.tsx")),
            Some(Utf8PathBuf::from("ui/App"))
        );
        assert!(source_stem(Utf8Path::new("types.d.ts")).is_none());
        assert!(source_stem(Utf8Path::new("bar.txt")).is_none());
        assert!(source_stem(Utf8Path::new("bar.js")).is_none());
        assert!(source_stem(Utf8Path::new(".ts")).is_none());
    }

    #[test]
    fn test_members_order() {
        let set = ArtifactSet::new("out/x");
        let members: Vec<String> = set.members().iter().map(ToString::to_string).collect();
        assert_eq!(
            members,
            vec!["out/x.js", "out/x.js.map", "out/x.d.ts", "out/x.d.ts.map"]
        );
    }

    #[test]
    fn test_has_source_each_suffix() {
        let (_guard, root) = temp_root();
        assert!(!has_source(&root.join("a")));

        for (name, suffix) in [("a", ".ts"), ("b", ".tsx"), ("c", ".d.ts")] {
            fs::write(root.join(format!("{name}{suffix}")), "").expect("write");
            assert!(has_source(&root.join(name)), "{name}{suffix} should count");
        }
    }

    #[test]
    fn test_remove_partial_set() {
        let (_guard, root) = temp_root();
        fs::write(root.join("a.js"), "").expect("write");
        fs::write(root.join("a.d.ts"), "").expect("write");
        fs::write(root.join("a.json"), "{}").expect("write");

        let set = ArtifactSet::new(root.join("a"));

        let removed = set.remove().expect("remove");
        assert_eq!(removed.len(), 2);
        assert!(!root.join("a.js").exists());
        assert!(!root.join("a.d.ts").exists());
        assert!(root.join("a.json").exists());

        // Second removal is a no-op.
        assert!(set.remove().expect("remove").is_empty());
    }
}
