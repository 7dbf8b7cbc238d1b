//! The exclusion list.
//!
//! Users name relative paths that must never be deleted. An entry covers the
//! path itself and, when it names a directory, everything underneath it.
//! Entries and lookups are normalized the same way so that `./lib/`,
//! `lib`, and `lib\` all mean the same thing.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::artifact::{ARTIFACT_SUFFIXES, with_suffix};
use crate::hash::{FxHashSet, fx_hash_set};

/// A set of relative paths exempt from cleanup.
///
/// # Examples
///
/// ```
/// use tsp_core::ExclusionList;
/// use camino::Utf8Path;
///
/// let exclude = ExclusionList::from_entries(["./vendor/", "legacy.js"]);
/// assert!(exclude.is_excluded(Utf8Path::new("vendor/lib/a.js")));
/// assert!(exclude.is_excluded(Utf8Path::new("legacy.js")));
/// assert!(!exclude.is_excluded(Utf8Path::new("legacy.d.ts")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ExclusionList {
    entries: FxHashSet<String>,
}

impl ExclusionList {
    /// Creates an empty exclusion list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: fx_hash_set(),
        }
    }

    /// Creates an exclusion list from raw entries.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for entry in entries {
            list.insert(entry);
        }
        list
    }

    /// Adds an entry, returning `true` if it was not already present.
    ///
    /// Entries that normalize to nothing (`""`, `"."`, `"./"`) are ignored:
    /// they would exclude the whole tree.
    pub fn insert(&mut self, entry: impl AsRef<str>) -> bool {
        let normalized = normalize(entry.as_ref());
        if normalized.is_empty() {
            return false;
        }
        self.entries.insert(normalized)
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `rel` itself is listed.
    #[must_use]
    pub fn contains(&self, rel: &Utf8Path) -> bool {
        self.entries.contains(&normalize(rel.as_str()))
    }

    /// Returns `true` if `rel` or any of its ancestor directories is listed.
    #[must_use]
    pub fn is_excluded(&self, rel: &Utf8Path) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let normalized = normalize(rel.as_str());
        Utf8Path::new(&normalized)
            .ancestors()
            .filter(|p| !p.as_str().is_empty())
            .any(|p| self.entries.contains(p.as_str()))
    }

    /// Returns `true` if the artifact group at `stem` is exempt.
    ///
    /// A group is exempt when its stem or any of its member paths is
    /// excluded, so listing `legacy.js` protects `legacy.d.ts` as well.
    #[must_use]
    pub fn is_group_excluded(&self, stem: &Utf8Path) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        self.is_excluded(stem)
            || ARTIFACT_SUFFIXES
                .iter()
                .any(|suffix| self.is_excluded(&with_suffix(stem, suffix)))
    }

    /// Returns the entries in sorted order.
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut entries: Vec<String> = self.entries.iter().cloned().collect();
        entries.sort();
        entries
    }
}

impl From<Vec<String>> for ExclusionList {
    fn from(entries: Vec<String>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<ExclusionList> for Vec<String> {
    fn from(list: ExclusionList) -> Self {
        list.to_sorted_vec()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExclusionList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::from_entries(iter)
    }
}

/// Normalizes a relative path for comparison.
fn normalize(raw: &str) -> String {
    let mut path = raw.trim().replace('\\', "/");
    while let Some(rest) = path.strip_prefix("./") {
        path = rest.to_owned();
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed == "." {
        return String::new();
    }
    trimmed.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("./lib/"), "lib");
        assert_eq!(normalize("lib\\sub\\"), "lib/sub");
        assert_eq!(normalize("././a.js"), "a.js");
        assert_eq!(normalize("."), "");
        assert_eq!(normalize("./"), "");
        assert_eq!(normalize("  spaced.js "), "spaced.js");
    }

    #[test]
    fn test_empty_entries_ignored() {
        let mut list = ExclusionList::new();
        assert!(!list.insert(""));
        assert!(!list.insert("./"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_insert_deduplicates() {
        let mut list = ExclusionList::new();
        assert!(list.insert("lib"));
        assert!(!list.insert("./lib/"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_contains_exact_only() {
        let list = ExclusionList::from_entries(["lib"]);
        assert!(list.contains(Utf8Path::new("lib")));
        assert!(list.contains(Utf8Path::new("./lib/")));
        assert!(!list.contains(Utf8Path::new("lib/a.js")));
    }

    #[test]
    fn test_is_excluded_ancestors() {
        let list = ExclusionList::from_entries(["generated", "keep/me.js"]);
        assert!(list.is_excluded(Utf8Path::new("generated")));
        assert!(list.is_excluded(Utf8Path::new("generated/deep/x.js")));
        assert!(list.is_excluded(Utf8Path::new("keep/me.js")));
        assert!(!list.is_excluded(Utf8Path::new("keep/other.js")));
        assert!(!list.is_excluded(Utf8Path::new("generatedx/a.js")));
    }

    #[test]
    fn test_is_group_excluded() {
        let list = ExclusionList::from_entries(["legacy.js", "vendor"]);
        assert!(list.is_group_excluded(Utf8Path::new("legacy")));
        assert!(list.is_group_excluded(Utf8Path::new("vendor/x")));
        assert!(!list.is_group_excluded(Utf8Path::new("current")));
    }

    #[test]
    fn test_empty_list_excludes_nothing() {
        let list = ExclusionList::default();
        assert!(!list.is_excluded(Utf8Path::new("anything")));
    }

    #[test]
    fn test_serde_round_trip_is_sorted() {
        let list = ExclusionList::from_entries(["b", "a"]);
        let json = serde_json::to_string(&list).expect("serialize");
        assert_eq!(json, r#"["a","b"]"#);

        let parsed: ExclusionList = serde_json::from_str(r#"["./a/", "b"]"#).expect("parse");
        assert_eq!(parsed, list);
    }
}
