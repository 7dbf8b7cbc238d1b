//! Clean results.
//!
//! [`CleanReport`] records what a single clean removed, and
//! [`ProjectsReport`](crate::ProjectsReport) collects one per project.
//! Logging stays the primary channel; reports exist so callers and tests
//! can inspect the outcome without scraping log output.

use camino::Utf8PathBuf;
use serde::Serialize;

/// One orphaned group and the files that were actually removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedGroup {
    /// Group stem relative to the output directory.
    pub stem: Utf8PathBuf,
    /// Files removed, joined onto the output directory.
    pub files: Vec<Utf8PathBuf>,
}

/// Outcome of cleaning one output directory.
///
/// # Examples
///
/// ```
/// use tsp_cleaner::CleanReport;
///
/// let report = CleanReport::new("dist");
/// assert!(report.is_empty());
/// assert_eq!(report.removed_files(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    /// The output directory that was cleaned.
    pub output_dir: Utf8PathBuf,
    /// Number of distinct groups found in the output tree.
    pub inspected: usize,
    /// Number of groups skipped because they are excluded.
    pub excluded: usize,
    /// Groups that were orphaned and removed, in walk order.
    pub removed: Vec<RemovedGroup>,
}

impl CleanReport {
    /// Creates an empty report for `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if nothing was removed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }

    /// Returns the number of groups removed.
    #[inline]
    #[must_use]
    pub fn removed_groups(&self) -> usize {
        self.removed.len()
    }

    /// Returns the number of files removed across all groups.
    #[must_use]
    pub fn removed_files(&self) -> usize {
        self.removed.iter().map(|g| g.files.len()).sum()
    }

    pub(crate) fn push(&mut self, group: RemovedGroup) {
        self.removed.push(group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CleanReport {
        let mut report = CleanReport::new("dist");
        report.inspected = 3;
        report.push(RemovedGroup {
            stem: Utf8PathBuf::from("b"),
            files: vec![Utf8PathBuf::from("dist/b.js"), Utf8PathBuf::from("dist/b.js.map")],
        });
        report
    }

    #[test]
    fn test_counts() {
        let report = sample();
        assert!(!report.is_empty());
        assert_eq!(report.removed_groups(), 1);
        assert_eq!(report.removed_files(), 2);
        assert_eq!(report.removed[0].stem, "b");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string_pretty(&sample()).unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "output_dir": "dist",
          "inspected": 3,
          "excluded": 0,
          "removed": [
            {
              "stem": "b",
              "files": [
                "dist/b.js",
                "dist/b.js.map"
              ]
            }
          ]
        }
        "#);
    }
}
