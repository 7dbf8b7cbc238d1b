//! Multi-project traversal.
//!
//! [`clean_projects`] starts at a root project directory and runs a clean
//! for it and for every project reachable through `tsconfig.json`
//! `references`, depth-first in declaration order. Each project is cleaned
//! at most once even when the reference graph has cycles.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info, warn};
use tsp_core::{
    CleanConfig, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR, ExclusionList, FxHashSet,
    ResolvedTsConfig, TSCONFIG_FILE_NAME, fx_hash_set,
};

use crate::Cleaner;
use crate::error::CleanError;
use crate::report::CleanReport;

/// Settings shared by every project in a traversal.
///
/// Explicit directories are relative to each project. When unset, each
/// project's own `rootDir`/`outDir` is used, falling back to `src`/`dist`.
///
/// # Examples
///
/// ```
/// use tsp_cleaner::ProjectCleanOptions;
///
/// let options = ProjectCleanOptions::new()
///     .with_output_dir("build")
///     .with_exclude(["generated"]);
/// assert!(options.source_dir.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectCleanOptions {
    /// Source directory relative to each project.
    pub source_dir: Option<Utf8PathBuf>,
    /// Output directory relative to each project.
    pub output_dir: Option<Utf8PathBuf>,
    /// Relative paths exempt in every project.
    pub exclude: ExclusionList,
    /// Scan for `.d.ts` markers instead of `.js` markers.
    pub strict_declarations: bool,
}

impl ProjectCleanOptions {
    /// Creates options that defer to each project's configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the source directory for every project.
    #[must_use]
    pub fn with_source_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    /// Forces the output directory for every project.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
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

    fn clean_config(
        &self,
        project_dir: &Utf8Path,
        tsconfig: Option<&ResolvedTsConfig>,
    ) -> CleanConfig {
        let source_dir = pick_dir(
            project_dir,
            self.source_dir.as_deref(),
            tsconfig.and_then(|c| c.root_dir.as_deref()),
            DEFAULT_SOURCE_DIR,
        );
        let output_dir = pick_dir(
            project_dir,
            self.output_dir.as_deref(),
            tsconfig.and_then(|c| c.out_dir.as_deref()),
            DEFAULT_OUTPUT_DIR,
        );

        CleanConfig::new(source_dir, output_dir)
            .with_exclusion_list(self.exclude.clone())
            .with_strict_declarations(self.strict_declarations)
    }
}

fn pick_dir(
    project_dir: &Utf8Path,
    explicit: Option<&Utf8Path>,
    configured: Option<&Utf8Path>,
    default: &str,
) -> Utf8PathBuf {
    match (explicit, configured) {
        (Some(dir), _) => project_dir.join(dir),
        (None, Some(dir)) => dir.to_owned(),
        (None, None) => project_dir.join(default),
    }
}

/// Outcome for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReport {
    /// The project's config file.
    pub config_path: Utf8PathBuf,
    /// What the clean removed.
    pub report: CleanReport,
}

/// Outcome of a traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectsReport {
    /// Cleaned projects in visit order.
    pub projects: Vec<ProjectReport>,
    /// Config files of projects whose source directory was missing.
    pub skipped: Vec<Utf8PathBuf>,
}

impl ProjectsReport {
    /// Returns the total number of groups removed across all projects.
    #[must_use]
    pub fn removed_groups(&self) -> usize {
        self.projects.iter().map(|p| p.report.removed_groups()).sum()
    }

    /// Returns the config paths of the cleaned projects in visit order.
    pub fn visited(&self) -> impl Iterator<Item = &Utf8Path> {
        self.projects.iter().map(|p| p.config_path.as_path())
    }
}

/// A reference target: either a project directory or a specific config file.
#[derive(Debug)]
struct ProjectLocation {
    dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ProjectLocation {
    fn from_reference(target: &Utf8Path) -> Self {
        if target.extension() == Some("json") {
            let dir = target
                .parent()
                .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_owned);
            Self {
                dir,
                config_path: target.to_owned(),
            }
        } else {
            Self {
                dir: target.to_owned(),
                config_path: target.join(TSCONFIG_FILE_NAME),
            }
        }
    }

    /// Identity used for cycle detection.
    fn key(&self) -> Utf8PathBuf {
        self.config_path
            .canonicalize_utf8()
            .unwrap_or_else(|_| self.config_path.clone())
    }
}

/// Cleans `root` and every project it references, transitively.
///
/// `root` may be a project directory or a config file path. Projects without
/// a config file end their branch silently. A config that cannot be read
/// still has its project cleaned with defaults, but its references are not
/// followed.
///
/// # Errors
///
/// Returns the first fatal [`CleanError`] from a project's clean. A missing
/// source directory is not fatal: the project is recorded in
/// [`ProjectsReport::skipped`] and traversal continues.
pub fn clean_projects(
    root: &Utf8Path,
    options: &ProjectCleanOptions,
) -> Result<ProjectsReport, CleanError> {
    let mut report = ProjectsReport::default();
    let mut visited: FxHashSet<Utf8PathBuf> = fx_hash_set();
    let mut pending = vec![ProjectLocation::from_reference(root)];

    while let Some(location) = pending.pop() {
        if !location.config_path.is_file() {
            debug!(project = %location.dir, "No project config, skipping");
            continue;
        }
        if !visited.insert(location.key()) {
            debug!(config = %location.config_path, "Project already cleaned");
            continue;
        }

        let tsconfig = match ResolvedTsConfig::resolve(&location.config_path) {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                warn!(config = %location.config_path, error = %e, "Failed to read project config");
                None
            }
        };

        let config = options.clean_config(&location.dir, tsconfig.as_ref());
        info!(project = %location.dir, "Cleaning project");

        match Cleaner::new(config)?.clean() {
            Ok(clean_report) => report.projects.push(ProjectReport {
                config_path: location.config_path.clone(),
                report: clean_report,
            }),
            Err(e) if e.is_recoverable() => {
                warn!(project = %location.dir, error = %e, "Skipping project");
                report.skipped.push(location.config_path.clone());
            }
            Err(e) => return Err(e),
        }

        let Some(tsconfig) = tsconfig else {
            continue;
        };
        // Reversed so the first reference is popped first
        for reference in tsconfig.references.iter().rev() {
            pending.push(ProjectLocation::from_reference(reference));
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::test_support::{temp_root, touch};

    fn write_config(root: &Utf8Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn visited_configs(report: &ProjectsReport, root: &Utf8Path) -> Vec<String> {
        let root = root.canonicalize_utf8().unwrap();
        report
            .visited()
            .map(|p| {
                let path = p.canonicalize_utf8().unwrap();
                path.strip_prefix(&root).unwrap().to_string()
            })
            .collect()
    }

    #[test]
    fn test_follows_references_depth_first() {
        let (_dir, root) = temp_root();
        write_config(
            &root,
            "tsconfig.json",
            r#"{ "references": [{ "path": "./a" }, { "path": "./b" }] }"#,
        );
        write_config(&root, "a/tsconfig.json", r#"{ "references": [{ "path": "../c" }] }"#);
        write_config(&root, "b/tsconfig.json", "{}");
        write_config(&root, "c/tsconfig.json", "{}");
        touch(&root, &["src/x.ts", "a/src/x.ts", "b/src/x.ts", "c/src/x.ts"]);

        let report = clean_projects(&root, &ProjectCleanOptions::new()).unwrap();

        assert_eq!(
            visited_configs(&report, &root),
            vec!["tsconfig.json", "a/tsconfig.json", "c/tsconfig.json", "b/tsconfig.json"]
        );
    }

    #[test]
    fn test_cycles_visit_each_project_once() {
        let (_dir, root) = temp_root();
        write_config(&root, "tsconfig.json", r#"{ "references": [{ "path": "pkg" }] }"#);
        write_config(
            &root,
            "pkg/tsconfig.json",
            r#"{ "references": [{ "path": ".." }, { "path": "../tsconfig.json" }] }"#,
        );
        touch(&root, &["src/x.ts", "pkg/src/x.ts"]);

        let report = clean_projects(&root, &ProjectCleanOptions::new()).unwrap();

        assert_eq!(report.projects.len(), 2);
    }

    #[test]
    fn test_uses_each_projects_own_dirs() {
        let (_dir, root) = temp_root();
        write_config(
            &root,
            "tsconfig.json",
            r#"{
                // trailing commas and comments are accepted
                "compilerOptions": { "rootDir": "lib", "outDir": "out", },
                "references": [{ "path": "./pkg/tsconfig.build.json" }],
            }"#,
        );
        write_config(&root, "pkg/tsconfig.build.json", "{}");
        touch(
            &root,
            &["lib/keep.ts", "out/keep.js", "out/gone.js", "pkg/src/k.ts", "pkg/dist/old.js"],
        );

        let report = clean_projects(&root, &ProjectCleanOptions::new()).unwrap();

        assert_eq!(report.removed_groups(), 2);
        assert!(root.join("out/keep.js").exists());
        assert!(!root.join("out/gone.js").exists());
        assert!(!root.join("pkg/dist/old.js").exists());
    }

    #[test]
    fn test_explicit_dirs_override_config() {
        let (_dir, root) = temp_root();
        write_config(
            &root,
            "tsconfig.json",
            r#"{ "compilerOptions": { "rootDir": "lib", "outDir": "out" } }"#,
        );
        touch(&root, &["src/keep.ts", "build/gone.js", "out/untouched.js"]);

        let options = ProjectCleanOptions::new()
            .with_source_dir("src")
            .with_output_dir("build");
        let report = clean_projects(&root, &options).unwrap();

        assert_eq!(report.removed_groups(), 1);
        assert!(!root.join("build/gone.js").exists());
        assert!(root.join("out/untouched.js").exists());
    }

    #[test]
    fn test_missing_source_dir_skips_project() {
        let (_dir, root) = temp_root();
        write_config(&root, "tsconfig.json", r#"{ "references": [{ "path": "next" }] }"#);
        write_config(&root, "next/tsconfig.json", "{}");
        touch(&root, &["dist/a.js", "next/src/n.ts", "next/dist/gone.js"]);

        let report = clean_projects(&root, &ProjectCleanOptions::new()).unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.projects.len(), 1);
        assert!(root.join("dist/a.js").exists());
        assert!(!root.join("next/dist/gone.js").exists());
    }

    #[test]
    fn test_unreadable_config_stops_branch() {
        let (_dir, root) = temp_root();
        write_config(&root, "tsconfig.json", "{ not json");
        touch(&root, &["src/keep.ts", "dist/gone.js"]);

        let report = clean_projects(&root, &ProjectCleanOptions::new()).unwrap();

        assert_eq!(report.projects.len(), 1);
        assert!(!root.join("dist/gone.js").exists());
    }

    #[test]
    fn test_missing_root_config_does_nothing() {
        let (_dir, root) = temp_root();
        touch(&root, &["src/keep.ts", "dist/gone.js"]);

        let report = clean_projects(&root, &ProjectCleanOptions::new()).unwrap();

        assert!(report.projects.is_empty());
        assert!(root.join("dist/gone.js").exists());
    }
}
