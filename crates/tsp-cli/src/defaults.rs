//! Default source and output directories.
//!
//! Explicit flags win. Otherwise the directories come from the project's
//! `tsconfig.json` (`rootDir`/`outDir`), and failing that `src`/`dist`.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};
use tsp_core::{DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR, ResolvedTsConfig, TSCONFIG_FILE_NAME};

/// Resolved source and output directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDirs {
    /// Where the `.ts` sources live.
    pub source_dir: Utf8PathBuf,
    /// Where the compiler writes.
    pub output_dir: Utf8PathBuf,
}

/// Returns the config file the compiler will use.
///
/// `project` is the forwarded `-p/--project` value, which may name a
/// directory or a file.
pub fn project_config_path(cwd: &Utf8Path, project: Option<&str>) -> Utf8PathBuf {
    match project {
        Some(project) => {
            let path = cwd.join(project);
            if path.is_dir() {
                path.join(TSCONFIG_FILE_NAME)
            } else {
                path
            }
        }
        None => cwd.join(TSCONFIG_FILE_NAME),
    }
}

/// Picks the directories for a single-project run.
pub fn resolve_dirs(
    cwd: &Utf8Path,
    src: Option<&Utf8Path>,
    dist: Option<&Utf8Path>,
    config_path: &Utf8Path,
) -> ProjectDirs {
    let tsconfig = if src.is_some() && dist.is_some() {
        None
    } else {
        load_tsconfig(config_path)
    };

    let source_dir = src.map_or_else(
        || {
            tsconfig
                .as_ref()
                .and_then(|c| c.root_dir.clone())
                .unwrap_or_else(|| cwd.join(DEFAULT_SOURCE_DIR))
        },
        |dir| cwd.join(dir),
    );
    let output_dir = dist.map_or_else(
        || {
            tsconfig
                .as_ref()
                .and_then(|c| c.out_dir.clone())
                .unwrap_or_else(|| cwd.join(DEFAULT_OUTPUT_DIR))
        },
        |dir| cwd.join(dir),
    );

    ProjectDirs {
        source_dir,
        output_dir,
    }
}

fn load_tsconfig(config_path: &Utf8Path) -> Option<ResolvedTsConfig> {
    if !config_path.is_file() {
        debug!(config = %config_path, "No project config, using defaults");
        return None;
    }
    match ResolvedTsConfig::resolve(config_path) {
        Ok(resolved) => Some(resolved),
        Err(e) => {
            warn!(config = %config_path, error = %e, "Ignoring unreadable project config");
            None
        }
    }
}
