//! Deletion watcher that prunes compiler output as sources disappear.
//!
//! While the compiler runs in watch mode it rewrites output for files that
//! change, but never deletes output for files that vanish. This crate fills
//! that gap: it watches the source tree through `notify`, turns removals
//! into [`DeleteEvent`]s, and lets a [`Pruner`] delete the matching output.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Blocking Thread (spawn_blocking)             │
//! │   RecommendedWatcher ──► removed_paths() ──► PathFilter         │
//! └──────────────────────────────────────────────────│──────────────┘
//!                                      blocking_send │
//!                                                    ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Async Runtime (tokio)                        │
//! │   DeleteWatcher::recv() ──► Pruner::apply() (one at a time)     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use tsp_core::{CleanConfig, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), tsp_watcher::WatchError> {
//! let config = Config {
//!     clean: CleanConfig::new("src", "dist"),
//!     ..Config::default()
//! };
//! let cancel = CancellationToken::new();
//!
//! let stop = cancel.clone();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     stop.cancel();
//! });
//!
//! let stats = tsp_watcher::watch(&config, cancel).await?;
//! println!("Removed {} groups", stats.groups_removed);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod filter;
pub mod pruner;
pub mod watcher;

pub use error::WatchError;
pub use events::{DeleteEvent, RemovedKind, removed_paths};
pub use filter::{AcceptAllFilter, ExclusionFilter, PathFilter};
pub use pruner::{PruneOutcome, PruneStats, Pruner};
pub use watcher::DeleteWatcher;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tsp_core::Config;

/// Watches `config.clean.source_dir` and prunes `config.clean.output_dir`
/// until `cancel` fires.
///
/// Events are applied strictly in order. A failed removal is logged and
/// counted; it does not stop the watch.
///
/// # Errors
///
/// Returns [`WatchError`] if the configuration is invalid, the source
/// directory does not exist, or the watcher cannot be started or stopped.
pub async fn watch(config: &Config, cancel: CancellationToken) -> Result<PruneStats, WatchError> {
    config.validate()?;
    let clean = &config.clean;

    let filter = ExclusionFilter::new(clean.exclude.clone());
    let mut watcher = DeleteWatcher::new(&clean.source_dir, &config.watch, filter).await?;
    let pruner = Pruner::new(clean, &config.watch);

    debug!(
        source = %watcher.watch_path(),
        output = %pruner.output_dir(),
        "Watching in \"{}\"",
        clean.source_dir
    );

    let mut stats = PruneStats::default();
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            event = watcher.recv() => {
                let Some(event) = event else {
                    break;
                };
                let result = pruner.apply(&event);
                if let Err(e) = &result {
                    warn!(path = %e.path, error = %e.source, "Failed to remove output");
                }
                stats.record(&result);
            }
        }
    }

    watcher.shutdown().await?;
    info!(
        groups = stats.groups_removed,
        dirs = stats.dirs_removed,
        "Stopped watching \"{}\"",
        clean.source_dir
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    use camino::{Utf8Path, Utf8PathBuf};
    use tempfile::TempDir;
    use tsp_core::{CleanConfig, WatchConfig};

    fn project(files: &[&str]) -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        for file in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }
        (dir, root)
    }

    async fn wait_until(mut done: impl FnMut() -> bool) -> bool {
        for _ in 0..50 {
            if done() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        done()
    }

    #[tokio::test]
    async fn test_watch_missing_source_dir() {
        let (_dir, root) = project(&[]);
        let config = Config {
            clean: CleanConfig::new("src", "dist").resolved_against(&root),
            ..Config::default()
        };

        let result = watch(&config, CancellationToken::new()).await;

        assert!(matches!(result, Err(WatchError::PathNotFound(_))));
    }

    #[tokio::test]
    async fn test_watch_stops_when_cancelled() {
        let (_dir, root) = project(&["src/a.ts"]);
        let config = Config {
            clean: CleanConfig::new("src", "dist").resolved_against(&root),
            ..Config::default()
        };
        let cancel = CancellationToken::new();
        cancel.cancel();

        let stats = watch(&config, cancel).await.unwrap();

        assert_eq!(stats, PruneStats::default());
    }

    /// Runs `watch` while `change` edits the source tree, then waits until
    /// `dist/zz_last.js` is pruned. `src/zz_last.ts` is deleted after
    /// `change`, so every earlier event has been applied by then.
    async fn watch_while(
        root: &Utf8Path,
        watch_config: WatchConfig,
        change: impl FnOnce(&Utf8Path),
    ) -> PruneStats {
        let config = Config {
            clean: CleanConfig::new("src", "dist").resolved_against(root),
            watch: watch_config,
        };
        let cancel = CancellationToken::new();
        let task = tokio::spawn({
            let cancel = cancel.clone();
            async move { watch(&config, cancel).await }
        });
        tokio::time::sleep(Duration::from_millis(300)).await;

        change(root);
        fs::remove_file(root.join("src/zz_last.ts")).unwrap();

        let last = root.join("dist/zz_last.js");
        let settled = wait_until(|| !last.exists()).await;
        cancel.cancel();
        let stats = task.await.unwrap().unwrap();

        assert!(settled, "deleting src/zz_last.ts did not prune its output");
        stats
    }

    const TREE: &[&str] = &[
        "src/foo.ts",
        "src/bar.txt",
        "src/keep.ts",
        "src/sub/baz.ts",
        "src/zz_last.ts",
        "dist/foo.js",
        "dist/foo.js.map",
        "dist/foo.d.ts",
        "dist/bar.txt",
        "dist/keep.js",
        "dist/sub/baz.js",
        "dist/sub/asset.json",
        "dist/zz_last.js",
    ];

    fn delete_sources(root: &Utf8Path) {
        fs::remove_file(root.join("src/foo.ts")).unwrap();
        fs::remove_file(root.join("src/bar.txt")).unwrap();
        fs::remove_dir_all(root.join("src/sub")).unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_watch_prunes_deleted_sources() {
        let (_dir, root) = project(TREE);

        let stats = watch_while(&root, WatchConfig::default(), delete_sources).await;

        assert!(!root.join("dist/foo.js").exists());
        assert!(!root.join("dist/foo.js.map").exists());
        assert!(!root.join("dist/foo.d.ts").exists());
        assert!(!root.join("dist/sub").exists());
        assert!(root.join("dist/bar.txt").exists());
        assert!(root.join("dist/keep.js").exists());
        assert!(stats.groups_removed >= 2);
        assert!(stats.dirs_removed >= 1);
        assert_eq!(stats.failures, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_watch_keeps_output_dirs_when_disabled() {
        let (_dir, root) = project(TREE);

        let stats = watch_while(
            &root,
            WatchConfig::default().with_remove_empty_dirs(false),
            delete_sources,
        )
        .await;

        assert!(!root.join("dist/foo.js").exists());
        assert!(!root.join("dist/sub/baz.js").exists());
        assert!(root.join("dist/sub").is_dir());
        assert!(root.join("dist/sub/asset.json").exists());
        assert!(root.join("dist/bar.txt").exists());
        assert_eq!(stats.dirs_removed, 0);
    }
}
