//! Delete watcher with async event streaming.
//!
//! This module provides the [`DeleteWatcher`] type that bridges the
//! synchronous `notify` crate to the async tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Blocking Thread (spawn_blocking)             │
//! │  ┌───────────────────┐    ┌────────────────┐    ┌────────────┐  │
//! │  │ RecommendedWatcher│ -> │ removed_paths()│ -> │ PathFilter │  │
//! │  │ (notify)          │    │ (classify)     │    │ (exclude)  │  │
//! │  └───────────────────┘    └────────────────┘    └─────┬──────┘  │
//! └───────────────────────────────────────────────────────│─────────┘
//!                                                         │
//!                                           blocking_send │
//!                                                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Async Runtime (tokio)                        │
//! │  ┌──────────────────┐    ┌────────────────┐                     │
//! │  │ DeleteWatcher    │    │ mpsc::Receiver │ -> Pruner           │
//! │  │ (shutdown ctrl)  │    │ (events)       │                     │
//! │  └──────────────────┘    └────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No debouncing: a debounced stream no longer says whether a path was
//! removed, and deletions are rare enough that every one is handled.

use camino::{Utf8Path, Utf8PathBuf};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use tsp_core::WatchConfig;

use crate::error::WatchError;
use crate::events::{DeleteEvent, removed_paths};
use crate::filter::PathFilter;

/// Watches a source tree and streams [`DeleteEvent`]s.
///
/// # Lifecycle
///
/// 1. **Creation**: `DeleteWatcher::new()` validates the path, creates
///    channels, and spawns a blocking task with the notify watcher.
/// 2. **Event Reception**: Use `recv()` or `try_recv()`. Events are already
///    filtered and carry paths relative to the watched directory.
/// 3. **Shutdown**: Call `shutdown()` to stop and join, or drop the watcher.
///
/// # Examples
///
/// ```no_run
/// use tsp_watcher::{AcceptAllFilter, DeleteWatcher};
/// use tsp_core::WatchConfig;
/// use camino::Utf8Path;
///
/// # async fn example() -> Result<(), tsp_watcher::WatchError> {
/// let mut watcher = DeleteWatcher::new(
///     Utf8Path::new("./src"),
///     &WatchConfig::default(),
///     AcceptAllFilter,
/// ).await?;
///
/// while let Some(event) = watcher.recv().await {
///     println!("Removed: {} ({:?})", event.path, event.kind);
/// }
/// # Ok(())
/// # }
/// ```
pub struct DeleteWatcher {
    /// Shutdown signal sender. `None` once shutdown has been initiated.
    shutdown_tx: Option<oneshot::Sender<()>>,

    /// Handle to the blocking watcher task.
    task_handle: Option<JoinHandle<Result<(), WatchError>>>,

    /// Event receiver for async consumption.
    event_rx: mpsc::Receiver<DeleteEvent>,

    /// The canonical path being watched.
    watch_path: Utf8PathBuf,
}

impl std::fmt::Debug for DeleteWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeleteWatcher")
            .field("watch_path", &self.watch_path)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl DeleteWatcher {
    /// Starts watching `path` for deletions.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if the path doesn't exist.
    /// Returns [`WatchError::Config`] if the configuration is invalid.
    /// Returns [`WatchError::Io`] if the path cannot be canonicalized.
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn new<F: PathFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
    ) -> Result<Self, WatchError> {
        config.validate()?;
        if !path.is_dir() {
            return Err(WatchError::path_not_found(path));
        }

        let watch_path = path.canonicalize_utf8()?;

        let (event_tx, event_rx) = mpsc::channel(config.channel_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_path = watch_path.clone();
        let recursive = config.recursive;

        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher_loop(task_path, recursive, event_tx, shutdown_rx, filter)
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            event_rx,
            watch_path,
        })
    }

    /// Receives the next delete event.
    ///
    /// Returns `None` once the watcher has stopped.
    pub async fn recv(&mut self) -> Option<DeleteEvent> {
        self.event_rx.recv().await
    }

    /// Tries to receive a delete event without waiting.
    ///
    /// # Errors
    ///
    /// Returns `TryRecvError::Empty` if no event is queued, or
    /// `TryRecvError::Disconnected` once the watcher has stopped.
    pub fn try_recv(&mut self) -> Result<DeleteEvent, mpsc::error::TryRecvError> {
        self.event_rx.try_recv()
    }

    /// Returns the canonical path being watched.
    #[must_use]
    pub fn watch_path(&self) -> &Utf8Path {
        &self.watch_path
    }

    /// Returns `true` if the watcher is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the watcher and waits for the blocking task to finish.
    ///
    /// # Errors
    ///
    /// Returns the error the watcher thread stopped with, or
    /// [`WatchError::ChannelClosed`] if it panicked.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // Ignore error if receiver is already dropped
            let _ = tx.send(());
        }

        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => result?,
                Err(_join_error) => return Err(WatchError::ChannelClosed),
            }
        }

        Ok(())
    }
}

impl Drop for DeleteWatcher {
    fn drop(&mut self) {
        // The task stops when it receives the signal; Drop cannot await it.
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Runs the notify watcher in a blocking context until shutdown.
#[allow(clippy::needless_pass_by_value)] // Path must be owned for the blocking task lifetime
fn run_watcher_loop<F: PathFilter>(
    root: Utf8PathBuf,
    recursive: bool,
    event_tx: mpsc::Sender<DeleteEvent>,
    shutdown_rx: oneshot::Receiver<()>,
    filter: F,
) -> Result<(), WatchError> {
    let handler_root = root.clone();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => forward_removals(&handler_root, &event, &filter, &event_tx),
            Err(error) => warn!(error = %error, "Watcher error"),
        },
        Config::default(),
    )?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(root.as_std_path(), mode)?;

    info!(path = %root, recursive = recursive, "Delete watcher started");

    // Block until shutdown signal is received
    let _ = shutdown_rx.blocking_recv();

    info!(path = %root, "Delete watcher stopped");

    Ok(())
}

/// Sends one [`DeleteEvent`] per removed path that passes the filter.
fn forward_removals<F: PathFilter>(
    root: &Utf8Path,
    event: &Event,
    filter: &F,
    tx: &mpsc::Sender<DeleteEvent>,
) {
    for (kind, path) in removed_paths(event) {
        let Some(utf8_path) = Utf8Path::from_path(path) else {
            let error = WatchError::non_utf8_path(path);
            warn!(error = %error, recoverable = error.is_recoverable(), "Skipping removed path");
            continue;
        };
        let Some(rel) = relative_to(root, utf8_path) else {
            trace!(path = %utf8_path, "Ignoring event outside the watched tree");
            continue;
        };

        if !filter.should_process(&rel) {
            trace!(path = %rel, "Filtered out delete event");
            continue;
        }

        if tx.blocking_send(DeleteEvent::new(rel, kind)).is_err() {
            debug!("Event channel closed, dropping delete events");
            return;
        }
    }
}

/// Returns `path` relative to `root`, or `None` for `root` itself and for
/// paths outside it.
fn relative_to(root: &Utf8Path, path: &Utf8Path) -> Option<Utf8PathBuf> {
    let rel = path.strip_prefix(root).ok()?;
    if rel.as_str().is_empty() {
        return None;
    }
    Some(rel.to_owned())
}
