//! Path filtering for delete events.
//!
//! Filters run on the blocking watcher thread, before an event is sent to
//! the channel, so excluded paths never reach the pruner. They see paths
//! relative to the watched source directory.
//!
//! # Examples
//!
//! ```
//! use tsp_watcher::{ExclusionFilter, PathFilter};
//! use tsp_core::ExclusionList;
//! use camino::Utf8Path;
//!
//! let filter = ExclusionFilter::new(ExclusionList::from_entries(["vendor"]));
//! assert!(filter.should_process(Utf8Path::new("app/main.ts")));
//! assert!(!filter.should_process(Utf8Path::new("vendor/lib.ts")));
//! ```

use std::sync::Arc;

use camino::Utf8Path;
use tsp_core::ExclusionList;

/// A filter for determining which delete events to forward.
///
/// # Thread Safety
///
/// Filters must be [`Send`] and [`Sync`] because they are used from the
/// blocking watcher thread. They must also be `'static` to be moved into
/// the spawned task.
///
/// # Examples
///
/// ```
/// use tsp_watcher::PathFilter;
/// use camino::Utf8Path;
///
/// struct SourcesOnly;
///
/// impl PathFilter for SourcesOnly {
///     fn should_process(&self, rel: &Utf8Path) -> bool {
///         rel.extension().is_some_and(|ext| ext == "ts")
///     }
/// }
/// ```
pub trait PathFilter: Send + Sync + 'static {
    /// Returns `true` if the event for `rel` should be forwarded.
    fn should_process(&self, rel: &Utf8Path) -> bool;
}

/// A filter that accepts every path.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl PathFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _rel: &Utf8Path) -> bool {
        true
    }
}

/// A filter that drops excluded paths and everything under excluded
/// directories.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    exclude: ExclusionList,
}

impl ExclusionFilter {
    /// Creates a filter from an exclusion list.
    #[must_use]
    pub fn new(exclude: ExclusionList) -> Self {
        Self { exclude }
    }

    /// Returns the exclusion list.
    #[inline]
    #[must_use]
    pub fn exclude(&self) -> &ExclusionList {
        &self.exclude
    }
}

impl PathFilter for ExclusionFilter {
    fn should_process(&self, rel: &Utf8Path) -> bool {
        !self.exclude.is_excluded(rel)
    }
}

impl<F: PathFilter + ?Sized> PathFilter for Box<F> {
    #[inline]
    fn should_process(&self, rel: &Utf8Path) -> bool {
        (**self).should_process(rel)
    }
}

impl<F: PathFilter + ?Sized> PathFilter for Arc<F> {
    #[inline]
    fn should_process(&self, rel: &Utf8Path) -> bool {
        (**self).should_process(rel)
    }
}
