//! Fast hash set type aliases.
//!
//! This module provides [`FxHashSet`] from the `rustc-hash` crate. The Fx hash
//! is considerably faster than the standard library's SipHash for the short
//! path strings this workspace keys on, and none of the inputs are
//! attacker-controlled.
//!
//! # Examples
//!
//! ```
//! use tsp_core::{FxHashSet, fx_hash_set};
//!
//! let mut seen: FxHashSet<&str> = fx_hash_set();
//! assert!(seen.insert("dist/a"));
//! assert!(!seen.insert("dist/a"));
//! ```

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new empty [`FxHashSet`].
///
/// This is equivalent to `FxHashSet::default()` but can be more ergonomic
/// in some contexts due to type inference.
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_set_operations() {
        let mut set: FxHashSet<&str> = fx_hash_set();
        set.insert("one");
        set.insert("two");
        assert!(set.contains("one"));
        assert!(set.contains("two"));
        assert!(!set.contains("three"));
    }
}
