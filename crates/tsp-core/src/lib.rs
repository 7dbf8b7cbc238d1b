//! Core types, errors, and configuration for tsprune.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Error types for consistent error handling
//! - Configuration structures
//! - Domain types ([`ArtifactSet`], [`ScanMode`], [`ExclusionList`])
//! - Delete-if-exists removal helpers
//! - The `tsconfig.json` model used for defaults and project references
//! - Type aliases for `FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod artifact;
pub mod config;
pub mod error;
pub mod exclude;
pub mod fs;
pub mod hash;
pub mod tsconfig;

pub use artifact::{
    ARTIFACT_SUFFIXES, ArtifactSet, SOURCE_SUFFIXES, ScanMode, has_source, source_stem, with_suffix,
};
pub use config::{CleanConfig, Config, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR, WatchConfig};
pub use error::{ConfigError, RemoveError};
pub use exclude::ExclusionList;
pub use fs::{remove_dir_all_if_exists, remove_file_if_exists};
pub use hash::{FxHashSet, fx_hash_set};
pub use tsconfig::{
    CompilerOptions, Extends, ProjectReference, ResolvedTsConfig, TSCONFIG_FILE_NAME, TsConfig,
};
