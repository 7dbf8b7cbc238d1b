//! Reading `tsconfig.json` project files.
//!
//! Only the handful of fields tsprune cares about are modelled:
//! `compilerOptions.rootDir`, `compilerOptions.outDir`, `references`, and
//! `extends`. Everything else in the file is ignored.
//!
//! The compiler accepts comments and trailing commas in these files, so the
//! text is reduced to plain JSON before it reaches `serde_json`.
//!
//! # Examples
//!
//! ```
//! use tsp_core::TsConfig;
//!
//! let config = TsConfig::parse(r#"{
//!     // emitted next to the package
//!     "compilerOptions": { "rootDir": "./lib", "outDir": "./build", },
//!     "references": [{ "path": "../shared" }],
//! }"#).unwrap();
//!
//! assert_eq!(config.compiler_options.out_dir.as_deref(), Some("./build"));
//! assert_eq!(config.references[0].path, "../shared");
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use json_comments::CommentSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Blanks out `//` and `/* */` comments and trailing commas.
///
/// Offsets are preserved, so `serde_json` errors still point at the right
/// line and column of the original file.
fn strip_jsonc(text: &str) -> Result<String, serde_json::Error> {
    let mut text = text.to_owned();
    json_comments::strip_comments_in_place(&mut text, CommentSettings::c_style(), true)
        .map_err(serde_json::Error::io)?;
    Ok(text)
}

/// The file name the compiler looks for in a project directory.
pub const TSCONFIG_FILE_NAME: &str = "tsconfig.json";

/// The `extends` field: a single base config or, since TypeScript 5.0, a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Extends {
    /// `"extends": "./base.json"`
    One(String),
    /// `"extends": ["./a.json", "./b.json"]`
    Many(Vec<String>),
}

impl Extends {
    /// Returns the entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        match self {
            Self::One(entry) => std::slice::from_ref(entry),
            Self::Many(entries) => entries,
        }
    }
}

/// The subset of `compilerOptions` tsprune reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// `rootDir`, relative to the declaring config file.
    pub root_dir: Option<String>,
    /// `outDir`, relative to the declaring config file.
    pub out_dir: Option<String>,
}

/// An entry of the `references` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectReference {
    /// A project directory or config file, relative to the declaring config.
    pub path: String,
}

/// A parsed `tsconfig.json`, before `extends` is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TsConfig {
    /// Base configuration(s) this file inherits from.
    pub extends: Option<Extends>,
    /// Compiler options.
    pub compiler_options: CompilerOptions,
    /// Referenced sub-projects.
    pub references: Vec<ProjectReference>,
}

impl TsConfig {
    /// Parses config text, accepting comments and trailing commas.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the text is not valid JSON once
    /// comments and trailing commas are removed.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&strip_jsonc(text)?)
    }

    /// Reads and parses the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it cannot be parsed.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

/// A config with `extends` applied and its paths joined onto real directories.
///
/// `root_dir` and `out_dir` are joined onto the directory of the file that
/// declared them; `references` are joined onto this config's directory and
/// are never inherited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTsConfig {
    /// The config file this was resolved from.
    pub config_path: Utf8PathBuf,
    /// Resolved `rootDir`, if any config in the chain sets one.
    pub root_dir: Option<Utf8PathBuf>,
    /// Resolved `outDir`, if any config in the chain sets one.
    pub out_dir: Option<Utf8PathBuf>,
    /// Resolved reference targets (directories or config files).
    pub references: Vec<Utf8PathBuf>,
}

impl ResolvedTsConfig {
    /// Loads `config_path` and follows its relative `extends` chain.
    ///
    /// Package-style `extends` entries (`"@tsconfig/node20/tsconfig.json"`)
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any file in the chain cannot be read or
    /// parsed, or [`ConfigError::ExtendsCycle`] if the chain loops.
    pub fn resolve(config_path: &Utf8Path) -> Result<Self, ConfigError> {
        let config = TsConfig::load(config_path)?;
        let dir = parent_dir(config_path);

        let mut resolved = Self {
            config_path: config_path.to_owned(),
            root_dir: config.compiler_options.root_dir.as_deref().map(|d| dir.join(d)),
            out_dir: config.compiler_options.out_dir.as_deref().map(|d| dir.join(d)),
            references: config.references.iter().map(|r| dir.join(&r.path)).collect(),
        };

        let mut chain = vec![config_path.to_owned()];
        resolved.inherit(&config, dir, &mut chain)?;
        Ok(resolved)
    }

    /// Returns the directory containing the config file.
    #[must_use]
    pub fn project_dir(&self) -> &Utf8Path {
        parent_dir(&self.config_path)
    }

    fn is_complete(&self) -> bool {
        self.root_dir.is_some() && self.out_dir.is_some()
    }

    fn inherit(
        &mut self,
        config: &TsConfig,
        dir: &Utf8Path,
        chain: &mut Vec<Utf8PathBuf>,
    ) -> Result<(), ConfigError> {
        let Some(extends) = &config.extends else {
            return Ok(());
        };

        // Later entries override earlier ones.
        for entry in extends.entries().iter().rev() {
            if self.is_complete() {
                break;
            }
            let Some(base_path) = relative_extends_path(dir, entry) else {
                debug!(extends = %entry, "Skipping package extends");
                continue;
            };
            if chain.contains(&base_path) {
                return Err(ConfigError::ExtendsCycle(base_path));
            }

            let base = TsConfig::load(&base_path)?;
            let base_dir = parent_dir(&base_path);
            if self.root_dir.is_none() {
                self.root_dir = base.compiler_options.root_dir.as_deref().map(|d| base_dir.join(d));
            }
            if self.out_dir.is_none() {
                self.out_dir = base.compiler_options.out_dir.as_deref().map(|d| base_dir.join(d));
            }

            chain.push(base_path.clone());
            self.inherit(&base, base_dir, chain)?;
            chain.pop();
        }
        Ok(())
    }
}

fn parent_dir(path: &Utf8Path) -> &Utf8Path {
    path.parent().unwrap_or_else(|| Utf8Path::new(""))
}

/// Resolves a relative or absolute `extends` entry to a file path.
fn relative_extends_path(dir: &Utf8Path, entry: &str) -> Option<Utf8PathBuf> {
    let is_path = entry.starts_with("./")
        || entry.starts_with("../")
        || entry == "."
        || entry == ".."
        || Utf8Path::new(entry).is_absolute();
    if !is_path {
        return None;
    }

    let path = dir.join(entry);
    if path.extension() == Some("json") || path.is_file() {
        Some(path)
    } else {
        Some(Utf8PathBuf::from(format!("{path}.json")))
    }
}
