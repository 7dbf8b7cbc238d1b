//! CLI entry point for tsprune.
//!
//! `tsprune` wraps the TypeScript compiler: it removes compiled output whose
//! source was deleted, runs `tsc` with every argument it does not recognize,
//! and optionally keeps pruning while `tsc` watches.
//!
//! # Usage
//!
//! ```bash
//! # Clean dist/ and build once
//! tsprune -p tsconfig.json
//!
//! # Clean, then build and prune continuously
//! tsprune --watch --src src --dist dist
//!
//! # Clean a project and everything it references, keep vendor output
//! tsprune --root-module . --exclude vendor --no-tsc
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod args;
mod compiler;
mod defaults;

use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use color_eyre::eyre::{WrapErr, eyre};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use tsp_cleaner::{CleanError, ProjectCleanOptions, clean_projects};
use tsp_core::{CleanConfig, Config, WatchConfig};

use crate::args::{PartitionedArgs, partition_args};
use crate::compiler::{Compiler, MISSING_COMPILER_EXIT, RunningCompiler, exit_code};
use crate::defaults::{project_config_path, resolve_dirs};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Removes compiled output whose TypeScript source no longer exists, then
/// runs `tsc`.
///
/// Arguments not listed below are passed through to `tsc` unchanged.
#[derive(Debug, Parser)]
#[command(name = "tsprune", version, about, long_about = None)]
struct Cli {
    /// Source directory with `.ts` files.
    ///
    /// Defaults to `compilerOptions.rootDir` from tsconfig.json, else `src`.
    #[arg(short, long, value_name = "DIR", env = "TSPRUNE_SRC")]
    src: Option<Utf8PathBuf>,

    /// Output directory with compiled `.js` files.
    ///
    /// Defaults to `compilerOptions.outDir` from tsconfig.json, else `dist`.
    #[arg(short, long, value_name = "DIR", env = "TSPRUNE_DIST")]
    dist: Option<Utf8PathBuf>,

    /// Relative path under the output directory to never delete (repeatable).
    #[arg(short, long = "exclude", value_name = "PATH")]
    exclude: Vec<String>,

    /// Keep watching for deleted sources after the initial clean.
    #[arg(short, long)]
    watch: bool,

    /// Remove output directories whose source directory is deleted (default).
    #[arg(short = 'r', long = "remove-dirs", overrides_with = "keep_dirs")]
    remove_dirs: bool,

    /// Keep output directories when their source directory is deleted.
    #[arg(long = "keep-dirs", overrides_with = "remove_dirs")]
    keep_dirs: bool,

    /// Find artifact groups by `.d.ts` files instead of `.js` files.
    #[arg(long)]
    strict_declarations: bool,

    /// Clean this project and every project it references.
    #[arg(short = 'm', long, value_name = "DIR")]
    root_module: Option<Utf8PathBuf>,

    /// Only clean (and watch); do not run the compiler.
    #[arg(long)]
    no_tsc: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    /// Returns whether deleted source directories take their output with them.
    const fn remove_dirs(&self) -> bool {
        self.remove_dirs || !self.keep_dirs
    }
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},mio=warn,notify=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Builds a [`Config`] from CLI arguments and the project's tsconfig.json.
fn build_config(cli: &Cli, cwd: &Utf8Path, args: &PartitionedArgs) -> Config {
    let config_path = project_config_path(cwd, args.project());
    let dirs = resolve_dirs(cwd, cli.src.as_deref(), cli.dist.as_deref(), &config_path);

    Config {
        clean: CleanConfig::new(dirs.source_dir, dirs.output_dir)
            .with_exclude(&cli.exclude)
            .with_strict_declarations(cli.strict_declarations),
        watch: WatchConfig::default().with_remove_empty_dirs(cli.remove_dirs()),
    }
}

fn current_dir() -> color_eyre::Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().wrap_err("Cannot read the current directory")?;
    Utf8PathBuf::try_from(cwd).map_err(|e| eyre!("Current directory is not valid UTF-8: {e}"))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs the initial clean, for one project or a reference tree.
fn run_clean(cli: &Cli, cwd: &Utf8Path, config: &Config) -> color_eyre::Result<()> {
    if let Some(root) = &cli.root_module {
        let options = ProjectCleanOptions {
            source_dir: cli.src.clone(),
            output_dir: cli.dist.clone(),
            exclude: config.clean.exclude.clone(),
            strict_declarations: cli.strict_declarations,
        };
        let report = clean_projects(&cwd.join(root), &options)?;
        info!(
            projects = report.projects.len(),
            skipped = report.skipped.len(),
            removed = report.removed_groups(),
            "Cleaned project references"
        );
        return Ok(());
    }

    match tsp_cleaner::clean(&config.clean) {
        Ok(report) if report.is_empty() => {
            debug!(inspected = report.inspected, "No orphaned output");
            Ok(())
        }
        Ok(report) => {
            debug!(inspected = report.inspected, excluded = report.excluded, "Clean finished");
            Ok(())
        }
        Err(CleanError::MissingSourceDir(dir)) => Err(eyre!(
            "Source directory does not exist: {dir} (set it with --src)"
        )),
        Err(e) => Err(e.into()),
    }
}

/// Starts the compiler, or returns `None` when none is installed.
fn start_compiler(
    cwd: &Utf8Path,
    args: &PartitionedArgs,
    watch: bool,
) -> color_eyre::Result<Option<RunningCompiler>> {
    let Some(compiler) = Compiler::locate(cwd) else {
        return Ok(None);
    };
    let running = compiler
        .spawn(&args.compiler_args(watch), cwd)
        .wrap_err_with(|| format!("Failed to start {}", compiler.program().display()))?;
    Ok(Some(running))
}

/// Prunes on every source deletion until Ctrl+C or SIGTERM.
async fn run_watch(
    config: &Config,
    compiler: Option<RunningCompiler>,
) -> color_eyre::Result<ExitCode> {
    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown_signal(cancel.clone()));

    let result = tsp_watcher::watch(config, cancel).await;

    if let Some(compiler) = compiler {
        if let Err(e) = compiler.stop().await {
            warn!(error = %e, "Failed to stop compiler");
        }
    }

    let stats = result?;
    debug!(
        events = stats.events,
        groups = stats.groups_removed,
        dirs = stats.dirs_removed,
        failures = stats.failures,
        "Watch finished"
    );
    Ok(ExitCode::SUCCESS)
}

async fn cancel_on_shutdown_signal(cancel: CancellationToken) {
    // Handle SIGTERM for graceful shutdown on Unix
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                let _ = tokio::signal::ctrl_c().await;
                info!("Received Ctrl+C, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C, shutting down");
    }

    cancel.cancel();
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Split the command line between tsprune and tsc
    let raw: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let args = partition_args(raw.as_slice());
    let cli = Cli::parse_from(std::iter::once("tsprune".to_owned()).chain(args.tool.iter().cloned()));

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    let cwd = current_dir()?;
    let config = build_config(&cli, &cwd, &args);
    debug!(
        source = %config.clean.source_dir,
        output = %config.clean.output_dir,
        compiler_args = ?args.compiler,
        "Resolved options"
    );

    // 4. Remove orphans left by earlier builds
    run_clean(&cli, &cwd, &config)?;

    // 5. Build
    let compiler = if cli.no_tsc {
        None
    } else {
        let Some(running) = start_compiler(&cwd, &args, cli.watch)? else {
            error!("Cannot find tsc; install typescript or add it to PATH");
            return Ok(ExitCode::from(MISSING_COMPILER_EXIT));
        };
        Some(running)
    };

    // 6. Keep pruning, or wait for the build
    if cli.watch {
        return run_watch(&config, compiler).await;
    }
    match compiler {
        Some(running) => {
            let status = running.wait().await.wrap_err("Failed to wait for tsc")?;
            Ok(exit_code(status))
        }
        None => Ok(ExitCode::SUCCESS),
    }
}
