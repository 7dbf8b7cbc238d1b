//! Locating and running the TypeScript compiler.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use camino::Utf8Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Exit code used when no compiler can be found.
pub const MISSING_COMPILER_EXIT: u8 = 9;

#[cfg(windows)]
const TSC_BIN: &str = "tsc.cmd";
#[cfg(not(windows))]
const TSC_BIN: &str = "tsc";

/// A compiler executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    program: PathBuf,
}

impl Compiler {
    /// Uses `program` as the compiler.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Finds `tsc`: the nearest `node_modules/.bin/tsc` at or above `start`,
    /// else `tsc` on `PATH`.
    pub fn locate(start: &Utf8Path) -> Option<Self> {
        local_bin(start)
            .or_else(|| which::which(TSC_BIN).ok())
            .map(Self::new)
    }

    /// Returns the executable path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Starts the compiler, streaming its standard output line by line.
    ///
    /// Standard error is inherited.
    pub fn spawn(&self, args: &[String], cwd: &Utf8Path) -> io::Result<RunningCompiler> {
        debug!(program = %self.program.display(), ?args, "Starting compiler");

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let forward = child.stdout.take().map(|out| tokio::spawn(forward_lines(out)));
        Ok(RunningCompiler { child, forward })
    }
}

fn local_bin(start: &Utf8Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join("node_modules").join(".bin").join(TSC_BIN))
        .find(|candidate| candidate.is_file())
        .map(camino::Utf8PathBuf::into_std_path_buf)
}

async fn forward_lines(out: ChildStdout) -> io::Result<()> {
    let mut lines = BufReader::new(out).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
    Ok(())
}

/// A running compiler process.
#[derive(Debug)]
pub struct RunningCompiler {
    child: Child,
    forward: Option<JoinHandle<io::Result<()>>>,
}

impl RunningCompiler {
    /// Waits for the compiler to exit and for its output to drain.
    pub async fn wait(mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait().await?;
        self.drain_output().await;
        Ok(status)
    }

    /// Kills the compiler if it is still running.
    pub async fn stop(mut self) -> io::Result<()> {
        if self.child.try_wait()?.is_none() {
            self.child.kill().await?;
        }
        self.drain_output().await;
        Ok(())
    }

    async fn drain_output(&mut self) {
        let Some(handle) = self.forward.take() else {
            return;
        };
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Failed to forward compiler output"),
            Err(e) => warn!(error = %e, "Compiler output task failed"),
        }
    }
}

/// Maps a compiler exit status to the process exit code.
pub fn exit_code(status: ExitStatus) -> std::process::ExitCode {
    status
        .code()
        .and_then(|code| u8::try_from(code).ok())
        .map_or(std::process::ExitCode::FAILURE, std::process::ExitCode::from)
}
