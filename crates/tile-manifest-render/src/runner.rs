// crates/tile-manifest-render/src/runner.rs
// ============================================================================
// Module: Command Runner
// Description: Process execution seam for the external manifest renderer.
// Purpose: Run the renderer with captured output and a hard timeout.
// Dependencies: tokio, thiserror
// ============================================================================

//! ## Overview
//! [`CommandRunner`] is the seam between the renderer client and the
//! operating system. [`ProcessRunner`] spawns the program with piped output
//! and waits under a timeout on a private current-thread runtime owned by a
//! dedicated thread, so callers stay synchronous and may themselves run
//! inside an async runtime. A timed-out child is killed when its handle drops.
//! Invariants:
//! - Stdin is always closed; stdout and stderr are always captured.
//! - Stdout is decoded as strict UTF-8; stderr is decoded lossily.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::process::Stdio;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::runtime::Builder;
use tokio::time::timeout;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default renderer timeout.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(300);

// ============================================================================
// SECTION: Types
// ============================================================================

/// Captured result of a completed process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, when the process exited normally.
    pub exit_code: Option<i32>,
    /// True when the process exited with status zero.
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Process execution failures. A non-zero exit is not an error at this layer.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    /// The program could not be started.
    #[error("unable to start {program}: {message}")]
    Spawn {
        /// Program name or path.
        program: String,
        /// OS error text.
        message: String,
    },
    /// The program did not exit within the timeout and was killed.
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    TimedOut {
        /// Program name or path.
        program: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },
    /// Waiting on or reading from the process failed.
    #[error("{program} io failure: {message}")]
    Io {
        /// Program name or path.
        program: String,
        /// IO error text.
        message: String,
    },
    /// Stdout was not valid UTF-8.
    #[error("{program} wrote non-utf-8 {stream}")]
    Decode {
        /// Program name or path.
        program: String,
        /// Stream label; always `stdout`.
        stream: &'static str,
    },
}

impl RunnerError {
    /// Returns a stable label for audit events.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Spawn {
                ..
            } => "spawn",
            Self::TimedOut {
                ..
            } => "timeout",
            Self::Io {
                ..
            } => "io",
            Self::Decode {
                ..
            } => "decode",
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Runs an external program to completion.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` and returns its captured output.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the program cannot be started, times out,
    /// or produces undecodable output.
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, RunnerError>;
}

// ============================================================================
// SECTION: Process Runner
// ============================================================================

/// [`CommandRunner`] backed by real child processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessRunner {
    /// Upper bound on process lifetime.
    timeout: Duration,
}

impl ProcessRunner {
    /// Creates a runner with the given timeout.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
        }
    }

    /// Returns the configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_TIMEOUT)
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, RunnerError> {
        let limit = self.timeout;
        thread::scope(|scope| {
            scope
                .spawn(|| {
                    let runtime = Builder::new_current_thread().enable_all().build().map_err(
                        |err| RunnerError::Io {
                            program: program.to_string(),
                            message: format!("runtime init failed: {err}"),
                        },
                    )?;
                    runtime.block_on(run_with_timeout(program, args, limit))
                })
                .join()
                .unwrap_or_else(|_| {
                    Err(RunnerError::Io {
                        program: program.to_string(),
                        message: "runner thread panicked".to_string(),
                    })
                })
        })
    }
}

/// Spawns the program and waits for it under `limit`.
async fn run_with_timeout(
    program: &str,
    args: &[OsString],
    limit: Duration,
) -> Result<CommandOutput, RunnerError> {
    let mut command = Command::new(program);
    command.args(args);
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    command.kill_on_drop(true);

    let child = command.spawn().map_err(|err| RunnerError::Spawn {
        program: program.to_string(),
        message: err.to_string(),
    })?;
    let output = timeout(limit, child.wait_with_output())
        .await
        .map_err(|_| RunnerError::TimedOut {
            program: program.to_string(),
            timeout: limit,
        })?
        .map_err(|err| RunnerError::Io {
            program: program.to_string(),
            message: err.to_string(),
        })?;

    let stdout = String::from_utf8(output.stdout).map_err(|_| RunnerError::Decode {
        program: program.to_string(),
        stream: "stdout",
    })?;
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    Ok(CommandOutput {
        exit_code: output.status.code(),
        success: output.status.success(),
        stdout,
        stderr,
    })
}
