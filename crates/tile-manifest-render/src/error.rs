// crates/tile-manifest-render/src/error.rs
// ============================================================================
// Module: Render Errors
// Description: Error taxonomy for manifest render requests.
// Purpose: Classify every failure as a render or a parse failure.
// Dependencies: thiserror, tile-manifest-core
// ============================================================================

//! ## Overview
//! [`RenderError`] covers every way a render call can fail. Each variant maps
//! to exactly one [`RenderErrorKind`]; callers that only care whether the
//! renderer or its output was at fault match on [`RenderError::kind`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use tile_manifest_core::ManifestParseError;

use crate::runner::RunnerError;
use crate::scratch::ScratchFileError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Coarse render failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderErrorKind {
    /// The renderer could not be invoked or did not succeed.
    Render,
    /// The renderer succeeded but its output was not a usable manifest.
    Parse,
}

impl RenderErrorKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Render => "render",
            Self::Parse => "parse",
        }
    }
}

/// Render request failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - None are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The request was rejected before any work was done.
    #[error("invalid render request: {0}")]
    InvalidRequest(String),
    /// The scratch config file could not be written or removed.
    #[error(transparent)]
    ScratchFile(#[from] ScratchFileError),
    /// The renderer could not be started, timed out, or was unreadable.
    #[error("unable to retrieve manifest: {0}")]
    Runner(#[from] RunnerError),
    /// The renderer exited unsuccessfully.
    #[error(
        "unable to retrieve manifest: {program} exited with {}: {stderr}{}",
        describe_exit(.exit_code),
        describe_cleanup(.cleanup)
    )]
    RendererFailed {
        /// Program name or path.
        program: String,
        /// Exit code, when the process exited normally.
        exit_code: Option<i32>,
        /// Captured standard error.
        stderr: String,
        /// Scratch file removal failure that followed the renderer failure.
        cleanup: Option<ScratchFileError>,
    },
    /// The renderer output was not a valid manifest.
    #[error(transparent)]
    Parse(#[from] ManifestParseError),
}

impl RenderError {
    /// Returns the coarse classification.
    #[must_use]
    pub const fn kind(&self) -> RenderErrorKind {
        match self {
            Self::Parse(_) => RenderErrorKind::Parse,
            Self::InvalidRequest(_)
            | Self::ScratchFile(_)
            | Self::Runner(_)
            | Self::RendererFailed {
                ..
            } => RenderErrorKind::Render,
        }
    }

    /// Returns a fine-grained stable label for audit events.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::ScratchFile(_) => "scratch_file",
            Self::Runner(err) => err.label(),
            Self::RendererFailed {
                ..
            } => "renderer_failed",
            Self::Parse(_) => "parse",
        }
    }
}

/// Formats an optional exit code.
fn describe_exit(exit_code: &Option<i32>) -> String {
    exit_code.map_or_else(|| "signal".to_string(), |code| format!("status {code}"))
}

/// Formats a trailing scratch cleanup failure, if any.
fn describe_cleanup(cleanup: &Option<ScratchFileError>) -> String {
    cleanup.as_ref().map_or_else(String::new, |err| format!(" (also: {err})"))
}
