// crates/tile-manifest-render/src/audit.rs
// ============================================================================
// Module: Render Audit Logging
// Description: Structured audit events for manifest render calls.
// Purpose: Emit one JSON line per render without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each render call produces one [`RenderAuditEvent`]. Sinks decide where the
//! event goes: stderr, an append-only file, or nowhere. Events carry sizes
//! and exit codes only; renderer output and config contents are never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Render call outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderOutcome {
    /// Manifest rendered and parsed.
    Ok,
    /// Any failure.
    Error,
}

/// Render audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct RenderAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Renderer program.
    pub program: String,
    /// Product metadata path passed to the renderer.
    pub metadata_path: String,
    /// Call outcome.
    pub outcome: RenderOutcome,
    /// Stable error label when the call failed.
    pub error_kind: Option<&'static str>,
    /// Renderer exit code when the process ran to completion.
    pub exit_code: Option<i32>,
    /// Wall-clock duration of the call.
    pub duration_ms: u128,
    /// Renderer stdout size in bytes.
    pub stdout_bytes: usize,
    /// Renderer stderr size in bytes.
    pub stderr_bytes: usize,
}

/// Inputs required to construct a render audit event.
pub struct RenderAuditEventParams {
    /// Renderer program.
    pub program: String,
    /// Product metadata path passed to the renderer.
    pub metadata_path: String,
    /// Call outcome.
    pub outcome: RenderOutcome,
    /// Stable error label when the call failed.
    pub error_kind: Option<&'static str>,
    /// Renderer exit code when the process ran to completion.
    pub exit_code: Option<i32>,
    /// Wall-clock duration of the call.
    pub duration_ms: u128,
    /// Renderer stdout size in bytes.
    pub stdout_bytes: usize,
    /// Renderer stderr size in bytes.
    pub stderr_bytes: usize,
}

impl RenderAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: RenderAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "manifest_render",
            timestamp_ms,
            program: params.program,
            metadata_path: params.metadata_path,
            outcome: params.outcome,
            error_kind: params.error_kind,
            exit_code: params.exit_code,
            duration_ms: params.duration_ms,
            stdout_bytes: params.stdout_bytes,
            stderr_bytes: params.stderr_bytes,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for render events.
pub trait RenderAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &RenderAuditEvent);
}

/// Audit sink that discards events.
pub struct NoopAuditSink;

impl RenderAuditSink for NoopAuditSink {
    fn record(&self, _event: &RenderAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl RenderAuditSink for StderrAuditSink {
    fn record(&self, event: &RenderAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RenderAuditSink for FileAuditSink {
    fn record(&self, event: &RenderAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}
