// crates/tile-manifest-render/src/client.rs
// ============================================================================
// Module: Ops Manifest Client
// Description: Renders tile manifests through the external ops-manifest tool.
// Purpose: Turn a config document and product metadata into a Manifest.
// Dependencies: crate::runner, crate::scratch, crate::audit, tile-manifest-core
// ============================================================================

//! ## Overview
//! [`OpsManifestClient::render`] writes the config to a scratch `.yml` file,
//! runs `<program> --config-file <file> --metadata-path <metadata> [extra...]`,
//! and parses stdout as the rendered manifest.
//! Invariants:
//! - The scratch file is gone when a render call returns, on every path.
//! - Every call emits exactly one audit event.
//! - Calls share no state; concurrent calls use distinct scratch files.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tile_manifest_core::Manifest;
use tile_manifest_core::ManifestValue;

use crate::audit::NoopAuditSink;
use crate::audit::RenderAuditEvent;
use crate::audit::RenderAuditEventParams;
use crate::audit::RenderAuditSink;
use crate::audit::RenderOutcome;
use crate::error::RenderError;
use crate::overrides::ConfigOverrides;
use crate::runner::CommandRunner;
use crate::runner::ProcessRunner;
use crate::scratch::ScratchConfigFile;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Renderer program invoked when none is configured.
pub const DEFAULT_RENDERER_PROGRAM: &str = "ops-manifest";
/// Flag carrying the scratch config path.
pub const CONFIG_FILE_FLAG: &str = "--config-file";
/// Flag carrying the product metadata path.
pub const METADATA_PATH_FLAG: &str = "--metadata-path";

// ============================================================================
// SECTION: Client
// ============================================================================

/// Client for the external manifest renderer.
pub struct OpsManifestClient<R = ProcessRunner> {
    /// Process execution seam.
    runner: R,
    /// Renderer program name or path.
    program: String,
    /// Extra arguments appended verbatim after the standard flags.
    additional_args: Vec<String>,
    /// Directory for scratch files; system temp dir when `None`.
    scratch_dir: Option<PathBuf>,
    /// Destination for render audit events.
    audit: Arc<dyn RenderAuditSink>,
}

impl OpsManifestClient<ProcessRunner> {
    /// Creates a client that runs `ops-manifest` as a child process.
    #[must_use]
    pub fn new() -> Self {
        Self::with_runner(ProcessRunner::default())
    }
}

impl Default for OpsManifestClient<ProcessRunner> {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates per-call details for the audit event.
#[derive(Default)]
struct RenderTrace {
    /// Renderer exit code.
    exit_code: Option<i32>,
    /// Renderer stdout size.
    stdout_bytes: usize,
    /// Renderer stderr size.
    stderr_bytes: usize,
}

impl<R: CommandRunner> OpsManifestClient<R> {
    /// Creates a client over a custom runner.
    #[must_use]
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            program: DEFAULT_RENDERER_PROGRAM.to_string(),
            additional_args: Vec::new(),
            scratch_dir: None,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Sets the renderer program.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets arguments appended after `--config-file` and `--metadata-path`.
    #[must_use]
    pub fn with_additional_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additional_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Places scratch files in `dir` instead of the system temp dir.
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Routes audit events to `sink`.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn RenderAuditSink>) -> Self {
        self.audit = sink;
        self
    }

    /// Returns the renderer program.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the extra renderer arguments.
    #[must_use]
    pub fn additional_args(&self) -> &[String] {
        &self.additional_args
    }

    /// Returns the runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Renders a manifest with `overrides` as the renderer config.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the request is invalid, the scratch file
    /// fails, the renderer fails, or its output is not a manifest.
    pub fn render(
        &self,
        overrides: &ConfigOverrides,
        metadata_path: &Path,
    ) -> Result<Manifest, RenderError> {
        self.render_document(&overrides.to_document(), metadata_path)
    }

    /// Renders a manifest from a complete config document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] as for [`OpsManifestClient::render`]; a
    /// non-mapping `config` is an [`RenderError::InvalidRequest`].
    pub fn render_document(
        &self,
        config: &ManifestValue,
        metadata_path: &Path,
    ) -> Result<Manifest, RenderError> {
        let started = Instant::now();
        let mut trace = RenderTrace::default();
        let result = self.render_traced(config, metadata_path, &mut trace);
        self.audit.record(&RenderAuditEvent::new(RenderAuditEventParams {
            program: self.program.clone(),
            metadata_path: metadata_path.display().to_string(),
            outcome: if result.is_ok() { RenderOutcome::Ok } else { RenderOutcome::Error },
            error_kind: result.as_ref().err().map(RenderError::label),
            exit_code: trace.exit_code,
            duration_ms: started.elapsed().as_millis(),
            stdout_bytes: trace.stdout_bytes,
            stderr_bytes: trace.stderr_bytes,
        }));
        result
    }

    /// Performs the render, recording process details into `trace`.
    fn render_traced(
        &self,
        config: &ManifestValue,
        metadata_path: &Path,
        trace: &mut RenderTrace,
    ) -> Result<Manifest, RenderError> {
        if metadata_path.as_os_str().is_empty() {
            return Err(RenderError::InvalidRequest("metadata path is required".to_string()));
        }
        if !matches!(config, ManifestValue::Mapping(_)) {
            return Err(RenderError::InvalidRequest(format!(
                "render config must be a mapping, found {}",
                config.kind()
            )));
        }

        let scratch = ScratchConfigFile::create(self.scratch_dir.as_deref(), config)?;
        let args = self.build_args(scratch.path(), metadata_path);
        let output = self.runner.run(&self.program, &args)?;
        trace.exit_code = output.exit_code;
        trace.stdout_bytes = output.stdout.len();
        trace.stderr_bytes = output.stderr.len();
        let removed = scratch.remove();

        if !output.success {
            return Err(RenderError::RendererFailed {
                program: self.program.clone(),
                exit_code: output.exit_code,
                stderr: output.stderr,
                cleanup: removed.err(),
            });
        }
        removed?;
        Ok(Manifest::from_yaml_str(&output.stdout)?)
    }

    /// Builds the renderer argument list.
    fn build_args(&self, config_file: &Path, metadata_path: &Path) -> Vec<OsString> {
        let mut args = Vec::with_capacity(4 + self.additional_args.len());
        args.push(OsString::from(CONFIG_FILE_FLAG));
        args.push(config_file.as_os_str().to_os_string());
        args.push(OsString::from(METADATA_PATH_FLAG));
        args.push(metadata_path.as_os_str().to_os_string());
        args.extend(self.additional_args.iter().map(OsString::from));
        args
    }
}
