// acceptance-tests/src/config/env.rs
// ============================================================================
// Module: Acceptance Test Environment
// Description: Environment-backed settings for the tile acceptance suites.
// Purpose: Choose the renderer, timeout, and artifact root for a run.
// Dependencies: tile-manifest-render
// ============================================================================

//! ## Overview
//! Settings are read through the renderer crate's strict env helpers, so
//! empty or non-UTF-8 values fail the run instead of being ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use tile_manifest_render::config::ConfigError;
use tile_manifest_render::config::parse_timeout_seconds;
use tile_manifest_render::config::read_env_nonempty;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for acceptance settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceTestEnv {
    /// Directory that receives rendered manifests and summaries.
    RunRoot,
    /// Real `ops-manifest` to drive instead of the stub.
    RendererBin,
    /// Render timeout in seconds.
    TimeoutSeconds,
}

impl AcceptanceTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "TILE_ACCEPTANCE_RUN_ROOT",
            Self::RendererBin => "TILE_ACCEPTANCE_RENDERER_BIN",
            Self::TimeoutSeconds => "TILE_ACCEPTANCE_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Acceptance settings; every field is optional and defaults to the stub run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcceptanceTestConfig {
    /// Artifact root; artifacts are skipped when unset.
    pub run_root: Option<PathBuf>,
    /// Renderer program override.
    pub renderer_bin: Option<PathBuf>,
    /// Render timeout override.
    pub timeout: Option<Duration>,
}

impl AcceptanceTestConfig {
    /// Loads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a message when a value is empty, not UTF-8, or an invalid
    /// timeout.
    pub fn load() -> Result<Self, String> {
        Self::load_with(read_env_nonempty)
    }

    /// Loads settings through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns a message when `lookup` fails or the timeout is invalid.
    pub fn load_with<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Result<Option<String>, ConfigError>,
    {
        let read = |key: AcceptanceTestEnv| lookup(key.as_str()).map_err(|err| err.to_string());
        let timeout_key = AcceptanceTestEnv::TimeoutSeconds.as_str();
        let timeout = read(AcceptanceTestEnv::TimeoutSeconds)?
            .map(|raw| parse_timeout_seconds(timeout_key, &raw).map(Duration::from_secs))
            .transpose()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            run_root: read(AcceptanceTestEnv::RunRoot)?.map(PathBuf::from),
            renderer_bin: read(AcceptanceTestEnv::RendererBin)?.map(PathBuf::from),
            timeout,
        })
    }
}
