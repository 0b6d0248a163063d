// crates/tile-manifest-render/src/config.rs
// ============================================================================
// Module: Renderer Config
// Description: TOML-backed configuration with strict environment overrides.
// Purpose: Wire renderer clients and product services from one config source.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! [`RendererConfig`] is loaded from a TOML file (explicit path,
//! `TILE_MANIFEST_CONFIG`, or `tile-manifest.toml` in the working directory),
//! then overlaid with environment overrides and validated.
//! Invariants:
//! - Unknown keys are rejected.
//! - Environment values must be valid UTF-8 and non-empty; invalid values
//!   fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::RenderAuditSink;
use crate::audit::StderrAuditSink;
use crate::client::DEFAULT_RENDERER_PROGRAM;
use crate::client::OpsManifestClient;
use crate::product::ProductConfig;
use crate::product::ProductService;
use crate::runner::DEFAULT_RENDER_TIMEOUT;
use crate::runner::ProcessRunner;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default config filename, looked up in the working directory.
pub const DEFAULT_CONFIG_NAME: &str = "tile-manifest.toml";
/// Maximum allowed config file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 512 * 1024;

/// Environment keys recognized by [`RendererConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererEnv {
    /// Config file path.
    ConfigPath,
    /// Renderer program override.
    RendererBin,
    /// Renderer timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Product metadata path override.
    MetadataPath,
    /// Base product config file override.
    ProductConfig,
}

impl RendererEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "TILE_MANIFEST_CONFIG",
            Self::RendererBin => "TILE_MANIFEST_RENDERER_BIN",
            Self::TimeoutSeconds => "TILE_MANIFEST_TIMEOUT_SEC",
            Self::MetadataPath => "TILE_MANIFEST_METADATA_PATH",
            Self::ProductConfig => "TILE_MANIFEST_PRODUCT_CONFIG",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// The config file is not valid TOML for this schema.
    #[error("config parse error: {0}")]
    Parse(String),
    /// An environment override is malformed.
    #[error("config env error: {0}")]
    Env(String),
    /// The config is well-formed but unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Top-level renderer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RendererConfig {
    /// Renderer process settings.
    #[serde(default)]
    pub renderer: RendererSection,
    /// Product inputs.
    #[serde(default)]
    pub product: ProductSection,
    /// Audit sink selection.
    #[serde(default)]
    pub audit: AuditSection,
}

/// `[renderer]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RendererSection {
    /// Program name or path.
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments appended after the standard flags.
    #[serde(default)]
    pub additional_args: Vec<String>,
    /// Process timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Scratch file directory; system temp dir when unset.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for RendererSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            additional_args: Vec::new(),
            timeout_secs: default_timeout_secs(),
            scratch_dir: None,
        }
    }
}

/// `[product]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSection {
    /// Product metadata path; required to build a product service.
    #[serde(default)]
    pub metadata_path: Option<PathBuf>,
    /// Optional base renderer config.
    #[serde(default)]
    pub config_file: Option<PathBuf>,
}

/// Audit sink backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
}

/// `[audit]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditSection {
    /// Sink backend.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path for the `file` sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Serde default for `renderer.program`.
fn default_program() -> String {
    DEFAULT_RENDERER_PROGRAM.to_string()
}

/// Serde default for `renderer.timeout_secs`.
const fn default_timeout_secs() -> u64 {
    DEFAULT_RENDER_TIMEOUT.as_secs()
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl RendererConfig {
    /// Loads configuration from disk and the process environment.
    ///
    /// Without an explicit `path` or `TILE_MANIFEST_CONFIG`, a missing
    /// `tile-manifest.toml` yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading, parsing, env overrides, or
    /// validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = match path {
            Some(path) => Some(path.to_path_buf()),
            None => read_env_nonempty(RendererEnv::ConfigPath.as_str())?.map(PathBuf::from),
        };
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_NAME);
                if fallback.is_file() { Self::from_file(&fallback)? } else { Self::default() }
            }
        };
        config.apply_env_with(read_env_nonempty)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file without env overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, too large, not
    /// UTF-8, or not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses config text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text does not match the schema.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Overlays environment overrides obtained through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when `lookup` fails or a value is invalid.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Result<Option<String>, ConfigError>,
    {
        if let Some(program) = lookup(RendererEnv::RendererBin.as_str())? {
            self.renderer.program = program;
        }
        if let Some(raw) = lookup(RendererEnv::TimeoutSeconds.as_str())? {
            self.renderer.timeout_secs =
                parse_timeout_seconds(RendererEnv::TimeoutSeconds.as_str(), &raw)?;
        }
        if let Some(path) = lookup(RendererEnv::MetadataPath.as_str())? {
            self.product.metadata_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(RendererEnv::ProductConfig.as_str())? {
            self.product.config_file = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.renderer.program.trim().is_empty() {
            return Err(ConfigError::Invalid("renderer.program must not be empty".to_string()));
        }
        if self.renderer.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "renderer.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(path) = &self.product.metadata_path
            && path.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid("product.metadata_path must not be empty".to_string()));
        }
        if self.audit.sink == AuditSinkKind::File && self.audit.path.is_none() {
            return Err(ConfigError::Invalid("audit.sink = \"file\" requires audit.path".to_string()));
        }
        Ok(())
    }

    /// Returns the renderer timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.renderer.timeout_secs)
    }

    // ========================================================================
    // SECTION: Wiring
    // ========================================================================

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file sink cannot be opened.
    pub fn build_audit_sink(&self) -> Result<Arc<dyn RenderAuditSink>, ConfigError> {
        match self.audit.sink {
            AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
            AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
            AuditSinkKind::File => {
                let path = self.audit.path.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("audit.sink = \"file\" requires audit.path".to_string())
                })?;
                let sink = FileAuditSink::new(path)
                    .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
                Ok(Arc::new(sink))
            }
        }
    }

    /// Builds a renderer client backed by child processes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation or audit wiring fails.
    pub fn build_client(&self) -> Result<OpsManifestClient<ProcessRunner>, ConfigError> {
        self.validate()?;
        let mut client = OpsManifestClient::with_runner(ProcessRunner::new(self.timeout()))
            .with_program(self.renderer.program.clone())
            .with_additional_args(self.renderer.additional_args.iter().cloned())
            .with_audit_sink(self.build_audit_sink()?);
        if let Some(dir) = &self.renderer.scratch_dir {
            client = client.with_scratch_dir(dir.clone());
        }
        Ok(client)
    }

    /// Builds a product service from the `[product]` section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `product.metadata_path` is unset,
    /// or any error of [`RendererConfig::build_client`].
    pub fn build_product_service(&self) -> Result<ProductService<ProcessRunner>, ConfigError> {
        let metadata_path = self
            .product
            .metadata_path
            .clone()
            .ok_or_else(|| ConfigError::Invalid("product.metadata_path is required".to_string()))?;
        let client = self.build_client()?;
        Ok(ProductService::new(
            client,
            ProductConfig {
                metadata_path,
                config_file: self.product.config_file.clone(),
            },
        ))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::Env(format!("{name} must be valid UTF-8")))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
pub fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Env(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value in seconds.
///
/// # Errors
///
/// Returns an error when the value is empty, non-numeric, or zero.
pub fn parse_timeout_seconds(name: &str, raw: &str) -> Result<u64, ConfigError> {
    let trimmed = raw.trim();
    let secs: u64 = trimmed.parse().map_err(|_| {
        ConfigError::Env(format!("{name} must be a positive integer number of seconds"))
    })?;
    if secs == 0 {
        return Err(ConfigError::Env(format!("{name} must be greater than zero")));
    }
    Ok(secs)
}
