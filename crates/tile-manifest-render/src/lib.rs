// crates/tile-manifest-render/src/lib.rs
// ============================================================================
// Module: Tile Manifest Render
// Description: Client for the external ops-manifest renderer.
// Purpose: Render tile manifests for acceptance tests from config overrides.
// Dependencies: tile-manifest-core, tempfile, tokio, serde_yaml, toml
// ============================================================================

//! ## Overview
//! This crate renders BOSH deployment manifests by shelling out to an
//! `ops-manifest`-style renderer. [`OpsManifestClient`] owns the per-call
//! scratch config file and process invocation; [`ProductService`] layers a
//! product's base config and metadata on top; [`RendererConfig`] wires both
//! from TOML and the environment.
//! Invariants:
//! - Render calls are synchronous and independent.
//! - Every failure is classified as [`RenderErrorKind::Render`] or
//!   [`RenderErrorKind::Parse`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod client;
pub mod config;
pub mod error;
pub mod overrides;
pub mod product;
pub mod runner;
pub mod scratch;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RenderAuditEvent;
pub use audit::RenderAuditSink;
pub use audit::RenderOutcome;
pub use audit::StderrAuditSink;
pub use client::OpsManifestClient;
pub use config::ConfigError;
pub use config::RendererConfig;
pub use config::RendererEnv;
pub use error::RenderError;
pub use error::RenderErrorKind;
pub use overrides::ConfigOverrides;
pub use product::ProductConfig;
pub use product::ProductError;
pub use product::ProductService;
pub use runner::CommandOutput;
pub use runner::CommandRunner;
pub use runner::ProcessRunner;
pub use runner::RunnerError;
pub use scratch::ScratchConfigFile;
pub use scratch::ScratchFileError;
