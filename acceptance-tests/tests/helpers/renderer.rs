// acceptance-tests/tests/helpers/renderer.rs
// ============================================================================
// Module: Renderer Helpers
// Description: Client and product wiring against the fixture tile.
// Purpose: Give suites a one-call way to render the fixture manifest.
// Dependencies: acceptance-tests, tile-manifest-render
// ============================================================================

#![allow(clippy::missing_docs_in_private_items, reason = "Test helpers are documented at the module level.")]

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use acceptance_tests::config::AcceptanceTestConfig;
use tile_manifest_core::Manifest;
use tile_manifest_render::ConfigOverrides;
use tile_manifest_render::OpsManifestClient;
use tile_manifest_render::ProcessRunner;
use tile_manifest_render::ProductConfig;
use tile_manifest_render::ProductError;
use tile_manifest_render::ProductService;

/// Render timeout used when no override is configured.
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns the fixture directory for the named tile.
pub fn fixture_dir(tile: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(tile)
}

/// Returns the fixture tile's metadata path.
pub fn cf_metadata() -> PathBuf {
    fixture_dir("cf").join("metadata.yml")
}

/// Returns the fixture tile's base config path.
pub fn cf_base_config() -> PathBuf {
    fixture_dir("cf").join("config.yml")
}

/// Returns the stub renderer built alongside these tests.
pub fn stub_renderer() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_stub-ops-manifest"))
}

/// Loads acceptance settings from the environment.
pub fn acceptance_config() -> Result<AcceptanceTestConfig, String> {
    AcceptanceTestConfig::load()
}

/// Builds a client for the configured renderer, defaulting to the stub.
pub fn client() -> Result<OpsManifestClient<ProcessRunner>, String> {
    let config = acceptance_config()?;
    let program = config.renderer_bin.unwrap_or_else(stub_renderer);
    let timeout = config.timeout.unwrap_or(DEFAULT_TEST_TIMEOUT);
    Ok(client_for(&program, timeout))
}

/// Builds a client for an explicit program and timeout.
pub fn client_for(program: &Path, timeout: Duration) -> OpsManifestClient<ProcessRunner> {
    OpsManifestClient::with_runner(ProcessRunner::new(timeout))
        .with_program(program.display().to_string())
}

/// Builds the fixture tile's product service.
pub fn cf_product() -> Result<ProductService<ProcessRunner>, String> {
    Ok(ProductService::new(
        client()?,
        ProductConfig {
            metadata_path: cf_metadata(),
            config_file: Some(cf_base_config()),
        },
    ))
}

/// Renders the fixture tile with `overrides`.
pub fn render_cf(overrides: &ConfigOverrides) -> Result<Manifest, ProductError> {
    let product = cf_product().map_err(ProductError::Config)?;
    product.render_manifest(overrides)
}
