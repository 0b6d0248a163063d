// crates/tile-manifest-render/src/product.rs
// ============================================================================
// Module: Product Service
// Description: Product-level render context with base config merging.
// Purpose: Render a tile's manifest from its base config plus test overrides.
// Dependencies: crate::client, serde_yaml, thiserror, tile-manifest-core
// ============================================================================

//! ## Overview
//! A [`ProductService`] bundles everything needed to render one tile: the
//! renderer client, the product metadata path, and an optional base config
//! file. Overrides are merged into the base config's `product-properties`
//! mapping as `{ value: <override> }` entries before rendering.
//! Invariants:
//! - The base config file is re-read on every render; it is never cached.
//! - Overrides replace existing `product-properties` entries wholesale.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use tile_manifest_core::Manifest;
use tile_manifest_core::ManifestValue;
use tile_manifest_core::ValueMapping;

use crate::client::OpsManifestClient;
use crate::error::RenderError;
use crate::overrides::ConfigOverrides;
use crate::runner::CommandRunner;
use crate::runner::ProcessRunner;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Key holding product properties in the renderer config.
pub const PRODUCT_PROPERTIES_KEY: &str = "product-properties";
/// Key wrapping each product property value.
pub const PROPERTY_VALUE_KEY: &str = "value";
/// Maximum base config size in bytes.
const MAX_BASE_CONFIG_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Location of a product's render inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductConfig {
    /// Product metadata passed as `--metadata-path`.
    pub metadata_path: PathBuf,
    /// Optional base renderer config (YAML mapping).
    pub config_file: Option<PathBuf>,
}

/// Product render failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    /// The base config could not be read or has the wrong shape.
    #[error("product config error: {0}")]
    Config(String),
    /// Rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Render context for one product.
pub struct ProductService<R = ProcessRunner> {
    /// Renderer client.
    client: OpsManifestClient<R>,
    /// Product inputs.
    config: ProductConfig,
}

// ============================================================================
// SECTION: Service
// ============================================================================

impl<R: CommandRunner> ProductService<R> {
    /// Creates a product service.
    #[must_use]
    pub const fn new(client: OpsManifestClient<R>, config: ProductConfig) -> Self {
        Self {
            client,
            config,
        }
    }

    /// Returns the product inputs.
    #[must_use]
    pub const fn config(&self) -> &ProductConfig {
        &self.config
    }

    /// Returns the renderer client.
    #[must_use]
    pub const fn client(&self) -> &OpsManifestClient<R> {
        &self.client
    }

    /// Renders the product manifest with `overrides` applied.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::Config`] when the base config is unusable and
    /// [`ProductError::Render`] when rendering fails.
    pub fn render_manifest(&self, overrides: &ConfigOverrides) -> Result<Manifest, ProductError> {
        let merged = self.merged_config(overrides)?;
        Ok(self.client.render_document(&merged, &self.config.metadata_path)?)
    }

    /// Returns the config document that would be sent to the renderer.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::Config`] when the base config is unusable.
    pub fn merged_config(&self, overrides: &ConfigOverrides) -> Result<ManifestValue, ProductError> {
        let base = match &self.config.config_file {
            Some(path) => load_base_config(path)?,
            None => ValueMapping::new(),
        };
        merge_overrides(base, overrides).map(ManifestValue::Mapping)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads and decodes the base config; an empty file is an empty mapping.
fn load_base_config(path: &Path) -> Result<ValueMapping, ProductError> {
    let display = path.display();
    let file = File::open(path)
        .map_err(|err| ProductError::Config(format!("unable to open {display}: {err}")))?;
    let limit = u64::try_from(MAX_BASE_CONFIG_BYTES.saturating_add(1))
        .map_err(|_| ProductError::Config("config size limit exceeds u64".to_string()))?;
    let mut text = String::new();
    file.take(limit)
        .read_to_string(&mut text)
        .map_err(|err| ProductError::Config(format!("unable to read {display}: {err}")))?;
    if text.len() > MAX_BASE_CONFIG_BYTES {
        return Err(ProductError::Config(format!("{display} exceeds size limit")));
    }
    if text.trim().is_empty() {
        return Ok(ValueMapping::new());
    }
    let raw: serde_yaml::Value = serde_yaml::from_str(&text)
        .map_err(|err| ProductError::Config(format!("invalid yaml in {display}: {err}")))?;
    match ManifestValue::from_yaml(raw) {
        Ok(ManifestValue::Mapping(entries)) => Ok(entries),
        Ok(other) => Err(ProductError::Config(format!(
            "{display} must contain a mapping, found {}",
            other.kind()
        ))),
        Err(err) => Err(ProductError::Config(format!("{display}: {err}"))),
    }
}

/// Wraps each override as `{ value: v }` under `product-properties`.
fn merge_overrides(
    mut base: ValueMapping,
    overrides: &ConfigOverrides,
) -> Result<ValueMapping, ProductError> {
    let properties = base
        .entry(PRODUCT_PROPERTIES_KEY.to_string())
        .or_insert_with(|| ManifestValue::Mapping(ValueMapping::new()));
    if properties.is_null() {
        *properties = ManifestValue::Mapping(ValueMapping::new());
    }
    let found = properties.kind();
    let ManifestValue::Mapping(properties) = properties else {
        return Err(ProductError::Config(format!(
            "{PRODUCT_PROPERTIES_KEY} must be a mapping, found {found}"
        )));
    };
    for (key, value) in overrides.iter() {
        let mut wrapped = ValueMapping::new();
        wrapped.insert(PROPERTY_VALUE_KEY.to_string(), value.clone());
        properties.insert(key.to_string(), ManifestValue::Mapping(wrapped));
    }
    Ok(base)
}
