// crates/tile-manifest-render/src/overrides.rs
// ============================================================================
// Module: Config Overrides
// Description: Caller-supplied property overrides for a render request.
// Purpose: Collect override values in a stable, serializable order.
// Dependencies: tile-manifest-core
// ============================================================================

//! Caller-supplied property overrides, keyed by property identifier such as
//! `.router.frontend_idle_timeout`. An empty set means "render defaults".

use tile_manifest_core::ManifestValue;
use tile_manifest_core::ValueMapping;

/// Ordered override mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// Override values by property identifier.
    entries: ValueMapping,
}

impl ConfigOverrides {
    /// Creates an empty override set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an override and returns the updated set.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ManifestValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces an override.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ManifestValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns true when no overrides are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates overrides in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the overrides as a mapping node.
    #[must_use]
    pub fn to_document(&self) -> ManifestValue {
        ManifestValue::Mapping(self.entries.clone())
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigOverrides
where
    K: Into<String>,
    V: Into<ManifestValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut overrides = Self::new();
        for (key, value) in iter {
            overrides.insert(key, value);
        }
        overrides
    }
}
