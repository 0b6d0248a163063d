// crates/tile-manifest-core/src/value.rs
// ============================================================================
// Module: Manifest Values
// Description: Tagged value tree decoded from rendered YAML manifests.
// Purpose: Give tests typed, non-panicking access to loosely-typed YAML data.
// Dependencies: serde, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! Rendered manifests are untyped YAML. [`ManifestValue`] is the closed set of
//! shapes a decoded manifest node can take, with accessors that fail with a
//! [`ValueError::TypeMismatch`] instead of panicking.
//! Invariants:
//! - Mapping keys are always strings; non-string scalar keys keep their YAML text.
//! - YAML tags are discarded; the tagged value is kept.
//! - Integers keep their integer type; values above `i64::MAX` are
//!   [`ManifestValue::UInt`].
//! - Two keys with the same normalized text are rejected, never merged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Mapping node keyed by property name.
pub type ValueMapping = BTreeMap<String, ManifestValue>;

/// A single node of a rendered manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ManifestValue {
    /// YAML `null` or `~`.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Signed integer scalar.
    Int(i64),
    /// Unsigned integer scalar above `i64::MAX`.
    UInt(u64),
    /// Floating point scalar.
    Float(f64),
    /// String scalar.
    String(String),
    /// Ordered sequence.
    Sequence(Vec<ManifestValue>),
    /// Mapping with string keys.
    Mapping(ValueMapping),
}

/// Shape classification used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`ManifestValue::Null`].
    Null,
    /// [`ManifestValue::Bool`].
    Bool,
    /// [`ManifestValue::Int`].
    Int,
    /// [`ManifestValue::UInt`].
    UInt,
    /// [`ManifestValue::Float`].
    Float,
    /// [`ManifestValue::String`].
    String,
    /// [`ManifestValue::Sequence`].
    Sequence,
    /// [`ManifestValue::Mapping`].
    Mapping,
}

impl ValueKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by typed accessors and YAML conversion.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The node has a different shape than the accessor expects.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Shape the caller asked for.
        expected: ValueKind,
        /// Shape actually present.
        found: ValueKind,
    },
    /// A mapping key was itself a mapping or sequence.
    #[error("unsupported mapping key of kind {0}")]
    UnsupportedKey(ValueKind),
    /// Two mapping keys normalize to the same text (e.g. `503` and `"503"`).
    #[error("duplicate mapping key `{0}`")]
    DuplicateKey(String),
}

// ============================================================================
// SECTION: Accessors
// ============================================================================

impl ManifestValue {
    /// Returns the shape of this node.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::UInt(_) => ValueKind::UInt,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::Mapping(_) => ValueKind::Mapping,
        }
    }

    /// Returns true for [`ManifestValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string payload.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TypeMismatch`] when the node is not a string.
    pub fn as_str(&self) -> Result<&str, ValueError> {
        match self {
            Self::String(value) => Ok(value),
            other => Err(other.mismatch(ValueKind::String)),
        }
    }

    /// Returns the integer payload.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TypeMismatch`] when the node is not an integer.
    pub fn as_i64(&self) -> Result<i64, ValueError> {
        match self {
            Self::Int(value) => Ok(*value),
            other => Err(other.mismatch(ValueKind::Int)),
        }
    }

    /// Returns a non-negative integer payload from either integer variant.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TypeMismatch`] when the node is not an integer or
    /// is negative.
    pub fn as_u64(&self) -> Result<u64, ValueError> {
        match self {
            Self::UInt(value) => Ok(*value),
            Self::Int(value) => u64::try_from(*value).map_err(|_| self.mismatch(ValueKind::UInt)),
            other => Err(other.mismatch(ValueKind::UInt)),
        }
    }

    /// Returns the numeric payload, widening integers.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TypeMismatch`] when the node is not numeric.
    #[allow(clippy::cast_precision_loss, reason = "Manifest integers widen to f64 on request.")]
    pub fn as_f64(&self) -> Result<f64, ValueError> {
        match self {
            Self::Float(value) => Ok(*value),
            Self::Int(value) => Ok(*value as f64),
            Self::UInt(value) => Ok(*value as f64),
            other => Err(other.mismatch(ValueKind::Float)),
        }
    }

    /// Returns the boolean payload.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TypeMismatch`] when the node is not a boolean.
    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match self {
            Self::Bool(value) => Ok(*value),
            other => Err(other.mismatch(ValueKind::Bool)),
        }
    }

    /// Returns the sequence items.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TypeMismatch`] when the node is not a sequence.
    pub fn as_sequence(&self) -> Result<&[Self], ValueError> {
        match self {
            Self::Sequence(items) => Ok(items),
            other => Err(other.mismatch(ValueKind::Sequence)),
        }
    }

    /// Returns the mapping entries.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TypeMismatch`] when the node is not a mapping.
    pub fn as_mapping(&self) -> Result<&ValueMapping, ValueError> {
        match self {
            Self::Mapping(entries) => Ok(entries),
            other => Err(other.mismatch(ValueKind::Mapping)),
        }
    }

    /// Looks up a key when this node is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Mapping(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Renders scalars as text; `None` for null, sequences, and mappings.
    ///
    /// Used for predicate matching, where `port=443` must match both the
    /// integer `443` and the string `"443"`.
    #[must_use]
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Bool(value) => Some(value.to_string()),
            Self::Int(value) => Some(value.to_string()),
            Self::UInt(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::String(value) => Some(value.clone()),
            Self::Null | Self::Sequence(_) | Self::Mapping(_) => None,
        }
    }

    /// Serializes the node back to YAML text.
    ///
    /// # Errors
    ///
    /// Returns the YAML emitter error when serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Builds a mismatch error against this node's kind.
    const fn mismatch(&self, expected: ValueKind) -> ValueError {
        ValueError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }
}

// ============================================================================
// SECTION: YAML Conversion
// ============================================================================

impl ManifestValue {
    /// Converts a decoded YAML value into a manifest value.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::UnsupportedKey`] when a mapping key is itself a
    /// mapping or sequence, and [`ValueError::DuplicateKey`] when two keys
    /// normalize to the same text.
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, ValueError> {
        Ok(match value {
            serde_yaml::Value::Null => Self::Null,
            serde_yaml::Value::Bool(value) => Self::Bool(value),
            serde_yaml::Value::Number(number) => number_to_value(&number),
            serde_yaml::Value::String(value) => Self::String(value),
            serde_yaml::Value::Sequence(items) => Self::Sequence(
                items.into_iter().map(Self::from_yaml).collect::<Result<Vec<_>, _>>()?,
            ),
            serde_yaml::Value::Mapping(entries) => {
                let mut mapping = ValueMapping::new();
                for (key, value) in entries {
                    let key = key_text(key)?;
                    if mapping.contains_key(&key) {
                        return Err(ValueError::DuplicateKey(key));
                    }
                    mapping.insert(key, Self::from_yaml(value)?);
                }
                Self::Mapping(mapping)
            }
            serde_yaml::Value::Tagged(tagged) => Self::from_yaml(tagged.value)?,
        })
    }
}

/// Maps a YAML number onto the narrowest lossless variant available.
fn number_to_value(number: &serde_yaml::Number) -> ManifestValue {
    if let Some(value) = number.as_i64() {
        return ManifestValue::Int(value);
    }
    if let Some(value) = number.as_u64() {
        return ManifestValue::UInt(value);
    }
    ManifestValue::Float(number.as_f64().unwrap_or(f64::NAN))
}

/// Renders a YAML mapping key as a string key.
fn key_text(key: serde_yaml::Value) -> Result<String, ValueError> {
    match key {
        serde_yaml::Value::Tagged(tagged) => key_text(tagged.value),
        serde_yaml::Value::String(value) => Ok(value),
        serde_yaml::Value::Null => Ok("null".to_string()),
        other => {
            let converted = ManifestValue::from_yaml(other)?;
            converted.scalar_text().ok_or_else(|| ValueError::UnsupportedKey(converted.kind()))
        }
    }
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

impl From<bool> for ManifestValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ManifestValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ManifestValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ManifestValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for ManifestValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::UInt(value), Self::Int)
    }
}

impl From<f64> for ManifestValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ManifestValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ManifestValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Self>> for ManifestValue {
    fn from(items: Vec<Self>) -> Self {
        Self::Sequence(items)
    }
}

impl From<ValueMapping> for ManifestValue {
    fn from(entries: ValueMapping) -> Self {
        Self::Mapping(entries)
    }
}
