// crates/tile-manifest-core/src/manifest.rs
// ============================================================================
// Module: Rendered Manifest
// Description: Owned manifest document with instance-group and job views.
// Purpose: Provide the query surface consumed by tile acceptance tests.
// Dependencies: crate::resolve, crate::value, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! A [`Manifest`] owns the decoded root mapping of a rendered deployment
//! manifest. [`Manifest::find_instance_group_job`] narrows it to a
//! [`JobView`], whose [`JobView::property`] reads under the job's
//! `properties` key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::path::PathSegment;
use crate::path::PropertyPath;
use crate::resolve::ResolveError;
use crate::resolve::resolve;
use crate::resolve::resolve_str;
use crate::value::ManifestValue;
use crate::value::ValueError;
use crate::value::ValueKind;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures turning renderer output into a [`Manifest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestParseError {
    /// Output was empty or whitespace only.
    #[error("manifest document is empty")]
    Empty,
    /// Output was not valid YAML.
    #[error("unable to unmarshal yaml: {0}")]
    Yaml(String),
    /// Output decoded but could not be represented.
    #[error("unsupported manifest value: {0}")]
    Value(#[from] ValueError),
    /// Root node was not a mapping.
    #[error("manifest root must be a mapping, found {0}")]
    NotAMapping(ValueKind),
}

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// Rendered deployment manifest.
///
/// # Invariants
/// - The root is always a [`ManifestValue::Mapping`].
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// Root mapping.
    root: ManifestValue,
}

impl Manifest {
    /// Parses YAML text into a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestParseError`] for empty input, invalid YAML, or a
    /// non-mapping root.
    pub fn from_yaml_str(text: &str) -> Result<Self, ManifestParseError> {
        if text.trim().is_empty() {
            return Err(ManifestParseError::Empty);
        }
        let raw: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|err| ManifestParseError::Yaml(err.to_string()))?;
        Self::from_value(ManifestValue::from_yaml(raw)?)
    }

    /// Wraps an existing value as a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestParseError::NotAMapping`] when `root` is not a mapping.
    pub fn from_value(root: ManifestValue) -> Result<Self, ManifestParseError> {
        match root {
            ManifestValue::Mapping(_) => Ok(Self {
                root,
            }),
            other => Err(ManifestParseError::NotAMapping(other.kind())),
        }
    }

    /// Returns the root mapping node.
    #[must_use]
    pub const fn root(&self) -> &ManifestValue {
        &self.root
    }

    /// Resolves an absolute path such as `/instance_groups/name=router/networks`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the path is malformed or does not resolve.
    pub fn path(&self, raw: &str) -> Result<&ManifestValue, ResolveError> {
        resolve_str(&self.root, raw)
    }

    /// Narrows the manifest to one job of one instance group.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the group or job is absent.
    pub fn find_instance_group_job(
        &self,
        instance_group: &str,
        job: &str,
    ) -> Result<JobView<'_>, ResolveError> {
        let path = PropertyPath::from_segments(vec![
            PathSegment::key("instance_groups"),
            PathSegment::predicate("name", instance_group),
            PathSegment::key("jobs"),
            PathSegment::predicate("name", job),
        ]);
        let node = resolve(&self.root, &path)?;
        Ok(JobView {
            instance_group: instance_group.to_string(),
            name: job.to_string(),
            node,
        })
    }

    /// Lists instance group names in manifest order.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when `instance_groups` is absent or not a
    /// sequence.
    pub fn instance_group_names(&self) -> Result<Vec<&str>, ResolveError> {
        let path = PropertyPath::from_segments(vec![PathSegment::key("instance_groups")]);
        let groups = resolve(&self.root, &path)?;
        let items = groups.as_sequence().map_err(|_| ResolveError::TypeMismatch {
            at: PropertyPath::root(),
            segment: PathSegment::key("instance_groups"),
            expected: ValueKind::Sequence,
            found: groups.kind(),
        })?;
        Ok(items
            .iter()
            .filter_map(|group| group.get("name").and_then(|name| name.as_str().ok()))
            .collect())
    }

    /// Serializes the manifest back to YAML.
    ///
    /// # Errors
    ///
    /// Returns the YAML emitter error when serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        self.root.to_yaml_string()
    }
}

// ============================================================================
// SECTION: Job View
// ============================================================================

/// Borrowed view of a single job inside a [`Manifest`].
#[derive(Debug, Clone)]
pub struct JobView<'a> {
    /// Owning instance group name.
    instance_group: String,
    /// Job name.
    name: String,
    /// Job node.
    node: &'a ManifestValue,
}

impl<'a> JobView<'a> {
    /// Returns the instance group this job was found in.
    #[must_use]
    pub fn instance_group(&self) -> &str {
        &self.instance_group
    }

    /// Returns the job name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the job node itself.
    #[must_use]
    pub const fn node(&self) -> &'a ManifestValue {
        self.node
    }

    /// Resolves `relative` under the job's `properties` key.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the path is malformed or does not resolve.
    pub fn property(&self, relative: &str) -> Result<&'a ManifestValue, ResolveError> {
        let relative = PropertyPath::parse(relative)?;
        let path = PropertyPath::from_segments(vec![PathSegment::key("properties")]).join(&relative);
        resolve(self.node, &path)
    }

    /// Resolves `relative` directly under the job node, e.g. `/consumes/database`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the path is malformed or does not resolve.
    pub fn path(&self, relative: &str) -> Result<&'a ManifestValue, ResolveError> {
        resolve_str(self.node, relative)
    }
}
