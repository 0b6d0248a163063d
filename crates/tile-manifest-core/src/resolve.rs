// crates/tile-manifest-core/src/resolve.rs
// ============================================================================
// Module: Property Path Resolver
// Description: Read-only traversal of manifest values by property path.
// Purpose: Locate values with errors that name the failing segment.
// Dependencies: crate::path, crate::value, thiserror
// ============================================================================

//! ## Overview
//! Resolution walks a [`ManifestValue`] one [`PathSegment`] at a time. It never
//! mutates the document, so repeated lookups are idempotent.
//! Invariants:
//! - Errors carry the consumed prefix (`at`) and the failing segment.
//! - Predicates select the first matching element only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::path::PathSegment;
use crate::path::PathSyntaxError;
use crate::path::PropertyPath;
use crate::value::ManifestValue;
use crate::value::ValueKind;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Path resolution failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The path string failed to parse.
    #[error("invalid property path: {0}")]
    InvalidPath(#[from] PathSyntaxError),
    /// Key absent, index out of range, or no predicate match.
    #[error("property not found: segment `{segment}` under `{at}`")]
    NotFound {
        /// Path consumed before the failing segment.
        at: PropertyPath,
        /// Segment that failed to match.
        segment: PathSegment,
    },
    /// The node at `at` cannot be navigated by `segment`.
    #[error("type mismatch at `{at}`: segment `{segment}` expects {expected}, found {found}")]
    TypeMismatch {
        /// Path consumed before the failing segment.
        at: PropertyPath,
        /// Segment that could not be applied.
        segment: PathSegment,
        /// Shape the segment needs.
        expected: ValueKind,
        /// Shape actually present.
        found: ValueKind,
    },
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves `path` against `document`.
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`] or [`ResolveError::TypeMismatch`] when a
/// segment cannot be applied.
pub fn resolve<'a>(
    document: &'a ManifestValue,
    path: &PropertyPath,
) -> Result<&'a ManifestValue, ResolveError> {
    let mut current = document;
    for (depth, segment) in path.segments().iter().enumerate() {
        current = step(current, segment).map_err(|failure| failure.at(path.prefix(depth), segment))?;
    }
    Ok(current)
}

/// Parses `raw` and resolves it against `document`.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidPath`] for malformed paths, otherwise the
/// errors of [`resolve`].
pub fn resolve_str<'a>(
    document: &'a ManifestValue,
    raw: &str,
) -> Result<&'a ManifestValue, ResolveError> {
    let path = PropertyPath::parse(raw)?;
    resolve(document, &path)
}

/// Why a single step failed, before location is attached.
enum StepFailure {
    /// Nothing matched.
    Missing,
    /// The node had the wrong shape.
    Shape {
        /// Shape the segment needs.
        expected: ValueKind,
        /// Shape actually present.
        found: ValueKind,
    },
}

impl StepFailure {
    /// Attaches the consumed prefix and failing segment.
    fn at(self, at: PropertyPath, segment: &PathSegment) -> ResolveError {
        match self {
            Self::Missing => ResolveError::NotFound {
                at,
                segment: segment.clone(),
            },
            Self::Shape {
                expected,
                found,
            } => ResolveError::TypeMismatch {
                at,
                segment: segment.clone(),
                expected,
                found,
            },
        }
    }
}

/// Applies one segment to one node.
fn step<'a>(
    current: &'a ManifestValue,
    segment: &PathSegment,
) -> Result<&'a ManifestValue, StepFailure> {
    match segment {
        PathSegment::Key(key) => match current {
            ManifestValue::Mapping(entries) => entries.get(key).ok_or(StepFailure::Missing),
            ManifestValue::Sequence(items) => {
                let position: usize = key.parse().map_err(|_| StepFailure::Shape {
                    expected: ValueKind::Mapping,
                    found: ValueKind::Sequence,
                })?;
                items.get(position).ok_or(StepFailure::Missing)
            }
            other => Err(StepFailure::Shape {
                expected: ValueKind::Mapping,
                found: other.kind(),
            }),
        },
        PathSegment::Predicate {
            field,
            value,
        } => {
            let ManifestValue::Sequence(items) = current else {
                return Err(StepFailure::Shape {
                    expected: ValueKind::Sequence,
                    found: current.kind(),
                });
            };
            items
                .iter()
                .find(|item| {
                    item.get(field).and_then(ManifestValue::scalar_text).as_deref()
                        == Some(value.as_str())
                })
                .ok_or(StepFailure::Missing)
        }
    }
}
