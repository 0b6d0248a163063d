// crates/tile-manifest-core/src/path.rs
// ============================================================================
// Module: Property Paths
// Description: Parsed slash-delimited property paths with predicate segments.
// Purpose: Reject malformed paths at construction instead of at lookup.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`PropertyPath`] is the parsed form of strings such as
//! `route_registrar/routes/name=api/tls_port`. Segments are either plain keys
//! or `field=value` predicates that select a sequence element.
//! Invariants:
//! - Segments are never empty.
//! - Predicate fields are never empty; predicate values may be.
//! - `~1` and `~0` are the only escapes, for `/` and `~` respectively.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Mapping key, or a zero-based position when applied to a sequence.
    Key(String),
    /// Selects the first sequence element whose `field` equals `value`.
    Predicate {
        /// Field looked up on each element.
        field: String,
        /// Expected scalar text of the field.
        value: String,
    },
}

impl PathSegment {
    /// Creates a key segment.
    #[must_use]
    pub fn key(name: impl Into<String>) -> Self {
        Self::Key(name.into())
    }

    /// Creates a predicate segment.
    #[must_use]
    pub fn predicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Predicate {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(name) => f.write_str(&escape(name)),
            Self::Predicate {
                field,
                value,
            } => write!(f, "{}={}", escape(field), escape(value)),
        }
    }
}

/// Parsed property path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    /// Segments in traversal order.
    segments: Vec<PathSegment>,
}

/// Path parsing failures.
///
/// # Invariants
/// - `index` is the zero-based position of the offending segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathSyntaxError {
    /// Two separators in a row, or a trailing separator.
    #[error("empty segment at position {index} in path `{path}`")]
    EmptySegment {
        /// Raw path text.
        path: String,
        /// Segment position.
        index: usize,
    },
    /// A predicate of the form `=value`.
    #[error("predicate without a field at position {index} in path `{path}`")]
    EmptyPredicateField {
        /// Raw path text.
        path: String,
        /// Segment position.
        index: usize,
    },
    /// A `~` not followed by `0` or `1`.
    #[error("invalid escape at position {index} in path `{path}`")]
    InvalidEscape {
        /// Raw path text.
        path: String,
        /// Segment position.
        index: usize,
    },
}

// ============================================================================
// SECTION: Construction
// ============================================================================

impl PropertyPath {
    /// Returns the empty path, which addresses the document root.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Builds a path from already-validated segments.
    #[must_use]
    pub const fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self {
            segments,
        }
    }

    /// Parses a path string. A leading `/` is optional; `""` and `"/"` are the root.
    ///
    /// # Errors
    ///
    /// Returns [`PathSyntaxError`] for empty segments, field-less predicates,
    /// or unknown `~` escapes.
    pub fn parse(raw: &str) -> Result<Self, PathSyntaxError> {
        let body = raw.strip_prefix('/').unwrap_or(raw);
        if body.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for (index, part) in body.split('/').enumerate() {
            segments.push(parse_segment(raw, index, part)?);
        }
        Ok(Self {
            segments,
        })
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self {
            segments,
        }
    }

    /// Returns a new path with all of `other`'s segments appended.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self {
            segments,
        }
    }

    /// Returns the path made of the first `len` segments.
    #[must_use]
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            segments: self.segments.iter().take(len).cloned().collect(),
        }
    }

    /// Returns the segments in traversal order.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns true when the path addresses the root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for PropertyPath {
    type Err = PathSyntaxError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses one raw segment.
fn parse_segment(raw: &str, index: usize, part: &str) -> Result<PathSegment, PathSyntaxError> {
    if part.is_empty() {
        return Err(PathSyntaxError::EmptySegment {
            path: raw.to_string(),
            index,
        });
    }
    let invalid_escape = || PathSyntaxError::InvalidEscape {
        path: raw.to_string(),
        index,
    };
    match part.split_once('=') {
        Some((field, value)) => {
            if field.is_empty() {
                return Err(PathSyntaxError::EmptyPredicateField {
                    path: raw.to_string(),
                    index,
                });
            }
            let field = unescape(field).ok_or_else(invalid_escape)?;
            let value = unescape(value).ok_or_else(invalid_escape)?;
            Ok(PathSegment::Predicate {
                field,
                value,
            })
        }
        None => unescape(part).map(PathSegment::Key).ok_or_else(invalid_escape),
    }
}

/// Decodes `~1` and `~0`; `None` on any other escape.
fn unescape(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(ch);
        }
    }
    Some(out)
}

/// Encodes `~` and `/` so the segment re-parses to itself.
fn escape(text: &str) -> String {
    text.replace('~', "~0").replace('/', "~1")
}
