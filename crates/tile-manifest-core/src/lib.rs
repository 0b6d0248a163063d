// crates/tile-manifest-core/src/lib.rs
// ============================================================================
// Module: Tile Manifest Core
// Description: Manifest value model, property paths, and path resolution.
// Purpose: Provide the read-only query layer over rendered BOSH manifests.
// Dependencies: serde, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! Rendered tile manifests are decoded into a [`ManifestValue`] tree and
//! queried with [`PropertyPath`]s such as
//! `route_registrar/routes/name=api/tls_port`. [`Manifest`] adds the
//! instance-group/job narrowing used by acceptance tests.
//! Invariants:
//! - Lookups never mutate the document.
//! - Malformed paths fail at parse time with [`PathSyntaxError`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod manifest;
pub mod path;
pub mod resolve;
pub mod value;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use manifest::JobView;
pub use manifest::Manifest;
pub use manifest::ManifestParseError;
pub use path::PathSegment;
pub use path::PathSyntaxError;
pub use path::PropertyPath;
pub use resolve::ResolveError;
pub use resolve::resolve;
pub use resolve::resolve_str;
pub use value::ManifestValue;
pub use value::ValueError;
pub use value::ValueKind;
pub use value::ValueMapping;
