// acceptance-tests/src/lib.rs
// ============================================================================
// Module: Tile Manifest Acceptance Tests Library
// Description: Shared configuration for acceptance test binaries.
// Purpose: Provide common settings for tile acceptance suites.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the acceptance test binaries
//! in `acceptance-tests/tests`, plus the `stub-ops-manifest` renderer those
//! binaries drive by default.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
