// acceptance-tests/src/config/mod.rs
// ============================================================================
// Module: Acceptance Test Configuration
// Description: Centralized configuration for tile acceptance tests.
// Purpose: Provide typed access to test environment settings and defaults.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Acceptance-test configuration is read from environment variables and mapped
//! into a small typed structure for reuse across test helpers.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::AcceptanceTestConfig;
pub use env::AcceptanceTestEnv;
