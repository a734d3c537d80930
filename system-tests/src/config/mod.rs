// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Environment-backed settings for the end-to-end suites.
// Purpose: Provide typed access to run-root and timeout overrides.
// Dependencies: std
// ============================================================================

//! ## Overview
//! System-test configuration is read from environment variables and mapped into
//! a small typed structure for reuse across test helpers. Harness settings
//! (images, ports, keys) come from `token-sale-harness` configuration instead.

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

pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
