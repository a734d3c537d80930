// system-tests/src/lib.rs
// ============================================================================
// Module: Token Sale System Tests Library
// Description: Shared configuration for the end-to-end suites.
// Purpose: Give every system-test binary the same run-root and timeout knobs.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts configuration shared by the binaries in
//! `system-tests/tests`. The suites themselves drive
//! `token-sale-harness` against real Docker containers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
