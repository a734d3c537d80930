// crates/token-sale-harness/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Typed configuration for the token sale integration harness.
// Purpose: Layer defaults, an optional TOML file, and environment overrides.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is resolved in three layers: compiled-in defaults, an
//! optional TOML file named by `TOKEN_SALE_CONFIG`, then strict environment
//! overrides. The merged result is validated before use; invalid input fails
//! closed with [`crate::HarnessError::Config`].

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod model;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::HarnessEnv;
pub use env::parse_bool;
pub use env::parse_timeout_seconds;
pub use env::read_env_nonempty;
pub use env::read_env_strict;
pub use model::ANVIL_DEFAULT_PRIVATE_KEY;
pub use model::ChainConfig;
pub use model::ContractCatalog;
pub use model::DatabaseConfig;
pub use model::HarnessConfig;
pub use model::TimeoutConfig;
pub use model::ToolchainConfig;
