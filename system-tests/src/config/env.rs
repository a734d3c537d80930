// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Read system-test keys with the harness's strict env parsing.
// Dependencies: token-sale-harness
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement. Invalid or
//! empty values fail the load instead of falling back to defaults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use token_sale_harness::config::parse_bool;
use token_sale_harness::config::parse_timeout_seconds;
use token_sale_harness::config::read_env_nonempty;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional artifact root override.
    RunRoot,
    /// Optional minimum per-test budget in seconds (positive integer).
    TimeoutSeconds,
    /// Keep containers' logs in the artifacts (`true`/`false` or `1`/`0`).
    CaptureLogs,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "TOKEN_SALE_SYSTEM_TEST_RUN_ROOT",
            Self::TimeoutSeconds => "TOKEN_SALE_SYSTEM_TEST_TIMEOUT_SEC",
            Self::CaptureLogs => "TOKEN_SALE_SYSTEM_TEST_CAPTURE_LOGS",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional artifact root override.
    pub run_root: Option<PathBuf>,
    /// Optional minimum per-test budget.
    pub timeout: Option<Duration>,
    /// Write container logs next to each summary.
    pub capture_logs: bool,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation.
    pub fn load() -> Result<Self, String> {
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?
            .map(Duration::from_secs);
        let capture_logs = parse_bool_env(
            SystemTestEnv::CaptureLogs.as_str(),
            read_env_nonempty(SystemTestEnv::CaptureLogs.as_str())?,
        )?;
        Ok(Self {
            run_root,
            timeout,
            capture_logs,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a boolean flag; unset means false.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    raw.map_or(Ok(false), |value| parse_bool(name, &value))
}
