// crates/token-sale-harness/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed overrides for the harness configuration.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 or empty values fail closed. The parsing
//! helpers are public so the system-test crate applies the same rules to its
//! own keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use super::model::HarnessConfig;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Optional TOML config file.
    ConfigPath,
    /// Hardhat project root override.
    ContractsDir,
    /// External chain endpoint; skips the chain container.
    RpcUrl,
    /// External database URL; skips the database container.
    DatabaseUrl,
    /// Chain image as `name:tag`.
    AnvilImage,
    /// Database image as `name:tag`.
    PostgresImage,
    /// Per-test timeout in seconds (positive integer).
    TestTimeoutSeconds,
    /// Dump container logs from scenarios (`true`/`false` or `1`/`0`).
    PrintContainerLogs,
}

impl HarnessEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "TOKEN_SALE_CONFIG",
            Self::ContractsDir => "TOKEN_SALE_CONTRACTS_DIR",
            Self::RpcUrl => "TOKEN_SALE_RPC_URL",
            Self::DatabaseUrl => "TOKEN_SALE_DATABASE_URL",
            Self::AnvilImage => "TOKEN_SALE_ANVIL_IMAGE",
            Self::PostgresImage => "TOKEN_SALE_POSTGRES_IMAGE",
            Self::TestTimeoutSeconds => "TOKEN_SALE_TEST_TIMEOUT_SEC",
            Self::PrintContainerLogs => "TOKEN_SALE_PRINT_CONTAINER_LOGS",
        }
    }

    /// Every recognized key.
    pub const ALL: [Self; 8] = [
        Self::ConfigPath,
        Self::ContractsDir,
        Self::RpcUrl,
        Self::DatabaseUrl,
        Self::AnvilImage,
        Self::PostgresImage,
        Self::TestTimeoutSeconds,
        Self::PrintContainerLogs,
    ];
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Applies environment overrides on top of `config`.
pub(super) fn apply_overrides(config: &mut HarnessConfig) -> Result<(), String> {
    if let Some(dir) = read_env_nonempty(HarnessEnv::ContractsDir.as_str())? {
        config.contracts_dir = PathBuf::from(dir);
    }
    if let Some(url) = read_env_nonempty(HarnessEnv::RpcUrl.as_str())? {
        config.chain.rpc_url = Some(url);
    }
    if let Some(url) = read_env_nonempty(HarnessEnv::DatabaseUrl.as_str())? {
        config.database.url = Some(url);
    }
    if let Some(image) = read_env_nonempty(HarnessEnv::AnvilImage.as_str())? {
        let (name, tag) = split_image_ref(HarnessEnv::AnvilImage.as_str(), &image)?;
        config.chain.image = name;
        config.chain.tag = tag;
    }
    if let Some(image) = read_env_nonempty(HarnessEnv::PostgresImage.as_str())? {
        let (name, tag) = split_image_ref(HarnessEnv::PostgresImage.as_str(), &image)?;
        config.database.image = name;
        config.database.tag = tag;
    }
    if let Some(raw) = read_env_nonempty(HarnessEnv::TestTimeoutSeconds.as_str())? {
        config.timeouts.test_secs =
            parse_timeout_seconds(HarnessEnv::TestTimeoutSeconds.as_str(), &raw)?;
    }
    if let Some(raw) = read_env_nonempty(HarnessEnv::PrintContainerLogs.as_str())? {
        config.print_container_logs = parse_bool(HarnessEnv::PrintContainerLogs.as_str(), &raw)?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values. Surrounding
/// whitespace is trimmed.
///
/// # Errors
///
/// Returns an error when the value is invalid UTF-8, empty, or whitespace.
pub fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses a positive number of seconds.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
pub fn parse_timeout_seconds(name: &str, raw: &str) -> Result<u64, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(secs)
}

/// Parses `true`/`false`/`1`/`0`.
///
/// # Errors
///
/// Returns an error for any other literal.
pub fn parse_bool(name: &str, raw: &str) -> Result<bool, String> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}

/// Splits `repo/name:tag` into name and tag; registry ports are preserved.
fn split_image_ref(name: &str, raw: &str) -> Result<(String, String), String> {
    let last_slash = raw.rfind('/').map_or(0, |idx| idx + 1);
    match raw[last_slash ..].rfind(':') {
        Some(offset) => {
            let split = last_slash + offset;
            let (image, tag) = (&raw[.. split], &raw[split + 1 ..]);
            if image.is_empty() || tag.is_empty() {
                return Err(format!("{name} must look like name:tag"));
            }
            Ok((image.to_string(), tag.to_string()))
        }
        None => Ok((raw.to_string(), "latest".to_string())),
    }
}
