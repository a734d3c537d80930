// crates/token-sale-harness/src/config/model.rs
// ============================================================================
// Module: Harness Config Model
// Description: Serializable configuration structures and defaults.
// Purpose: Describe containers, contracts, toolchain, and timeouts.
// Dependencies: serde, toml
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use super::env;
use super::env::HarnessEnv;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Private key of the first pre-funded Anvil account.
pub const ANVIL_DEFAULT_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Chain id Anvil reports by default.
const ANVIL_CHAIN_ID: u64 = 31337;

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Top-level harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Root of the Hardhat project holding the contracts.
    pub contracts_dir: PathBuf,
    /// Chain simulator settings.
    pub chain: ChainConfig,
    /// Database container settings.
    pub database: DatabaseConfig,
    /// Artifact names for each deployment step.
    pub contracts: ContractCatalog,
    /// External commands used by the bootstrapper.
    pub toolchain: ToolchainConfig,
    /// Wait budgets.
    pub timeouts: TimeoutConfig,
    /// Dump container logs from scenarios that support it.
    pub print_container_logs: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            contracts_dir: PathBuf::from("smart-contracts"),
            chain: ChainConfig::default(),
            database: DatabaseConfig::default(),
            contracts: ContractCatalog::default(),
            toolchain: ToolchainConfig::default(),
            timeouts: TimeoutConfig::default(),
            print_container_logs: false,
        }
    }
}

/// Chain simulator (Anvil) settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainConfig {
    /// Image repository.
    pub image: String,
    /// Image tag.
    pub tag: String,
    /// Network alias of the container on the suite network.
    pub alias: String,
    /// RPC port inside the container.
    pub port: u16,
    /// Chain id the simulator is started with and deployments expect.
    pub chain_id: u64,
    /// Hex private key of the deploying account.
    pub deployer_key: String,
    /// External endpoint; when set no container is started.
    pub rpc_url: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            image: "ghcr.io/foundry-rs/foundry".to_string(),
            tag: "latest".to_string(),
            alias: "anvil".to_string(),
            port: 8545,
            chain_id: ANVIL_CHAIN_ID,
            deployer_key: ANVIL_DEFAULT_PRIVATE_KEY.to_string(),
            rpc_url: None,
        }
    }
}

/// Database container settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Image repository.
    pub image: String,
    /// Image tag.
    pub tag: String,
    /// Network alias of the container on the suite network.
    pub alias: String,
    /// Port inside the container.
    pub port: u16,
    /// Database user.
    pub user: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub name: String,
    /// External connection URL; when set no container is started.
    pub url: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            image: "postgres".to_string(),
            tag: "15-alpine".to_string(),
            alias: "postgres".to_string(),
            port: 5432,
            user: "token_sale".to_string(),
            password: "token_sale".to_string(),
            name: "token_sale".to_string(),
            url: None,
        }
    }
}

/// Artifact names for the three deployment steps.
///
/// The mock stable asset reuses the token artifact by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContractCatalog {
    /// Sale token artifact.
    pub token: String,
    /// Mock stable-asset artifact.
    pub stable_asset: String,
    /// Sale contract artifact.
    pub sale: String,
}

impl Default for ContractCatalog {
    fn default() -> Self {
        Self {
            token: "KaatingaToken".to_string(),
            stable_asset: "KaatingaToken".to_string(),
            sale: "TokenSale".to_string(),
        }
    }
}

/// External commands used by the bootstrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Dependency install command (program followed by arguments).
    pub install: Vec<String>,
    /// Compile command (program followed by arguments).
    pub compile: Vec<String>,
    /// Path relative to the project root whose presence means dependencies
    /// are installed.
    pub dependency_marker: PathBuf,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            install: vec!["npm".to_string(), "install".to_string()],
            compile: vec!["npx".to_string(), "hardhat".to_string(), "compile".to_string()],
            dependency_marker: PathBuf::from("node_modules").join("hardhat"),
        }
    }
}

/// Wait budgets, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Per-test budget for RPC calls.
    pub test_secs: u64,
    /// Budget for a container to become reachable.
    pub readiness_secs: u64,
    /// Budget for a deployment transaction to be mined.
    pub confirmation_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            test_secs: 10,
            readiness_secs: 60,
            confirmation_secs: 60,
        }
    }
}

impl TimeoutConfig {
    /// Per-test RPC budget.
    #[must_use]
    pub const fn test(&self) -> Duration {
        Duration::from_secs(self.test_secs)
    }

    /// Container readiness budget.
    #[must_use]
    pub const fn readiness(&self) -> Duration {
        Duration::from_secs(self.readiness_secs)
    }

    /// Deployment confirmation budget.
    #[must_use]
    pub const fn confirmation(&self) -> Duration {
        Duration::from_secs(self.confirmation_secs)
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl HarnessConfig {
    /// Loads configuration from defaults, the optional TOML file, and the
    /// environment, then validates it.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when the file cannot be read or parsed,
    /// an environment value is invalid, or validation fails.
    pub fn load() -> Result<Self, HarnessError> {
        let mut config = match env::read_env_nonempty(HarnessEnv::ConfigPath.as_str())
            .map_err(HarnessError::Config)?
        {
            Some(path) => Self::from_path(Path::new(&path))?,
            None => Self::default(),
        };
        env::apply_overrides(&mut config).map_err(HarnessError::Config)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML file. Missing keys fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when the file is unreadable or invalid.
    pub fn from_path(path: &Path) -> Result<Self, HarnessError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            HarnessError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
            .map_err(|err| HarnessError::Config(format!("{}: {err}", path.display())))
    }

    /// Parses TOML text. Missing keys fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] on malformed TOML or unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self, HarnessError> {
        toml::from_str(raw).map_err(|err| HarnessError::Config(err.to_string()))
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] describing the first violation.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.timeouts.test_secs == 0
            || self.timeouts.readiness_secs == 0
            || self.timeouts.confirmation_secs == 0
        {
            return Err(HarnessError::Config("timeouts must be greater than zero".to_string()));
        }
        if self.toolchain.install.is_empty() || self.toolchain.compile.is_empty() {
            return Err(HarnessError::Config("toolchain commands must not be empty".to_string()));
        }
        if self.chain.deployer_key.trim().is_empty() {
            return Err(HarnessError::Config("chain.deployer_key must not be empty".to_string()));
        }
        for (field, name) in [
            ("contracts.token", &self.contracts.token),
            ("contracts.stable_asset", &self.contracts.stable_asset),
            ("contracts.sale", &self.contracts.sale),
        ] {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                return Err(HarnessError::Config(format!(
                    "{field} must be a bare contract name"
                )));
            }
        }
        Ok(())
    }
}
