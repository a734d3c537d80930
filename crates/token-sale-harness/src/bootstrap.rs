// crates/token-sale-harness/src/bootstrap.rs
// ============================================================================
// Module: Environment Bootstrapper
// Description: Dependency install and compilation for the contract project.
// Purpose: Guarantee compiled artifacts exist before deployment.
// Dependencies: tokio::process, tracing
// ============================================================================

//! ## Overview
//! The contract project is a Hardhat workspace. Dependencies are installed only
//! when the configured marker (`node_modules/hardhat` by default) is missing;
//! compilation always runs. Any failure is fatal for the run because every
//! later step depends on the generated artifacts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::process::Output;

use tokio::process::Command;
use tracing::debug;
use tracing::info;

use crate::config::ToolchainConfig;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of [`ContractProject::ensure_dependencies`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapAction {
    /// Dependencies were missing and have been installed.
    Installed,
    /// Dependencies were already present; nothing ran.
    AlreadyPresent,
}

impl BootstrapAction {
    /// Stable snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::AlreadyPresent => "already_present",
        }
    }
}

/// Located contract project with its toolchain commands.
#[derive(Debug, Clone)]
pub struct ContractProject {
    /// Absolute project root.
    root: PathBuf,
    /// Install/compile commands.
    toolchain: ToolchainConfig,
}

impl ContractProject {
    /// Resolves `dir` to an absolute project root.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Bootstrap`] when the directory does not exist.
    pub fn locate(dir: &Path, toolchain: ToolchainConfig) -> Result<Self, HarnessError> {
        let root = dir.canonicalize().map_err(|err| HarnessError::Bootstrap {
            step: "locate",
            message: format!("contract project {} not found: {err}", dir.display()),
        })?;
        if !root.is_dir() {
            return Err(HarnessError::Bootstrap {
                step: "locate",
                message: format!("{} is not a directory", root.display()),
            });
        }
        Ok(Self {
            root,
            toolchain,
        })
    }

    /// Absolute project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns true when the dependency marker exists.
    #[must_use]
    pub fn dependencies_installed(&self) -> bool {
        self.root.join(&self.toolchain.dependency_marker).exists()
    }

    /// Installs dependencies when the marker is missing.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Bootstrap`] when the install command cannot be
    /// spawned or exits unsuccessfully.
    pub async fn ensure_dependencies(&self) -> Result<BootstrapAction, HarnessError> {
        if self.dependencies_installed() {
            info!(
                root = %self.root.display(),
                marker = %self.toolchain.dependency_marker.display(),
                "contract dependencies found, skipping install"
            );
            return Ok(BootstrapAction::AlreadyPresent);
        }
        info!(root = %self.root.display(), "contract dependencies missing, installing");
        self.run("install", &self.toolchain.install).await?;
        Ok(BootstrapAction::Installed)
    }

    /// Compiles the contracts.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Bootstrap`] when compilation fails.
    pub async fn compile(&self) -> Result<(), HarnessError> {
        info!(root = %self.root.display(), "compiling contracts");
        self.run("compile", &self.toolchain.compile).await?;
        info!("contracts compiled");
        Ok(())
    }

    /// Hardhat artifact location for `contract`.
    #[must_use]
    pub fn artifact_path(&self, contract: &str) -> PathBuf {
        self.root
            .join("artifacts")
            .join("contracts")
            .join(format!("{contract}.sol"))
            .join(format!("{contract}.json"))
    }

    /// Runs one toolchain command in the project root.
    async fn run(&self, step: &'static str, command: &[String]) -> Result<Output, HarnessError> {
        let (program, args) = command.split_first().ok_or_else(|| HarnessError::Bootstrap {
            step,
            message: "command is empty".to_string(),
        })?;
        let output = Command::new(program)
            .args(args)
            .current_dir(&self.root)
            .output()
            .await
            .map_err(|err| HarnessError::Bootstrap {
                step,
                message: format!("failed to spawn {program}: {err}"),
            })?;
        debug!(
            step,
            stdout = %String::from_utf8_lossy(&output.stdout),
            stderr = %String::from_utf8_lossy(&output.stderr),
            "toolchain output"
        );
        if !output.status.success() {
            return Err(HarnessError::Bootstrap {
                step,
                message: format!(
                    "{} exited with {}: {}",
                    command.join(" "),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(output)
    }
}
