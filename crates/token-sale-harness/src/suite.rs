// crates/token-sale-harness/src/suite.rs
// ============================================================================
// Module: Integration Suite
// Description: Suite-scoped resources and the scenario runner.
// Purpose: Run scenarios sequentially and always tear the stack down.
// Dependencies: futures, serde, tokio, tracing
// ============================================================================

//! ## Overview
//! [`IntegrationSuite::setup`] installs contract dependencies, starts the
//! container stack, and compiles the contracts. [`IntegrationSuite::run`]
//! executes scenarios one after another, each under a fresh
//! [`TestDeadline`], records a [`ScenarioOutcome`] per scenario (panics
//! included), and tears the stack down whatever the outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use std::time::Instant;

use futures::FutureExt;
use serde::Serialize;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::bootstrap::ContractProject;
use crate::config::HarnessConfig;
use crate::containers::ContainerStack;
use crate::deadline::TestDeadline;
use crate::deployer::DeployedSystem;
use crate::deployer::Deployer;
use crate::deployer::DeploymentPlan;
use crate::error::HarnessError;
use crate::scenarios::Scenario;

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioOutcome {
    /// Scenario name.
    pub name: String,
    /// True when the scenario returned `Ok`.
    pub passed: bool,
    /// True when the failure was a deadline expiry.
    pub timed_out: bool,
    /// Wall-clock time spent, in milliseconds.
    pub elapsed_ms: u128,
    /// Failure detail.
    pub error: Option<String>,
}

/// Outcomes of a suite run plus the teardown result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Per-scenario outcomes in run order.
    pub outcomes: Vec<ScenarioOutcome>,
    /// Teardown failure, if any.
    pub teardown_error: Option<String>,
}

impl SuiteReport {
    /// True when every scenario passed and teardown succeeded.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.teardown_error.is_none() && self.outcomes.iter().all(|outcome| outcome.passed)
    }

    /// Failed scenarios.
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed)
    }
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Suite-scoped harness resources.
#[derive(Debug)]
pub struct IntegrationSuite {
    /// Effective configuration.
    config: HarnessConfig,
    /// Compiled contract project.
    project: ContractProject,
    /// Running containers; `None` after teardown.
    stack: Option<ContainerStack>,
    /// Parsed artifacts, once loaded.
    plan: Option<DeploymentPlan>,
    /// Suite-level deployment, once performed.
    deployed: Option<DeployedSystem>,
}

impl IntegrationSuite {
    /// Bootstraps the project, starts containers, and compiles contracts.
    /// Containers started before a compile failure are removed.
    ///
    /// # Errors
    ///
    /// Returns the first [`HarnessError`] of any setup step.
    pub async fn setup(config: HarnessConfig) -> Result<Self, HarnessError> {
        let project = ContractProject::locate(&config.contracts_dir, config.toolchain.clone())?;
        let action = project.ensure_dependencies().await?;
        info!(action = action.as_str(), "contract dependencies ready");

        let stack = ContainerStack::start(&config).await?;
        if let Err(err) = project.compile().await {
            if let Err(teardown) = stack.teardown().await {
                warn!(error = %teardown, "teardown after failed compile also failed");
            }
            return Err(err);
        }
        Ok(Self::from_parts(config, project, Some(stack)))
    }

    /// Assembles a suite from already prepared parts. A suite without a
    /// stack can still run scenarios that do not touch containers.
    #[must_use]
    pub const fn from_parts(
        config: HarnessConfig,
        project: ContractProject,
        stack: Option<ContainerStack>,
    ) -> Self {
        Self {
            config,
            project,
            stack,
            plan: None,
            deployed: None,
        }
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Contract project.
    #[must_use]
    pub const fn project(&self) -> &ContractProject {
        &self.project
    }

    /// Running container stack.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Container`] after teardown.
    pub fn stack(&self) -> Result<&ContainerStack, HarnessError> {
        self.stack
            .as_ref()
            .ok_or_else(|| HarnessError::Container("suite already torn down".to_string()))
    }

    /// Suite-level deployment, when [`Self::deploy_contracts`] ran.
    #[must_use]
    pub const fn deployed(&self) -> Option<&DeployedSystem> {
        self.deployed.as_ref()
    }

    /// Cached plan, or the artifacts read fresh from the project.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Artifact`] when an artifact is unusable.
    pub fn load_plan(&self) -> Result<DeploymentPlan, HarnessError> {
        match &self.plan {
            Some(plan) => Ok(plan.clone()),
            None => DeploymentPlan::load(&self.project, &self.config.contracts),
        }
    }

    /// Connects a deployer to the chain simulator.
    ///
    /// # Errors
    ///
    /// See [`Deployer::connect`].
    pub async fn deployer(&self) -> Result<Deployer, HarnessError> {
        Deployer::connect(
            self.stack()?.chain().endpoint(),
            &self.config.chain.deployer_key,
            self.config.chain.chain_id,
            self.config.timeouts.confirmation(),
        )
        .await
    }

    /// Deploys a new system without recording it on the suite. Artifacts are
    /// parsed before the chain is contacted.
    ///
    /// # Errors
    ///
    /// Returns the first artifact, connection, or deployment failure.
    pub async fn deploy_fresh(&self) -> Result<DeployedSystem, HarnessError> {
        let plan = self.load_plan()?;
        plan.preflight()?;
        let deployer = self.deployer().await?;
        plan.execute(&deployer).await
    }

    /// Deploys the suite-level system and records it.
    ///
    /// # Errors
    ///
    /// See [`Self::deploy_fresh`].
    pub async fn deploy_contracts(&mut self) -> Result<&DeployedSystem, HarnessError> {
        let plan = DeploymentPlan::load(&self.project, &self.config.contracts)?;
        plan.preflight()?;
        let deployer = self.deployer().await?;
        let system = plan.execute(&deployer).await?;
        self.plan = Some(plan);
        Ok(self.deployed.insert(system))
    }

    /// Starts the deadline for one test.
    #[must_use]
    pub fn begin_test(&self, name: &str) -> TestDeadline {
        TestDeadline::start(name, self.config.timeouts.test())
    }

    /// Runs one scenario under its own deadline, catching panics.
    pub async fn run_scenario(&self, scenario: &dyn Scenario) -> ScenarioOutcome {
        let name = scenario.name().to_string();
        let deadline = self.begin_test(&name);
        info!(scenario = %name, budget = ?deadline.budget(), "scenario started");
        let started = Instant::now();
        let result = AssertUnwindSafe(scenario.run(self, &deadline)).catch_unwind().await;
        let elapsed = started.elapsed();
        let outcome = match result {
            Ok(Ok(())) => outcome(name, elapsed, None, false),
            Ok(Err(err)) => {
                let timed_out = err.is_deadline();
                outcome(name, elapsed, Some(err.to_string()), timed_out)
            }
            Err(payload) => outcome(name, elapsed, Some(panic_message(&*payload)), false),
        };
        if outcome.passed {
            info!(scenario = %outcome.name, elapsed_ms = outcome.elapsed_ms, "scenario passed");
        } else {
            error!(
                scenario = %outcome.name,
                error = outcome.error.as_deref().unwrap_or_default(),
                "scenario failed"
            );
        }
        outcome
    }

    /// Runs every scenario in order, then tears down regardless of outcome.
    pub async fn run(mut self, scenarios: &[Box<dyn Scenario>]) -> SuiteReport {
        let mut outcomes = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            outcomes.push(self.run_scenario(scenario.as_ref()).await);
        }
        let teardown_error = self.teardown().await.err().map(|err| err.to_string());
        SuiteReport {
            outcomes,
            teardown_error,
        }
    }

    /// Removes the containers. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Container`] when a removal fails.
    pub async fn teardown(&mut self) -> Result<(), HarnessError> {
        match self.stack.take() {
            Some(stack) => {
                info!("tearing down suite");
                stack.teardown().await
            }
            None => Ok(()),
        }
    }
}

/// Builds an outcome record.
fn outcome(
    name: String,
    elapsed: Duration,
    error: Option<String>,
    timed_out: bool,
) -> ScenarioOutcome {
    ScenarioOutcome {
        name,
        passed: error.is_none(),
        timed_out,
        elapsed_ms: elapsed.as_millis(),
        error,
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
