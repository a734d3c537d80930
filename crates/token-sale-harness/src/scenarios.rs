// crates/token-sale-harness/src/scenarios.rs
// ============================================================================
// Module: Test Scenarios
// Description: Scenario trait and the built-in token sale scenarios.
// Purpose: Exercise a running suite under a per-test deadline.
// Dependencies: async-trait, serde_json, tracing
// ============================================================================

//! ## Overview
//! A [`Scenario`] runs against a set-up [`IntegrationSuite`]. Every awaited
//! network call goes through the scenario's [`TestDeadline`], so a stalled
//! endpoint fails that scenario with
//! [`HarnessError::DeadlineExceeded`] instead of hanging the suite.
//!
//! Built-ins:
//! - [`ChainRpcScenario`]: raw `eth_blockNumber` answers 200 with a `result`,
//!   and a launched simulator reports its container id.
//! - [`DeploymentScenario`]: a fresh ordered deployment yields three distinct
//!   non-zero addresses.
//! - [`PurchaseFlowScenario`]: the purchase-flow transaction assembles against
//!   the deployed sale.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use alloy_primitives::Address;
use alloy_primitives::TxKind;
use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use tracing::info;
use tracing::warn;

use crate::containers::ContainerKind;
use crate::deadline::TestDeadline;
use crate::deployer::DeployedSystem;
use crate::error::HarnessError;
use crate::rpc::RpcProbe;
use crate::rpc::parse_quantity;
use crate::sale::PurchaseFlow;
use crate::sale::SaleTerms;
use crate::sale::default_funding;
use crate::suite::IntegrationSuite;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// One named test case run against a suite.
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Stable scenario name used in reports.
    fn name(&self) -> &str;

    /// Runs the scenario; any error fails it.
    async fn run(&self, suite: &IntegrationSuite, deadline: &TestDeadline)
    -> Result<(), HarnessError>;
}

// ============================================================================
// SECTION: Chain RPC
// ============================================================================

/// Posts a raw `eth_blockNumber` and checks status and shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainRpcScenario;

#[async_trait]
impl Scenario for ChainRpcScenario {
    fn name(&self) -> &str {
        "chain_rpc"
    }

    async fn run(
        &self,
        suite: &IntegrationSuite,
        deadline: &TestDeadline,
    ) -> Result<(), HarnessError> {
        let name = self.name();
        let endpoint = suite.stack()?.chain().endpoint();
        let probe = RpcProbe::new(endpoint, deadline.remaining())?;
        let reply =
            deadline.run("eth_blockNumber", probe.send("eth_blockNumber", json!([]))).await?;
        info!(endpoint = %endpoint, status = reply.status, body = %reply.body, "rpc response");
        if reply.status != 200 {
            return Err(HarnessError::scenario(
                name,
                format!("expected http 200, got {}", reply.status),
            ));
        }
        let Some(result) = reply.body.get("result").and_then(Value::as_str) else {
            return Err(HarnessError::scenario(name, format!("body lacks result: {}", reply.body)));
        };
        let height = parse_quantity(result)?;
        let chain_id = deadline.run("eth_chainId", probe.chain_id()).await?;
        let expected = suite.config().chain.chain_id;
        if chain_id != expected {
            return Err(HarnessError::scenario(
                name,
                format!("expected chain id {expected}, got {chain_id}"),
            ));
        }
        info!(height, chain_id, "chain simulator answered");

        if suite.config().chain.rpc_url.is_none() {
            let chain = suite.stack()?.chain();
            let Some(container_id) = chain.container_id().filter(|id| !id.is_empty()) else {
                return Err(HarnessError::scenario(name, "chain simulator has no container id"));
            };
            let bridge_ip = deadline.run("inspect chain container", chain.bridge_ip()).await?;
            info!(
                container_id,
                bridge_ip = %bridge_ip.map_or_else(|| "unknown".to_string(), |ip| ip.to_string()),
                "chain simulator container"
            );
        }

        if suite.config().print_container_logs {
            match suite.stack()?.logs(ContainerKind::Chain).await {
                Ok(logs) => info!(logs = %logs, "chain simulator logs"),
                Err(err) => warn!(error = %err, "chain simulator logs unavailable"),
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Deployment
// ============================================================================

/// Deploys a fresh system and checks order and addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentScenario;

#[async_trait]
impl Scenario for DeploymentScenario {
    fn name(&self) -> &str {
        "deployment"
    }

    async fn run(
        &self,
        suite: &IntegrationSuite,
        deadline: &TestDeadline,
    ) -> Result<(), HarnessError> {
        let system = deadline.run("deploy", suite.deploy_fresh()).await?;
        check_deployment(self.name(), &system)
    }
}

/// Asserts labels follow the dependency order and addresses are distinct and
/// non-zero.
///
/// # Errors
///
/// Returns [`HarnessError::Scenario`] on the first violation.
pub fn check_deployment(scenario: &str, system: &DeployedSystem) -> Result<(), HarnessError> {
    let labels = system.in_order().map(|contract| contract.label.as_str());
    if labels != ["token", "stable_asset", "sale"] {
        return Err(HarnessError::scenario(scenario, format!("unexpected order {}", labels.join(", "))));
    }
    let mut seen = BTreeSet::new();
    for contract in system.in_order() {
        if contract.address == Address::ZERO {
            return Err(HarnessError::scenario(
                scenario,
                format!("{} deployed at the zero address", contract.label),
            ));
        }
        if !seen.insert(contract.address) {
            return Err(HarnessError::scenario(
                scenario,
                format!("{} reuses address {}", contract.label, contract.address),
            ));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Purchase Flow
// ============================================================================

/// Assembles the purchase-flow transaction against a deployed sale.
#[derive(Debug, Clone, Copy, Default)]
pub struct PurchaseFlowScenario;

#[async_trait]
impl Scenario for PurchaseFlowScenario {
    fn name(&self) -> &str {
        "purchase_flow"
    }

    async fn run(
        &self,
        suite: &IntegrationSuite,
        deadline: &TestDeadline,
    ) -> Result<(), HarnessError> {
        let name = self.name();
        let system = match suite.deployed() {
            Some(system) => system.clone(),
            None => deadline.run("deploy", suite.deploy_fresh()).await?,
        };
        let plan = suite.load_plan()?;
        let flow = PurchaseFlow::assemble(
            plan.stable_asset(),
            plan.sale(),
            system.sale.address,
            &SaleTerms::from_now(),
            default_funding(),
        )?;
        let tx = flow.transaction();
        if tx.to != Some(TxKind::Call(system.sale.address)) {
            return Err(HarnessError::scenario(name, "transaction is not addressed to the sale"));
        }
        if tx.nonce != Some(0) {
            return Err(HarnessError::scenario(name, "transaction nonce is not zero"));
        }
        if flow.configure_call().len() != 4 + 4 * 32 || flow.funding_call().len() != 4 + 2 * 32 {
            return Err(HarnessError::scenario(name, "unexpected calldata length"));
        }
        info!(
            sale = %system.sale.address,
            calldata_bytes = flow.configure_call().len(),
            "purchase flow assembled; transaction not submitted"
        );
        Ok(())
    }
}
