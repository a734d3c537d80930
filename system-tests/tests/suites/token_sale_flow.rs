// system-tests/tests/suites/token_sale_flow.rs
// ============================================================================
// Module: Token Sale Flow Tests
// Description: Purchase-flow assembly against a deployed sale.
// Purpose: Show the configuration transaction is built but never sent.
// Dependencies: system-tests helpers
// ============================================================================

//! Purchase-flow tests. The flow is assembled offline; the deployer's nonce
//! must not move while it runs.

use std::time::Duration;

use alloy_primitives::Address;
use alloy_primitives::TxKind;
use helpers::artifacts::TestReporter;
use helpers::suite::start_suite;
use serde_json::json;
use token_sale_harness::HarnessError;
use token_sale_harness::IntegrationSuite;
use token_sale_harness::PurchaseFlow;
use token_sale_harness::RpcProbe;
use token_sale_harness::SaleTerms;
use token_sale_harness::rpc::parse_quantity;
use token_sale_harness::sale::default_funding;
use token_sale_harness::scenarios::PurchaseFlowScenario;

use crate::helpers;

/// Deployer nonce at the latest block.
async fn nonce_of(probe: &RpcProbe, account: Address) -> Result<u64, HarnessError> {
    let raw = probe.call("eth_getTransactionCount", json!([account, "latest"])).await?;
    parse_quantity(raw.as_str().unwrap_or_default())
}

async fn assemble_against_deployment(
    suite: &mut IntegrationSuite,
) -> Result<Vec<String>, HarnessError> {
    let sale_address = suite.deploy_contracts().await?.sale.address;
    let account = suite.deployer().await?.account();
    let probe = RpcProbe::new(suite.stack()?.chain().endpoint(), Duration::from_secs(10))?;
    let before = nonce_of(&probe, account).await?;
    assert!(before >= 3, "deployer nonce {before} after three deployments");

    let plan = suite.load_plan()?;
    let flow = PurchaseFlow::assemble(
        plan.stable_asset(),
        plan.sale(),
        sale_address,
        &SaleTerms::from_now(),
        default_funding(),
    )?;
    assert_eq!(flow.transaction().to, Some(TxKind::Call(sale_address)));

    let outcome = suite.run_scenario(&PurchaseFlowScenario).await;
    assert!(outcome.passed, "purchase flow failed: {:?}", outcome.error);

    let after = nonce_of(&probe, account).await?;
    assert_eq!(before, after, "purchase flow must not submit transactions");
    Ok(vec![
        format!("sale at {sale_address}"),
        format!("configure calldata {} bytes", flow.configure_call().len()),
        format!("deployer nonce stayed at {after}"),
    ])
}

#[tokio::test(flavor = "multi_thread")]
async fn purchase_flow_is_assembled_not_submitted() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("purchase_flow_is_assembled_not_submitted")?;
    let mut suite = start_suite().await?;
    let outcome = assemble_against_deployment(&mut suite).await;
    suite.teardown().await?;
    reporter.finish("pass", outcome?, Vec::new())?;
    Ok(())
}
