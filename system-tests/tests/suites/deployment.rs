// system-tests/tests/suites/deployment.rs
// ============================================================================
// Module: Deployment Tests
// Description: Token, stable asset, and sale deployed in dependency order.
// Purpose: Confirm each contract is mined in its own later block with code.
// Dependencies: system-tests helpers
// ============================================================================

//! Deployment tests against a live Anvil container.

use std::time::Duration;

use helpers::artifacts::TestReporter;
use helpers::suite::start_suite;
use serde_json::json;
use token_sale_harness::HarnessError;
use token_sale_harness::RpcProbe;
use token_sale_harness::Scenario;
use token_sale_harness::scenarios::DeploymentScenario;
use token_sale_harness::scenarios::check_deployment;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn contracts_deploy_in_dependency_order() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("contracts_deploy_in_dependency_order")?;
    let mut suite = start_suite().await?;

    let outcome = async {
        let system = suite.deploy_contracts().await?.clone();
        check_deployment("contracts_deploy_in_dependency_order", &system)?;

        let probe = RpcProbe::new(suite.stack()?.chain().endpoint(), Duration::from_secs(10))?;
        let mut notes = Vec::new();
        for contract in system.in_order() {
            let code = probe.call("eth_getCode", json!([contract.address, "latest"])).await?;
            let code = code.as_str().unwrap_or_default();
            assert!(code.len() > 2, "{} has no code at {}", contract.label, contract.address);
            notes.push(format!("{} at {}", contract.label, contract.address));
        }

        let blocks: Vec<u64> =
            system.in_order().iter().filter_map(|contract| contract.block_number).collect();
        assert_eq!(blocks.len(), 3, "every receipt carries a block number");
        assert!(blocks.windows(2).all(|pair| pair[0] < pair[1]), "blocks: {blocks:?}");
        Ok::<_, HarnessError>((system, notes))
    }
    .await;

    suite.teardown().await?;
    let (system, notes) = outcome?;
    reporter.artifacts().write_json("deployment.json", &system)?;
    reporter.finish("pass", notes, vec!["deployment.json".to_string()])?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn deployment_scenario_runs_twice_on_one_chain() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("deployment_scenario_runs_twice_on_one_chain")?;
    let suite = start_suite().await?;

    let scenarios: Vec<Box<dyn Scenario>> =
        vec![Box::new(DeploymentScenario), Box::new(DeploymentScenario)];
    let report = suite.run(&scenarios).await;
    reporter.finish_with_report(&report)?;
    assert!(report.all_passed(), "report: {report:?}");
    Ok(())
}
