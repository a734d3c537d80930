// system-tests/tests/suites/chain_rpc.rs
// ============================================================================
// Module: Chain RPC Tests
// Description: Readiness of both containers and a raw eth_blockNumber.
// Purpose: Fail fast when the container stack itself is broken.
// Dependencies: system-tests helpers
// ============================================================================

//! Smoke tests for the container stack. A launched chain simulator must
//! expose its container id and bridge IP.

use std::time::Duration;

use helpers::artifacts::TestReporter;
use helpers::suite::start_suite;
use serde_json::json;
use token_sale_harness::ContainerKind;
use token_sale_harness::RpcProbe;
use token_sale_harness::Scenario;
use token_sale_harness::containers::wait_for_tcp;
use token_sale_harness::scenarios::ChainRpcScenario;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn chain_simulator_answers_block_number() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("chain_simulator_answers_block_number")?;
    let suite = start_suite().await?;

    let probe = RpcProbe::new(suite.stack()?.chain().endpoint(), Duration::from_secs(10))?;
    let reply = probe.send("eth_blockNumber", json!([])).await?;
    assert_eq!(reply.status, 200);
    let result = reply.body["result"].as_str().expect("result is a string");
    assert!(result.starts_with("0x"), "unexpected result {result}");

    let scenarios: Vec<Box<dyn Scenario>> = vec![Box::new(ChainRpcScenario)];
    let report = suite.run(&scenarios).await;
    reporter.finish_with_report(&report)?;
    assert!(report.all_passed(), "report: {report:?}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stack_exposes_reachable_endpoints() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("stack_exposes_reachable_endpoints")?;
    let mut suite = start_suite().await?;
    let launched = suite.config().chain.rpc_url.is_none();

    let outcome = async {
        let stack = suite.stack()?;
        wait_for_tcp(stack.chain().endpoint(), Duration::from_secs(5)).await?;
        wait_for_tcp(stack.database().endpoint(), Duration::from_secs(5)).await?;
        if launched {
            assert!(stack.network().is_some());
            assert!(stack.chain().network_alias().is_some());
            let container_id = stack.chain().container_id().unwrap_or_default();
            assert!(!container_id.is_empty(), "launched chain has no container id");
            let bridge_ip = stack.chain().bridge_ip().await?;
            assert!(bridge_ip.is_some(), "launched chain has no bridge ip");
            let logs = stack.logs(ContainerKind::Chain).await?;
            assert!(logs.contains("Listening on"), "anvil logs: {logs}");
        }
        let written = reporter.artifacts().capture_container_logs(stack).await;
        Ok::<_, token_sale_harness::HarnessError>(written)
    }
    .await;

    suite.teardown().await?;
    let written = outcome?;
    reporter.finish("pass", vec!["chain and database reachable".to_string()], written)?;
    Ok(())
}
