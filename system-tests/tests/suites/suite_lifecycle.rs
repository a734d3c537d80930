// system-tests/tests/suites/suite_lifecycle.rs
// ============================================================================
// Module: Suite Lifecycle Tests
// Description: Full scenario runs, per-test deadlines, and teardown.
// Purpose: Prove failures stay contained and containers never outlive a run.
// Dependencies: system-tests helpers
// ============================================================================

//! Lifecycle tests for a whole suite run.

use std::time::Duration;

use async_trait::async_trait;
use helpers::artifacts::TestReporter;
use helpers::suite::start_suite;
use helpers::suite::system_config;
use token_sale_harness::HarnessError;
use token_sale_harness::IntegrationSuite;
use token_sale_harness::Scenario;
use token_sale_harness::TestDeadline;
use token_sale_harness::containers::wait_for_tcp;
use token_sale_harness::scenarios::ChainRpcScenario;
use token_sale_harness::scenarios::DeploymentScenario;
use token_sale_harness::scenarios::PurchaseFlowScenario;
use token_sale_harness::telemetry::init_test_logging;

use crate::helpers;

/// Sleeps for an hour under the test deadline.
struct HangingScenario;

#[async_trait]
impl Scenario for HangingScenario {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn run(
        &self,
        _suite: &IntegrationSuite,
        deadline: &TestDeadline,
    ) -> Result<(), HarnessError> {
        deadline
            .run("sleep", async {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
                Ok(())
            })
            .await
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn full_run_passes_and_releases_ports() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("full_run_passes_and_releases_ports")?;
    let suite = start_suite().await?;
    let launched = suite.config().chain.rpc_url.is_none();
    let chain_endpoint = suite.stack()?.chain().endpoint().clone();

    let scenarios: Vec<Box<dyn Scenario>> = vec![
        Box::new(ChainRpcScenario),
        Box::new(DeploymentScenario),
        Box::new(PurchaseFlowScenario),
    ];
    let report = suite.run(&scenarios).await;
    reporter.finish_with_report(&report)?;
    assert!(report.all_passed(), "report: {report:?}");

    if launched {
        let after = wait_for_tcp(&chain_endpoint, Duration::from_secs(2)).await;
        assert!(after.is_err(), "chain port {chain_endpoint} still open after teardown");
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn expired_deadline_fails_only_its_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("expired_deadline_fails_only_its_scenario")?;
    init_test_logging();
    let mut config = system_config()?;
    config.timeouts.test_secs = 2;
    let suite = IntegrationSuite::setup(config).await?;
    let launched = suite.config().chain.rpc_url.is_none();
    let chain_endpoint = suite.stack()?.chain().endpoint().clone();

    let scenarios: Vec<Box<dyn Scenario>> =
        vec![Box::new(HangingScenario), Box::new(ChainRpcScenario)];
    let report = suite.run(&scenarios).await;
    reporter.finish_with_report(&report)?;
    assert!(!report.all_passed());

    let [hanging, chain] = report.outcomes.as_slice() else {
        panic!("expected two outcomes, got {}", report.outcomes.len());
    };
    assert!(hanging.timed_out, "hanging outcome: {hanging:?}");
    assert!(hanging.elapsed_ms >= 2_000);
    assert!(chain.passed, "chain outcome: {chain:?}");
    assert!(report.teardown_error.is_none());

    if launched {
        let after = wait_for_tcp(&chain_endpoint, Duration::from_secs(2)).await;
        assert!(after.is_err(), "chain port {chain_endpoint} still open after a failed run");
    }
    Ok(())
}
