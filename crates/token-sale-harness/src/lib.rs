// crates/token-sale-harness/src/lib.rs
// ============================================================================
// Module: Token Sale Harness Library
// Description: Integration harness for the token sale contract system.
// Purpose: Bootstrap contracts, run devnet containers, deploy, and probe.
// Dependencies: alloy, testcontainers, reqwest, tokio, tracing
// ============================================================================

//! ## Overview
//! The harness drives a strictly sequential integration run:
//! bootstrap → start containers → compile → deploy → run scenario → tear down.
//!
//! - [`bootstrap`] installs the Hardhat project dependencies and compiles it.
//! - [`containers`] starts Anvil and Postgres on a private Docker network.
//! - [`artifact`] and [`deployer`] parse Hardhat artifacts and deploy them in
//!   dependency order through a signing provider.
//! - [`rpc`] and [`sale`] back the scenarios: raw JSON-RPC probes and the
//!   purchase-flow transaction assembly.
//! - [`suite`] owns the suite-scoped resources and per-test deadlines.
//!
//! Every failure is fatal and surfaces as a [`HarnessError`]; nothing is
//! retried by the harness itself.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod artifact;
pub mod bootstrap;
pub mod config;
pub mod containers;
pub mod deadline;
pub mod deployer;
pub mod error;
pub mod rpc;
pub mod sale;
pub mod scenarios;
pub mod suite;
pub mod telemetry;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use artifact::ArtifactError;
pub use artifact::DeploymentArtifact;
pub use bootstrap::BootstrapAction;
pub use bootstrap::ContractProject;
pub use config::HarnessConfig;
pub use config::HarnessEnv;
pub use containers::ContainerKind;
pub use containers::ContainerStack;
pub use containers::NetworkEndpoint;
pub use deadline::TestDeadline;
pub use deployer::DeployedContract;
pub use deployer::DeployedSystem;
pub use deployer::Deployer;
pub use deployer::DeploymentPlan;
pub use error::HarnessError;
pub use rpc::RpcProbe;
pub use rpc::RpcReply;
pub use sale::PurchaseFlow;
pub use sale::SaleTerms;
pub use scenarios::Scenario;
pub use suite::IntegrationSuite;
pub use suite::ScenarioOutcome;
pub use suite::SuiteReport;
