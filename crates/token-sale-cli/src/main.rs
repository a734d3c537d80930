// crates/token-sale-cli/src/main.rs
// ============================================================================
// Module: Token Sale CLI Entry Point
// Description: Command dispatcher for the token sale integration harness.
// Purpose: Bootstrap, probe, deploy, or hold a full devnet from the shell.
// Dependencies: clap, serde_json, thiserror, token-sale-harness, tokio.
// ============================================================================

//! ## Overview
//! `token-sale` exposes the harness steps individually so a developer can
//! reproduce a failing integration run by hand:
//! - `bootstrap` installs contract dependencies and compiles.
//! - `probe` sends a raw `eth_blockNumber`.
//! - `deploy` runs the ordered deployment against an existing endpoint.
//! - `up` starts the full stack, deploys, and holds until Ctrl-C.
//!
//! Machine-readable results go to stdout as JSON; logs go to stderr.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use thiserror::Error;
use token_sale_harness::ContractProject;
use token_sale_harness::DeployedSystem;
use token_sale_harness::Deployer;
use token_sale_harness::DeploymentPlan;
use token_sale_harness::HarnessConfig;
use token_sale_harness::HarnessError;
use token_sale_harness::IntegrationSuite;
use token_sale_harness::NetworkEndpoint;
use token_sale_harness::RpcProbe;
use token_sale_harness::telemetry;
use tracing::info;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "token-sale", version, about = "Token sale integration harness")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Install contract dependencies if missing, then compile.
    Bootstrap(ProjectArgs),
    /// Send a raw `eth_blockNumber` to an endpoint.
    Probe(ProbeCommand),
    /// Deploy token, stable asset, and sale to an existing endpoint.
    Deploy(DeployCommand),
    /// Start containers, deploy, print endpoints, and hold until Ctrl-C.
    Up(ProjectArgs),
}

/// Contract project selection.
#[derive(Args, Debug, Clone, Default)]
struct ProjectArgs {
    /// Hardhat project root (overrides `TOKEN_SALE_CONTRACTS_DIR`).
    #[arg(long, value_name = "DIR")]
    contracts_dir: Option<PathBuf>,
}

/// Arguments for `probe`.
#[derive(Args, Debug)]
struct ProbeCommand {
    /// JSON-RPC endpoint URL.
    #[arg(long, value_name = "URL")]
    rpc_url: String,
    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    timeout_secs: u64,
}

/// Arguments for `deploy`.
#[derive(Args, Debug)]
struct DeployCommand {
    /// JSON-RPC endpoint URL.
    #[arg(long, value_name = "URL")]
    rpc_url: String,
    /// Contract project selection.
    #[command(flatten)]
    project: ProjectArgs,
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// `probe` result.
#[derive(Debug, Serialize)]
struct ProbeOutput {
    /// Endpoint that answered.
    rpc_url: String,
    /// Reported block height.
    block_number: u64,
}

/// `up` result.
#[derive(Debug, Serialize)]
struct StackOutput<'a> {
    /// Host-visible chain RPC URL.
    rpc_url: String,
    /// Database connection URL.
    database_url: &'a str,
    /// Deployed contracts.
    contracts: &'a DeployedSystem,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper.
#[derive(Debug, Error)]
enum CliError {
    /// Harness operation failed.
    #[error(transparent)]
    Harness(#[from] HarnessError),
    /// Output could not be written or encoded.
    #[error("failed to write {stream}: {message}")]
    Output {
        /// Stream name.
        stream: &'static str,
        /// Failure detail.
        message: String,
    },
    /// Waiting for Ctrl-C failed.
    #[error("failed to wait for shutdown signal: {0}")]
    Signal(String),
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = telemetry::init_logging() {
        let _ = write_stderr_line(&err.to_string());
    }
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = write_stderr_line(&format!("error: {err}"));
            ExitCode::FAILURE
        }
    }
}

/// Executes the selected command.
async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Bootstrap(args) => command_bootstrap(&args).await,
        Commands::Probe(command) => command_probe(&command).await,
        Commands::Deploy(command) => command_deploy(&command).await,
        Commands::Up(args) => command_up(&args).await,
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Installs dependencies when missing and compiles.
async fn command_bootstrap(args: &ProjectArgs) -> CliResult<()> {
    let config = load_config(args)?;
    let project = ContractProject::locate(&config.contracts_dir, config.toolchain.clone())?;
    let action = project.ensure_dependencies().await?;
    project.compile().await?;
    write_stdout_line(&format!(
        "dependencies {}; {} compiled",
        action.as_str(),
        project.root().display()
    ))
}

/// Sends `eth_blockNumber` and prints the height.
async fn command_probe(command: &ProbeCommand) -> CliResult<()> {
    let probe = RpcProbe::with_url(&command.rpc_url, Duration::from_secs(command.timeout_secs))?;
    let block_number = probe.block_number().await?;
    write_json(&ProbeOutput {
        rpc_url: command.rpc_url.clone(),
        block_number,
    })
}

/// Deploys the three contracts to `--rpc-url`.
async fn command_deploy(command: &DeployCommand) -> CliResult<()> {
    let config = load_config(&command.project)?;
    let project = ContractProject::locate(&config.contracts_dir, config.toolchain.clone())?;
    let plan = DeploymentPlan::load(&project, &config.contracts)?;
    plan.preflight()?;
    let endpoint = NetworkEndpoint::from_url(&command.rpc_url)?;
    let deployer = Deployer::connect(
        &endpoint,
        &config.chain.deployer_key,
        config.chain.chain_id,
        config.timeouts.confirmation(),
    )
    .await?;
    let system = plan.execute(&deployer).await?;
    write_json(&system)
}

/// Runs the full suite setup and deployment, then holds until Ctrl-C.
async fn command_up(args: &ProjectArgs) -> CliResult<()> {
    let config = load_config(args)?;
    let mut suite = IntegrationSuite::setup(config).await?;
    let result = hold_stack(&mut suite).await;
    let teardown = suite.teardown().await;
    result?;
    teardown?;
    Ok(())
}

/// Deploys on a running suite, prints the stack, and waits for Ctrl-C.
async fn hold_stack(suite: &mut IntegrationSuite) -> CliResult<()> {
    suite.deploy_contracts().await?;
    let stack = suite.stack()?;
    let Some(contracts) = suite.deployed() else {
        return Err(CliError::Harness(HarnessError::Deployment {
            contract: "system".to_string(),
            reason: "deployment did not record contracts".to_string(),
        }));
    };
    write_json(&StackOutput {
        rpc_url: stack.chain().endpoint().http_url(),
        database_url: stack.database().connection_url(),
        contracts,
    })?;
    info!("stack is up; press Ctrl-C to tear down");
    tokio::signal::ctrl_c().await.map_err(|err| CliError::Signal(err.to_string()))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads layered configuration and applies CLI overrides.
fn load_config(args: &ProjectArgs) -> CliResult<HarnessConfig> {
    let mut config = HarnessConfig::load()?;
    if let Some(dir) = &args.contracts_dir {
        config.contracts_dir.clone_from(dir);
    }
    Ok(config)
}

/// Writes `value` as pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(|err| CliError::Output {
        stream: "stdout",
        message: err.to_string(),
    })?;
    write_stdout_line(&rendered)
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::Output {
        stream: "stdout",
        message: err.to_string(),
    })
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}
