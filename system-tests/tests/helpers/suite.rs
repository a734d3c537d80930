// system-tests/tests/helpers/suite.rs
// ============================================================================
// Module: Suite Startup
// Description: Loads harness configuration and starts a suite for one test.
// Purpose: Keep config resolution identical across system-test binaries.
// Dependencies: token-sale-harness
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use token_sale_harness::HarnessConfig;
use token_sale_harness::HarnessError;
use token_sale_harness::IntegrationSuite;
use token_sale_harness::telemetry::init_test_logging;

use super::timeouts::resolve_timeout;

/// Workspace root, one level above this crate.
fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).parent().map_or_else(PathBuf::new, Path::to_path_buf)
}

/// Harness configuration with a relative contracts dir resolved against the
/// workspace root and the per-test budget floored by the environment.
pub fn system_config() -> Result<HarnessConfig, HarnessError> {
    let mut config = HarnessConfig::load()?;
    if config.contracts_dir.is_relative() {
        config.contracts_dir = workspace_root().join(&config.contracts_dir);
    }
    config.timeouts.test_secs = resolve_timeout(config.timeouts.test()).as_secs();
    Ok(config)
}

/// Bootstraps contracts and starts containers for one test.
pub async fn start_suite() -> Result<IntegrationSuite, HarnessError> {
    init_test_logging();
    IntegrationSuite::setup(system_config()?).await
}
