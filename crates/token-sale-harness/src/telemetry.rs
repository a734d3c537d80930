// crates/token-sale-harness/src/telemetry.rs
// ============================================================================
// Module: Telemetry
// Description: Tracing subscriber setup for the harness and its tests.
// Purpose: Route structured lifecycle events to stderr or the test writer.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! `RUST_LOG` wins when set; otherwise [`DEFAULT_FILTER`] applies.
//! Initialisation is idempotent: a second call leaves the first subscriber
//! in place.

use tracing_subscriber::EnvFilter;

use crate::error::HarnessError;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "token_sale_harness=info";

/// Builds the filter from `RUST_LOG` or [`DEFAULT_FILTER`].
fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a global stderr subscriber.
///
/// # Errors
///
/// Returns [`HarnessError::Config`] when another subscriber is already set.
pub fn init_logging() -> Result<(), HarnessError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| HarnessError::Config(format!("failed to install tracing subscriber: {err}")))
}

/// Installs a subscriber that writes through the test harness capture. Safe
/// to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt().with_env_filter(filter()).with_test_writer().try_init();
}
