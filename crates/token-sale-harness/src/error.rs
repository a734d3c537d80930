// crates/token-sale-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Error taxonomy for the integration harness.
// Purpose: Keep deadline, protocol, artifact, and setup failures distinct.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every harness operation returns [`HarnessError`]. Setup failures are fatal
//! for the suite; the harness never retries. Deadline expiry is reported as
//! [`HarnessError::DeadlineExceeded`] so callers can tell a slow endpoint apart
//! from a protocol-level failure such as a non-200 response.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

use crate::artifact::ArtifactError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the token sale harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration could not be loaded or failed validation.
    #[error("harness config error: {0}")]
    Config(String),
    /// Dependency install or contract compilation failed.
    #[error("bootstrap {step} failed: {message}")]
    Bootstrap {
        /// Bootstrap step that failed (`install` or `compile`).
        step: &'static str,
        /// Failure detail, including captured process output.
        message: String,
    },
    /// Docker is not reachable from the test process.
    #[error("docker unavailable: {0}")]
    DockerUnavailable(String),
    /// A container could not be started, inspected, or removed.
    #[error("container error: {0}")]
    Container(String),
    /// A readiness probe did not succeed within its budget.
    #[error("readiness probe failed: {0}")]
    Readiness(String),
    /// A compiled-contract artifact could not be used.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    /// Transport or chain client failure.
    #[error("rpc transport error: {0}")]
    Rpc(String),
    /// The endpoint answered with a non-200 HTTP status.
    #[error("rpc endpoint returned http {status}: {body}")]
    RpcStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// The endpoint answered 200 with a body that is not a JSON-RPC result.
    #[error("rpc response malformed: {0}")]
    RpcShape(String),
    /// The endpoint answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    RpcError {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },
    /// A deployment transaction failed or produced an unusable receipt.
    #[error("deployment of {contract} failed: {reason}")]
    Deployment {
        /// Label of the contract being deployed.
        contract: String,
        /// Failure detail.
        reason: String,
    },
    /// An operation outlived its per-test budget.
    #[error("deadline exceeded for {operation} after {}ms", budget.as_millis())]
    DeadlineExceeded {
        /// Operation that was cancelled.
        operation: String,
        /// Budget that expired.
        budget: Duration,
    },
    /// A scenario assertion failed.
    #[error("scenario {scenario} failed: {message}")]
    Scenario {
        /// Scenario name.
        scenario: String,
        /// Assertion detail.
        message: String,
    },
}

impl HarnessError {
    /// Returns true when the error is a per-test deadline expiry.
    #[must_use]
    pub const fn is_deadline(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }

    /// Builds a scenario assertion failure.
    pub fn scenario(scenario: &str, message: impl Into<String>) -> Self {
        Self::Scenario {
            scenario: scenario.to_string(),
            message: message.into(),
        }
    }
}

/// Result alias for harness operations.
pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
