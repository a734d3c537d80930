// crates/token-sale-harness/src/deadline.rs
// ============================================================================
// Module: Test Deadlines
// Description: Per-test bounded wait budgets.
// Purpose: Cancel pending calls once a test exceeds its budget.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! A [`TestDeadline`] is created when a test begins. Every awaited operation
//! run through it shares the same absolute expiry; once it passes, the pending
//! future is dropped and the call fails with
//! [`HarnessError::DeadlineExceeded`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio::time::timeout_at;
use tracing::warn;

use crate::error::HarnessError;

// ============================================================================
// SECTION: Deadline
// ============================================================================

/// Absolute expiry shared by all calls of one test.
#[derive(Debug, Clone)]
pub struct TestDeadline {
    /// Test name used in diagnostics.
    name: String,
    /// Total budget.
    budget: Duration,
    /// Absolute expiry instant.
    expires_at: Instant,
}

impl TestDeadline {
    /// Starts a deadline of `budget` from now.
    #[must_use]
    pub fn start(name: impl Into<String>, budget: Duration) -> Self {
        Self {
            name: name.into(),
            budget,
            expires_at: Instant::now() + budget,
        }
    }

    /// Test name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total budget.
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Time left before expiry; zero once expired.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Returns true once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Runs `future` until it completes or the deadline passes.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::DeadlineExceeded`] on expiry, otherwise the
    /// future's own error.
    pub async fn run<T, F>(&self, operation: &str, future: F) -> Result<T, HarnessError>
    where
        F: Future<Output = Result<T, HarnessError>>,
    {
        match timeout_at(self.expires_at, future).await {
            Ok(result) => result,
            Err(_) => {
                warn!(test = %self.name, operation, budget = ?self.budget, "deadline exceeded");
                Err(HarnessError::DeadlineExceeded {
                    operation: format!("{}: {operation}", self.name),
                    budget: self.budget,
                })
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
