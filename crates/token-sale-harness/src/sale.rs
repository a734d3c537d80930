// crates/token-sale-harness/src/sale.rs
// ============================================================================
// Module: Purchase Flow
// Description: Sale terms and purchase-flow transaction assembly.
// Purpose: Encode the funding and configuration calls of a token sale.
// Dependencies: alloy-dyn-abi, alloy-primitives, alloy-rpc-types
// ============================================================================

//! ## Overview
//! The purchase flow funds the sale with the stable asset and configures the
//! sale window. [`PurchaseFlow::assemble`] encodes both calls against the
//! deployed artifacts' ABIs and builds the legacy configuration transaction.
//! The transaction is returned for inspection only; nothing here submits it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::Address;
use alloy_primitives::Bytes;
use alloy_primitives::U256;
use alloy_rpc_types::TransactionRequest;
use serde::Serialize;

use crate::artifact::DeploymentArtifact;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tokens per unit of stable asset.
pub const DEFAULT_RATE: u64 = 10;

/// Seconds the sale window opens before assembly.
pub const START_OFFSET_SECS: u64 = 10;

/// Seconds the sale window stays open after assembly.
pub const END_OFFSET_SECS: u64 = 1000;

/// Gas limit of the configuration transaction.
pub const CONFIGURE_GAS_LIMIT: u64 = 800_000;

/// Gas price of the configuration transaction (1 gwei).
pub const CONFIGURE_GAS_PRICE: u128 = 1_000_000_000;

/// `100000 * 10^18`.
#[must_use]
pub fn default_hard_cap() -> U256 {
    U256::from(100_000u64) * U256::from(10u64).pow(U256::from(18u64))
}

/// `1000 * 10^6`, one thousand units of a six-decimal stable asset.
#[must_use]
pub fn default_funding() -> U256 {
    U256::from(1_000u64) * U256::from(1_000_000u64)
}

// ============================================================================
// SECTION: Terms
// ============================================================================

/// Parameters of `configureSale(rate, hardCap, start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleTerms {
    /// Tokens per unit of stable asset.
    pub rate: U256,
    /// Maximum tokens sold.
    pub hard_cap: U256,
    /// Sale start, unix seconds.
    pub start: u64,
    /// Sale end, unix seconds.
    pub end: u64,
}

impl SaleTerms {
    /// Default terms with a window around `now` (unix seconds).
    #[must_use]
    pub fn starting_at(now: u64) -> Self {
        Self {
            rate: U256::from(DEFAULT_RATE),
            hard_cap: default_hard_cap(),
            start: now.saturating_sub(START_OFFSET_SECS),
            end: now.saturating_add(END_OFFSET_SECS),
        }
    }

    /// Default terms around the current wall-clock time.
    #[must_use]
    pub fn from_now() -> Self {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_secs());
        Self::starting_at(now)
    }

    /// Rejects a zero rate or cap and an empty window.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Scenario`] describing the violation.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.rate.is_zero() {
            return Err(HarnessError::scenario("sale-terms", "rate must be positive"));
        }
        if self.hard_cap.is_zero() {
            return Err(HarnessError::scenario("sale-terms", "hard cap must be positive"));
        }
        if self.end <= self.start {
            return Err(HarnessError::scenario("sale-terms", "sale must end after it starts"));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Flow
// ============================================================================

/// Encoded purchase-flow calls and the unsent configuration transaction.
#[derive(Debug, Clone)]
pub struct PurchaseFlow {
    /// `transfer(sale, funding)` on the stable asset.
    funding_call: Bytes,
    /// `configureSale(rate, hardCap, start, end)` on the sale.
    configure_call: Bytes,
    /// Legacy transaction carrying `configure_call`.
    transaction: TransactionRequest,
}

impl PurchaseFlow {
    /// Encodes the funding call against the stable-asset ABI and the
    /// configuration call against the sale ABI, then builds the
    /// configuration transaction (nonce 0, value 0, 800000 gas at 1 gwei).
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Scenario`] for invalid terms and
    /// [`HarnessError::Artifact`] when an ABI lacks the function or rejects the
    /// arguments.
    pub fn assemble(
        stable_asset: &DeploymentArtifact,
        sale: &DeploymentArtifact,
        sale_address: Address,
        terms: &SaleTerms,
        funding: U256,
    ) -> Result<Self, HarnessError> {
        terms.validate()?;
        let funding_call = stable_asset.encode_call(
            "transfer",
            &[DynSolValue::Address(sale_address), DynSolValue::Uint(funding, 256)],
        )?;
        let configure_call = sale.encode_call(
            "configureSale",
            &[
                DynSolValue::Uint(terms.rate, 256),
                DynSolValue::Uint(terms.hard_cap, 256),
                DynSolValue::Uint(U256::from(terms.start), 256),
                DynSolValue::Uint(U256::from(terms.end), 256),
            ],
        )?;
        let mut transaction = TransactionRequest::default()
            .to(sale_address)
            .value(U256::ZERO)
            .input(configure_call.clone().into());
        transaction.nonce = Some(0);
        transaction.gas = Some(CONFIGURE_GAS_LIMIT);
        transaction.gas_price = Some(CONFIGURE_GAS_PRICE);
        transaction.transaction_type = Some(0);
        Ok(Self {
            funding_call,
            configure_call,
            transaction,
        })
    }

    /// Encoded `transfer` call.
    #[must_use]
    pub const fn funding_call(&self) -> &Bytes {
        &self.funding_call
    }

    /// Encoded `configureSale` call.
    #[must_use]
    pub const fn configure_call(&self) -> &Bytes {
        &self.configure_call
    }

    /// Unsent configuration transaction.
    #[must_use]
    pub const fn transaction(&self) -> &TransactionRequest {
        &self.transaction
    }
}
