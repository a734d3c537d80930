// crates/token-sale-harness/src/deployer.rs
// ============================================================================
// Module: Contract Deployer
// Description: Ordered deployment of the token sale contracts.
// Purpose: Submit creation transactions and wait for their receipts.
// Dependencies: alloy-provider, alloy-network, alloy-signer-local, tokio
// ============================================================================

//! ## Overview
//! Deployment is strictly sequential: token, then the mock stable asset, then
//! the sale contract whose constructor takes `(stable asset, token)`. Each
//! step waits for its receipt before the next one is sent.
//!
//! All three artifacts are parsed by [`DeploymentPlan::load`] and their
//! constructor encodings checked by [`DeploymentPlan::execute`] before the
//! first transaction leaves the process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use alloy_dyn_abi::DynSolValue;
use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_primitives::B256;
use alloy_primitives::TxKind;
use alloy_primitives::U256;
use alloy_provider::DynProvider;
use alloy_provider::Provider;
use alloy_provider::ProviderBuilder;
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use serde::Serialize;
use tracing::info;
use url::Url;

use crate::artifact::DeploymentArtifact;
use crate::bootstrap::ContractProject;
use crate::config::ContractCatalog;
use crate::containers::NetworkEndpoint;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Records
// ============================================================================

/// One confirmed deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedContract {
    /// Role in the system (`token`, `stable_asset`, `sale`).
    pub label: String,
    /// Contract address from the receipt.
    pub address: Address,
    /// Creation transaction hash.
    pub transaction_hash: B256,
    /// Block the creation was mined in.
    pub block_number: Option<u64>,
}

/// The three contracts of a deployed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedSystem {
    /// Sale token.
    pub token: DeployedContract,
    /// Mock stable asset accepted as payment.
    pub stable_asset: DeployedContract,
    /// Sale contract.
    pub sale: DeployedContract,
}

impl DeployedSystem {
    /// Contracts in the order they were deployed.
    #[must_use]
    pub const fn in_order(&self) -> [&DeployedContract; 3] {
        [&self.token, &self.stable_asset, &self.sale]
    }
}

// ============================================================================
// SECTION: Deployer
// ============================================================================

/// Signing client bound to one chain.
#[derive(Clone)]
pub struct Deployer {
    /// Signing provider.
    provider: DynProvider,
    /// Deploying account.
    account: Address,
    /// Verified chain id.
    chain_id: u64,
    /// Budget for each send-and-confirm.
    confirmation: Duration,
}

impl fmt::Debug for Deployer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deployer")
            .field("account", &self.account)
            .field("chain_id", &self.chain_id)
            .field("confirmation", &self.confirmation)
            .finish_non_exhaustive()
    }
}

impl Deployer {
    /// Connects to `endpoint` with `private_key` and checks the chain id.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] for an invalid key or URL or when the
    /// endpoint reports a different chain id, [`HarnessError::Rpc`] when the
    /// chain id cannot be read, and
    /// [`HarnessError::DeadlineExceeded`] when the endpoint does not answer in
    /// time.
    pub async fn connect(
        endpoint: &NetworkEndpoint,
        private_key: &str,
        expected_chain_id: u64,
        confirmation: Duration,
    ) -> Result<Self, HarnessError> {
        let signer = PrivateKeySigner::from_str(private_key.trim())
            .map_err(|err| HarnessError::Config(format!("invalid deployer key: {err}")))?;
        let account = signer.address();
        let url = Url::parse(&endpoint.http_url())
            .map_err(|err| HarnessError::Config(format!("invalid rpc url {endpoint}: {err}")))?;
        let provider =
            ProviderBuilder::new().wallet(EthereumWallet::from(signer)).connect_http(url).erased();

        let chain_id = tokio::time::timeout(confirmation, provider.get_chain_id())
            .await
            .map_err(|_| HarnessError::DeadlineExceeded {
                operation: "eth_chainId".to_string(),
                budget: confirmation,
            })?
            .map_err(|err| HarnessError::Rpc(format!("eth_chainId failed: {err}")))?;
        if chain_id != expected_chain_id {
            return Err(HarnessError::Config(format!(
                "chain id mismatch at {endpoint}: expected {expected_chain_id}, got {chain_id}"
            )));
        }
        info!(endpoint = %endpoint, chain_id, account = %account, "deployer connected");
        Ok(Self {
            provider,
            account,
            chain_id,
            confirmation,
        })
    }

    /// Deploying account.
    #[must_use]
    pub const fn account(&self) -> Address {
        self.account
    }

    /// Verified chain id.
    #[must_use]
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Underlying provider.
    #[must_use]
    pub const fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Deploys `artifact` with `args` and waits for the receipt.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Artifact`] when the arguments do not encode,
    /// [`HarnessError::DeadlineExceeded`] when the receipt does not arrive in
    /// time, and [`HarnessError::Deployment`] for send failures, reverted
    /// receipts, or missing addresses.
    pub async fn deploy(
        &self,
        label: &str,
        artifact: &DeploymentArtifact,
        args: &[DynSolValue],
    ) -> Result<DeployedContract, HarnessError> {
        let code = artifact.deploy_code(args)?;
        let mut tx = TransactionRequest::default().input(code.into()).value(U256::ZERO);
        tx.from = Some(self.account);
        tx.to = Some(TxKind::Create);

        info!(contract = label, artifact = artifact.name(), "sending deployment");
        let failure = |reason: String| HarnessError::Deployment {
            contract: label.to_string(),
            reason,
        };
        let receipt = tokio::time::timeout(self.confirmation, async {
            let pending = self
                .provider
                .send_transaction(tx)
                .await
                .map_err(|err| failure(format!("send failed: {err}")))?;
            pending.get_receipt().await.map_err(|err| failure(format!("receipt failed: {err}")))
        })
        .await
        .map_err(|_| HarnessError::DeadlineExceeded {
            operation: format!("deploy {label}"),
            budget: self.confirmation,
        })??;

        if !receipt.status() {
            return Err(failure(format!("transaction {} reverted", receipt.transaction_hash)));
        }
        let address = receipt
            .contract_address
            .ok_or_else(|| failure("no contract address in receipt".to_string()))?;
        if address == Address::ZERO {
            return Err(failure("receipt reports the zero address".to_string()));
        }
        info!(
            contract = label,
            address = %address,
            tx_hash = %receipt.transaction_hash,
            block = ?receipt.block_number,
            "contract deployed"
        );
        Ok(DeployedContract {
            label: label.to_string(),
            address,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
        })
    }
}

// ============================================================================
// SECTION: Plan
// ============================================================================

/// Parsed artifacts for the three deployment steps.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    /// Sale token artifact.
    token: DeploymentArtifact,
    /// Mock stable-asset artifact.
    stable_asset: DeploymentArtifact,
    /// Sale artifact.
    sale: DeploymentArtifact,
}

impl DeploymentPlan {
    /// Reads all three artifacts from the compiled project.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Artifact`] when any artifact is missing or
    /// malformed.
    pub fn load(project: &ContractProject, catalog: &ContractCatalog) -> Result<Self, HarnessError> {
        Ok(Self::new(
            DeploymentArtifact::load(&project.artifact_path(&catalog.token))?,
            DeploymentArtifact::load(&project.artifact_path(&catalog.stable_asset))?,
            DeploymentArtifact::load(&project.artifact_path(&catalog.sale))?,
        ))
    }

    /// Builds a plan from already parsed artifacts.
    #[must_use]
    pub const fn new(
        token: DeploymentArtifact,
        stable_asset: DeploymentArtifact,
        sale: DeploymentArtifact,
    ) -> Self {
        Self {
            token,
            stable_asset,
            sale,
        }
    }

    /// Sale token artifact.
    #[must_use]
    pub const fn token(&self) -> &DeploymentArtifact {
        &self.token
    }

    /// Mock stable-asset artifact.
    #[must_use]
    pub const fn stable_asset(&self) -> &DeploymentArtifact {
        &self.stable_asset
    }

    /// Sale artifact.
    #[must_use]
    pub const fn sale(&self) -> &DeploymentArtifact {
        &self.sale
    }

    /// Checks every constructor encoding without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Artifact`] when a constructor does not accept
    /// the arguments the plan will pass.
    pub fn preflight(&self) -> Result<(), HarnessError> {
        self.token.deploy_code(&[])?;
        self.stable_asset.deploy_code(&[])?;
        self.sale.deploy_code(&sale_constructor_args(Address::ZERO, Address::ZERO))?;
        Ok(())
    }

    /// Deploys token, stable asset, and sale in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`HarnessError`] encountered; later steps are not
    /// attempted.
    pub async fn execute(&self, deployer: &Deployer) -> Result<DeployedSystem, HarnessError> {
        self.preflight()?;
        let token = deployer.deploy("token", &self.token, &[]).await?;
        let stable_asset = deployer.deploy("stable_asset", &self.stable_asset, &[]).await?;
        let sale = deployer
            .deploy("sale", &self.sale, &sale_constructor_args(stable_asset.address, token.address))
            .await?;
        Ok(DeployedSystem {
            token,
            stable_asset,
            sale,
        })
    }
}

/// `TokenSale(stableAsset, token)` constructor arguments.
fn sale_constructor_args(stable_asset: Address, token: Address) -> [DynSolValue; 2] {
    [DynSolValue::Address(stable_asset), DynSolValue::Address(token)]
}
