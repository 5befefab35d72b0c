//! Sidechain RPC Provider - alloy-rs Connection Management
//!
//! Connects to the sidechain RPC with the trading wallet attached, so
//! contract calls built on this provider are signed and sent locally.
//! Validates the chain ID at startup against the network config.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::config::ChainConfig;

/// Wallet-backed provider shared by the chain adapters.
///
/// Type-erased to `DynProvider` so the filler stack does not leak into
/// adapter signatures.
#[derive(Clone)]
pub struct SidechainProvider {
    provider: DynProvider,
    /// Address the attached wallet sends from.
    owner: Address,
}

impl SidechainProvider {
    /// Connect to `config.rpc_url` and require `expected_chain_id`.
    #[instrument(skip_all, fields(expected_chain_id = expected_chain_id))]
    pub async fn connect(
        config: &ChainConfig,
        expected_chain_id: u64,
        signer: PrivateKeySigner,
    ) -> Result<Self> {
        let owner = signer.address();
        let url = config.rpc_url.parse().context("Invalid RPC URL")?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        if chain_id != expected_chain_id {
            anyhow::bail!("Expected chain_id={expected_chain_id}, RPC reports {chain_id}");
        }

        info!(chain_id, owner = %owner, "Connected to sidechain RPC");

        Ok(Self { provider, owner })
    }

    /// Shared handle to the type-erased provider.
    pub fn inner(&self) -> DynProvider {
        self.provider.clone()
    }

    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Lightweight liveness probe.
    pub async fn is_healthy(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }
}
