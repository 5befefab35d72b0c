//! ERC-20 Approval Adapter - Transfer Proxy Allowances
//!
//! Authorizes the protocol's token transfer proxy to move the wallet's
//! base tokens. Approvals use max uint256 to avoid repeated
//! transactions and only go on-chain when the allowance is below
//! threshold.

use alloy::primitives::{Address, U256};
use alloy::sol;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, instrument};

use super::provider::SidechainProvider;
use crate::ports::chain::{ApprovalReceipt, ChainApproval};

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Minimum allowance before re-approval (1M tokens at 18 decimals).
const MIN_ALLOWANCE_THRESHOLD: u128 = 1_000_000 * 1_000_000_000_000_000_000;

/// Sends `approve(spender, uint256.max)` from the provider's wallet.
pub struct Erc20Approver {
    provider: SidechainProvider,
}

impl Erc20Approver {
    pub const fn new(provider: SidechainProvider) -> Self {
        Self { provider }
    }

    /// Current allowance granted by the wallet to `spender`.
    pub async fn allowance(&self, token: Address, spender: Address) -> Result<U256> {
        let erc20 = IERC20::new(token, self.provider.inner());
        erc20
            .allowance(self.provider.owner(), spender)
            .call()
            .await
            .context("Allowance query failed")
    }
}

#[async_trait]
impl ChainApproval for Erc20Approver {
    #[instrument(skip(self), fields(owner = %self.provider.owner()))]
    async fn approve(&self, token: Address, spender: Address) -> Result<ApprovalReceipt> {
        let current = self.allowance(token, spender).await?;
        if current >= U256::from(MIN_ALLOWANCE_THRESHOLD) {
            info!(token = %token, spender = %spender, "Allowance sufficient");
            return Ok(ApprovalReceipt::skipped());
        }

        info!(
            current = %current,
            token = %token,
            spender = %spender,
            "Submitting max approval"
        );

        let erc20 = IERC20::new(token, self.provider.inner());
        let tx_hash = erc20
            .approve(spender, U256::MAX)
            .send()
            .await
            .context("Approval transaction rejected")?
            .watch()
            .await
            .context("Approval transaction not confirmed")?;

        info!(tx_hash = %tx_hash, "Approval confirmed");
        Ok(ApprovalReceipt::sent(tx_hash))
    }
}
