//! Chain Approval Port - ERC-20 Allowance Interface
//!
//! Authorizes the protocol's transfer proxy to move the wallet's base
//! tokens. Called once per token before trading, never per order.

use alloy::primitives::{Address, B256};
use async_trait::async_trait;

/// Result of an approval request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalReceipt {
  /// Hash of the approval transaction, when one was sent.
  pub tx_hash: Option<B256>,
  /// Allowance was already sufficient; nothing was sent.
  pub already_approved: bool,
}

impl ApprovalReceipt {
  pub const fn skipped() -> Self {
    Self {
      tx_hash: None,
      already_approved: true,
    }
  }

  pub const fn sent(tx_hash: B256) -> Self {
    Self {
      tx_hash: Some(tx_hash),
      already_approved: false,
    }
  }
}

/// On-chain allowance management via alloy.
#[async_trait]
pub trait ChainApproval: Send + Sync + 'static {
  /// Approve `spender` to move `token` on behalf of the wallet.
  ///
  /// # Errors
  /// Returns error if the RPC call or the transaction fails.
  async fn approve(&self, token: Address, spender: Address) -> anyhow::Result<ApprovalReceipt>;
}
