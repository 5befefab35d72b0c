//! Chain Adapters - Sidechain Interaction Layer
//!
//! Provides on-chain access via alloy-rs for:
//! - RPC provider management with the trading wallet attached
//! - ERC-20 approval of the protocol's token transfer proxy

pub mod approvals;
pub mod provider;

pub use approvals::Erc20Approver;
pub use provider::SidechainProvider;
