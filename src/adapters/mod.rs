//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP client, blockchain RPC, local key).
//!
//! Adapter categories:
//! - `api`: relayer REST client
//! - `chain`: sidechain provider and ERC-20 approvals via alloy-rs
//! - `wallet`: in-process private key signer

pub mod api;
pub mod chain;
pub mod wallet;
