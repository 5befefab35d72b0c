//! Signing Port - Opaque Key Capability
//!
//! The core never sees key material. It hands over a 32-byte digest
//! and gets back a recoverable signature.

use alloy::primitives::{Address, B256, Signature};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SigningError {
  /// Key store, HSM or remote signer could not be used.
  #[error("signer unavailable: {0}")]
  Unavailable(String),
}

/// Holder of the maker/taker private key.
#[async_trait]
pub trait SigningKey: Send + Sync + 'static {
  /// Sign a prehashed 32-byte digest, returning `r || s || v`.
  async fn sign_hash(&self, hash: B256) -> Result<Signature, SigningError>;

  /// Address of the held key.
  fn address(&self) -> Address;
}
