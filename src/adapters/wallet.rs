//! Local Key Signer - In-process secp256k1 Key
//!
//! Implements the `SigningKey` port with an alloy `PrivateKeySigner`.
//! The key comes from the `SPORTX_PRIVATE_KEY` environment variable and
//! is never read from config files or logged.

use alloy::primitives::{Address, B256, Signature};
use alloy::signers::Signer;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ports::signing::{SigningError, SigningKey};

/// Environment variable holding the hex private key.
pub const PRIVATE_KEY_ENV: &str = "SPORTX_PRIVATE_KEY";

#[derive(Clone)]
pub struct LocalKeySigner {
    inner: PrivateKeySigner,
}

impl LocalKeySigner {
    /// Load the key from `SPORTX_PRIVATE_KEY`.
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(PRIVATE_KEY_ENV).context("SPORTX_PRIVATE_KEY not set")?;
        Self::from_hex(&raw)
    }

    /// Parse a hex private key, with or without `0x`.
    pub fn from_hex(raw: &str) -> Result<Self> {
        let inner: PrivateKeySigner = raw
            .trim()
            .parse()
            .context("Invalid private key")?;
        Ok(Self { inner })
    }

    /// Underlying alloy signer, for wiring into the chain provider.
    pub fn alloy_signer(&self) -> PrivateKeySigner {
        self.inner.clone()
    }
}

impl std::fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeySigner")
            .field("address", &self.inner.address())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SigningKey for LocalKeySigner {
    async fn sign_hash(&self, hash: B256) -> Result<Signature, SigningError> {
        self.inner
            .sign_hash(&hash)
            .await
            .map_err(|e| SigningError::Unavailable(e.to_string()))
    }

    fn address(&self) -> Address {
        self.inner.address()
    }
}
