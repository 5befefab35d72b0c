//! Signer - Domain-separated Signatures for Orders, Fills, Cancels
//!
//! Hashes each payload under the configured EIP-712 domain and asks the
//! signing key for a signature. Every signature is checked by address
//! recovery before it leaves this module, so a misbehaving key can
//! never hand the relayer a garbage signature.

use std::sync::Arc;

use alloy::primitives::{Address, B256, Signature};
use tracing::{debug, instrument};

use crate::domain::eip712::{SigningDomain, recover_signer};
use crate::domain::errors::{Result, SportxError};
use crate::domain::fill::Fill;
use crate::domain::order::{Order, SignedOrder};
use crate::ports::signing::SigningKey;

pub struct OrderSigner<K: SigningKey> {
  key: Arc<K>,
  domain: SigningDomain,
}

impl<K: SigningKey> OrderSigner<K> {
  pub const fn new(key: Arc<K>, domain: SigningDomain) -> Self {
    Self { key, domain }
  }

  /// Address of the held key.
  pub fn address(&self) -> Address {
    self.key.address()
  }

  pub const fn domain(&self) -> &SigningDomain {
    &self.domain
  }

  async fn sign_digest(&self, digest: B256) -> Result<Signature> {
    let signature = self.key.sign_hash(digest).await?;
    let recovered = recover_signer(digest, &signature)?;
    let expected = self.address();
    if recovered != expected {
      return Err(SportxError::SigningUnavailable(format!(
        "key at {expected} produced a signature recovering to {recovered}"
      )));
    }
    Ok(signature)
  }

  /// Sign `order` as its maker.
  ///
  /// # Errors
  /// `SigningUnavailable` when the order names another maker or the key
  /// fails.
  #[instrument(skip_all, fields(market = %order.market_hash, maker = %order.maker))]
  pub async fn sign_order(&self, order: Order) -> Result<SignedOrder> {
    if order.maker != self.address() {
      return Err(SportxError::SigningUnavailable(format!(
        "order maker {} is not the held key {}",
        order.maker,
        self.address()
      )));
    }
    let digest = order.order_struct_hash(&self.domain);
    let signature = self.sign_digest(digest).await?;
    debug!(order_hash = %digest, "Order signed");
    SignedOrder::new(order, signature, &self.domain)
  }

  /// Sign a cancellation of `order_hashes` carrying `message`.
  ///
  /// # Errors
  /// `SigningUnavailable` when the key fails.
  #[instrument(skip_all, fields(orders = order_hashes.len()))]
  pub async fn sign_cancellation(&self, message: &str, order_hashes: &[B256]) -> Result<Signature> {
    self
      .sign_digest(self.domain.cancellation_digest(message, order_hashes))
      .await
  }

  /// Sign the taker commitment for `fill`.
  ///
  /// # Errors
  /// `SigningUnavailable` when the key fails.
  #[instrument(skip_all, fields(orders = fill.order_hashes.len()))]
  pub async fn sign_fill(&self, fill: &Fill) -> Result<Signature> {
    let digest = self.domain.digest(&fill.typed(self.address()));
    self.sign_digest(digest).await
  }
}
