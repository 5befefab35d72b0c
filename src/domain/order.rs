//! Order model: intent, canonical encoding, signed and book orders.
//!
//! An `Order` is a plain value. Once it has been hashed and signed it is
//! only reachable through `SignedOrder`, which exposes no mutators; a
//! changed order has to go through `Order::reissue` and get a new salt.

use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::{Address, B256, Signature, U256, keccak256};
use alloy::sol_types::SolStruct;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::convert::{PercentageOdds, TokenAmount, odds_scale};
use super::eip712::{self, SigningDomain, recover_signer};
use super::errors::{Result, SportxError};

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Fresh 256-bit salt: millisecond timestamp in the high half, a random
/// UUID in the low half.
pub fn fresh_salt() -> U256 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    (U256::from(millis) << 128usize) | U256::from(Uuid::new_v4().as_u128())
}

/// Maker intent before the client stamps maker, fee address and salt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub market_hash: B256,
    pub base_token: Address,
    /// Maker's total risk in base-token units.
    pub total_bet_size: TokenAmount,
    /// Maker's implied probability for the outcome they back.
    pub percentage_odds: PercentageOdds,
    /// Unix seconds.
    pub expiry: u64,
    pub is_maker_betting_outcome_one: bool,
}

impl NewOrder {
    /// Local checks that need no collaborator.
    ///
    /// # Errors
    /// `InvalidAmount`, `InvalidOdds` or `ExpiryInPast`.
    pub fn validate(&self, now: u64) -> Result<()> {
        if self.total_bet_size.is_zero() {
            return Err(SportxError::InvalidAmount(
                "total bet size must be positive".into(),
            ));
        }
        if self.percentage_odds.is_zero() || self.percentage_odds >= odds_scale() {
            return Err(SportxError::InvalidOdds(format!(
                "{} is outside (0, 10^20)",
                self.percentage_odds
            )));
        }
        if self.expiry <= now {
            return Err(SportxError::ExpiryInPast {
                expiry: self.expiry,
                now,
            });
        }
        Ok(())
    }

    /// Build the full order with a fresh salt.
    pub fn into_order(self, maker: Address, relayer_fee_address: Address) -> Order {
        Order {
            market_hash: self.market_hash,
            base_token: self.base_token,
            total_bet_size: self.total_bet_size,
            percentage_odds: self.percentage_odds,
            is_maker_betting_outcome_one: self.is_maker_betting_outcome_one,
            expiry: self.expiry,
            salt: fresh_salt(),
            maker,
            relayer_fee_address,
        }
    }
}

/// Canonical maker order. Equality covers every field, salt included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    pub market_hash: B256,
    pub base_token: Address,
    pub total_bet_size: TokenAmount,
    pub percentage_odds: PercentageOdds,
    pub is_maker_betting_outcome_one: bool,
    pub expiry: u64,
    pub salt: U256,
    pub maker: Address,
    pub relayer_fee_address: Address,
}

impl Order {
    /// Typed-data view used for hashing.
    pub fn typed(&self) -> eip712::Order {
        eip712::Order {
            marketHash: self.market_hash,
            baseToken: self.base_token,
            totalBetSize: self.total_bet_size,
            percentageOdds: self.percentage_odds,
            expiry: U256::from(self.expiry),
            salt: self.salt,
            maker: self.maker,
            relayerFeeAddress: self.relayer_fee_address,
            isMakerBettingOutcomeOne: self.is_maker_betting_outcome_one,
        }
    }

    /// Type hash followed by one 32-byte word per field in declaration
    /// order. Independent of locale, map ordering and run.
    pub fn canonical_encode(&self) -> Vec<u8> {
        let typed = self.typed();
        let data = typed.eip712_encode_data();
        let mut out = Vec::with_capacity(32 + data.len());
        out.extend_from_slice(typed.eip712_type_hash().as_slice());
        out.extend_from_slice(&data);
        out
    }

    /// Hash of the canonical encoding, before domain separation.
    pub fn struct_hash(&self) -> B256 {
        keccak256(self.canonical_encode())
    }

    /// Domain-separated hash: the value that is signed and that the
    /// relayer reports as `orderHash`.
    pub fn order_struct_hash(&self, domain: &SigningDomain) -> B256 {
        domain.digest(&self.typed())
    }

    /// Same terms under a fresh salt, for resubmitting a changed order.
    #[must_use]
    pub fn reissue(&self) -> Self {
        Self {
            salt: fresh_salt(),
            ..self.clone()
        }
    }

    pub const fn is_expired_at(&self, now: u64) -> bool {
        now > self.expiry
    }
}

/// An order bound to its maker signature and hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOrder {
    order: Order,
    signature: Signature,
    order_hash: B256,
}

impl SignedOrder {
    /// Bind `signature` to `order`, checking it recovers to the maker.
    ///
    /// # Errors
    /// `SigningUnavailable` when the signature belongs to another key.
    pub fn new(order: Order, signature: Signature, domain: &SigningDomain) -> Result<Self> {
        let order_hash = order.order_struct_hash(domain);
        let recovered = recover_signer(order_hash, &signature)?;
        if recovered != order.maker {
            return Err(SportxError::SigningUnavailable(format!(
                "signature recovers to {recovered}, not maker {}",
                order.maker
            )));
        }
        Ok(Self {
            order,
            signature,
            order_hash,
        })
    }

    /// Rebuild a relayer-held order, requiring its re-derived hash to
    /// equal the hash the relayer reported.
    ///
    /// # Errors
    /// `HashMismatch` when the fields do not round-trip, and
    /// `MalformedResponse` when the signature is not the maker's.
    pub fn from_relayer(
        order: Order,
        signature: Signature,
        reported_hash: B256,
        domain: &SigningDomain,
    ) -> Result<Self> {
        let derived = order.order_struct_hash(domain);
        if derived != reported_hash {
            return Err(SportxError::HashMismatch {
                reported: reported_hash,
                derived,
            });
        }
        Self::new(order, signature, domain).map_err(|e| {
            SportxError::MalformedResponse(format!("order {reported_hash}: {e}"))
        })
    }

    pub const fn order(&self) -> &Order {
        &self.order
    }

    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    pub const fn order_hash(&self) -> B256 {
        self.order_hash
    }

    pub const fn maker(&self) -> Address {
        self.order.maker
    }
}

/// A signed order as it currently sits in the relayer's book.
///
/// `fill_amount` is a hint read at query time; the relayer remains the
/// authority on what can still be filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookOrder {
    pub signed: SignedOrder,
    /// Maker-side amount already matched.
    pub fill_amount: TokenAmount,
}

impl BookOrder {
    pub fn order(&self) -> &Order {
        self.signed.order()
    }

    pub fn order_hash(&self) -> B256 {
        self.signed.order_hash()
    }

    /// Maker stake not yet matched.
    pub fn remaining_maker_size(&self) -> TokenAmount {
        self.order().total_bet_size.saturating_sub(self.fill_amount)
    }

    /// Taker stake this order can still absorb:
    /// `remaining_maker × (10^20 − odds) / odds`.
    pub fn remaining_size(&self) -> TokenAmount {
        let odds = self.order().percentage_odds;
        if odds.is_zero() || odds >= odds_scale() {
            return U256::ZERO;
        }
        self.remaining_maker_size()
            .saturating_mul(odds_scale() - odds)
            / odds
    }

    pub fn is_fully_filled(&self) -> bool {
        self.fill_amount >= self.order().total_bet_size
    }
}
