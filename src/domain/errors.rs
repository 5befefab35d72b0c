//! Error taxonomy shared by every layer of the order engine.
//!
//! Local validation failures (`InvalidAmount`, `InvalidOdds`,
//! `LengthMismatch`, ...) are raised before any network or signing call.
//! Collaborator failures arrive through the `From` conversions at the
//! bottom of this file.

use alloy::primitives::{Address, B256, U256};
use thiserror::Error;

use super::market::MarketStatus;
use crate::ports::relayer::TransportError;
use crate::ports::signing::SigningError;

/// Result alias used across the library surface.
pub type Result<T> = std::result::Result<T, SportxError>;

/// Every failure the order engine can report.
#[derive(Debug, Error)]
pub enum SportxError {
    /// Token amount is negative, non-finite or does not fit the protocol width.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Probability outside [0, 1) or an unparsable odds string.
    #[error("invalid odds: {0}")]
    InvalidOdds(String),

    /// Eligible book liquidity cannot cover the requested stake.
    #[error("insufficient liquidity: desired {desired}, available {available}")]
    InsufficientLiquidity { desired: U256, available: U256 },

    /// `orders` and `stakes` are not parallel sequences.
    #[error("orders and stakes differ in length ({orders} vs {stakes})")]
    LengthMismatch { orders: usize, stakes: usize },

    /// A taker stake is zero or larger than the order's remaining size.
    #[error("stake {stake} at index {index} exceeds remaining size {remaining}")]
    StakeExceedsRemaining {
        index: usize,
        stake: U256,
        remaining: U256,
    },

    #[error("no orders given")]
    EmptyOrderSet,

    /// The same maker order appears more than once in a fill.
    #[error("order {order_hash} repeated at index {index}")]
    DuplicateOrder { index: usize, order_hash: B256 },

    /// Cancellation attempted on an order signed by a different key.
    #[error("order {order_hash} belongs to maker {maker}, signer is {signer}")]
    ForeignOrder {
        order_hash: B256,
        maker: Address,
        signer: Address,
    },

    #[error("market {0} not found")]
    MarketNotFound(B256),

    #[error("market {market_hash} is {status}, expected ACTIVE")]
    MarketNotActive {
        market_hash: B256,
        status: MarketStatus,
    },

    #[error("expiry {expiry} is not after now ({now})")]
    ExpiryInPast { expiry: u64, now: u64 },

    /// The signing collaborator failed or produced an unusable signature.
    #[error("signing unavailable: {0}")]
    SigningUnavailable(String),

    /// Business rejection reported by the relayer on a read endpoint.
    #[error("relayer rejected request: {reason}")]
    RelayerRejected { reason: String },

    /// The relayer could not be reached or answered outside the protocol.
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// Relayer JSON did not match the expected shape.
    #[error("malformed relayer response: {0}")]
    MalformedResponse(String),

    /// A fetched order does not re-derive to the hash the relayer reported.
    #[error("order hash mismatch: relayer reported {reported}, derived {derived}")]
    HashMismatch { reported: B256, derived: B256 },

    #[error("invalid lifecycle transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },
}

impl From<TransportError> for SportxError {
    fn from(err: TransportError) -> Self {
        Self::TransportFailure(err.to_string())
    }
}

impl From<SigningError> for SportxError {
    fn from(err: SigningError) -> Self {
        Self::SigningUnavailable(err.to_string())
    }
}
