//! Greedy fill-set selection over a snapshot of the maker book.
//!
//! Candidates are filtered for eligibility, ordered by the configured
//! priority (order hash breaks any remaining tie), then consumed until
//! the desired taker stake is covered. Either the whole stake is covered
//! or `InsufficientLiquidity` is returned; there is no partial result.

use std::cmp::Ordering;

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::convert::TokenAmount;
use super::errors::{Result, SportxError};
use super::order::BookOrder;

/// One ordering criterion for candidate maker orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityKey {
    /// Highest maker percentage odds first: the taker's implied
    /// probability is lowest, so the payout is best.
    BestOdds,
    EarliestExpiry,
    /// Largest remaining taker-side capacity first.
    LargestSize,
}

impl PriorityKey {
    fn compare(self, a: &BookOrder, b: &BookOrder) -> Ordering {
        match self {
            Self::BestOdds => b.order().percentage_odds.cmp(&a.order().percentage_odds),
            Self::EarliestExpiry => a.order().expiry.cmp(&b.order().expiry),
            Self::LargestSize => b.remaining_size().cmp(&a.remaining_size()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    pub priority: Vec<PriorityKey>,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            priority: vec![PriorityKey::BestOdds, PriorityKey::EarliestExpiry],
        }
    }
}

impl SelectionPolicy {
    pub const fn new(priority: Vec<PriorityKey>) -> Self {
        Self { priority }
    }

    fn compare(&self, a: &BookOrder, b: &BookOrder) -> Ordering {
        self.priority
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.order_hash().cmp(&b.order_hash()))
    }
}

/// What the taker wants to bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakerIntent {
    pub market_hash: B256,
    pub base_token: Address,
    pub taker: Address,
    pub is_taker_betting_outcome_one: bool,
    pub desired_stake: TokenAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedLeg {
    pub order_hash: B256,
    /// Taker stake assigned to this order.
    pub stake: TokenAmount,
}

/// Ordered fill set covering exactly the desired stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub legs: Vec<SuggestedLeg>,
    pub total: TokenAmount,
}

impl Suggestion {
    pub fn order_hashes(&self) -> Vec<B256> {
        self.legs.iter().map(|leg| leg.order_hash).collect()
    }

    pub fn stakes(&self) -> Vec<TokenAmount> {
        self.legs.iter().map(|leg| leg.stake).collect()
    }
}

/// Whether `book` can be matched by this taker at `now`.
pub fn is_eligible(book: &BookOrder, intent: &TakerIntent, now: u64) -> bool {
    let order = book.order();
    order.market_hash == intent.market_hash
        && order.base_token == intent.base_token
        && order.is_maker_betting_outcome_one != intent.is_taker_betting_outcome_one
        && order.maker != intent.taker
        && !order.is_expired_at(now)
        && !book.remaining_size().is_zero()
}

/// Greedy selection covering `intent.desired_stake`.
///
/// # Errors
/// `InvalidAmount` for a zero stake, `InsufficientLiquidity` when all
/// eligible orders together cannot cover it.
pub fn select_orders(
    book: &[BookOrder],
    intent: &TakerIntent,
    policy: &SelectionPolicy,
    now: u64,
) -> Result<Suggestion> {
    if intent.desired_stake.is_zero() {
        return Err(SportxError::InvalidAmount(
            "desired stake must be positive".into(),
        ));
    }

    let mut candidates: Vec<&BookOrder> = book
        .iter()
        .filter(|b| is_eligible(b, intent, now))
        .collect();

    let available = candidates
        .iter()
        .fold(U256::ZERO, |acc, b| acc.saturating_add(b.remaining_size()));
    if available < intent.desired_stake {
        return Err(SportxError::InsufficientLiquidity {
            desired: intent.desired_stake,
            available,
        });
    }

    candidates.sort_by(|a, b| policy.compare(a, b));

    let mut outstanding = intent.desired_stake;
    let mut legs = Vec::new();
    for candidate in candidates {
        if outstanding.is_zero() {
            break;
        }
        let stake = candidate.remaining_size().min(outstanding);
        outstanding -= stake;
        legs.push(SuggestedLeg {
            order_hash: candidate.order_hash(),
            stake,
        });
    }

    Ok(Suggestion {
        legs,
        total: intent.desired_stake,
    })
}
