//! Settled and in-flight bet records, plus the query filters for them.

use std::fmt;

use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::convert::{PercentageOdds, TokenAmount, from_protocol_odds, to_display_amount};

/// Settlement state of a trade as reported by the relayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    Success,
    Failed,
    Pending,
}

/// One side of a matched fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub fill_hash: B256,
    pub order_hash: B256,
    pub market_hash: B256,
    pub base_token: Address,
    pub bettor: Address,
    /// `true` for the maker side of the fill.
    pub maker: bool,
    pub stake: TokenAmount,
    /// Implied probability of the outcome this bettor backed.
    pub odds: PercentageOdds,
    pub betting_outcome_one: bool,
    pub bet_time: DateTime<Utc>,
    pub settled: bool,
    /// Winning outcome once settled: 1, 2, or 0 for void.
    pub outcome: Option<u8>,
    pub status: TradeStatus,
}

impl Trade {
    pub fn display_odds(&self) -> f64 {
        from_protocol_odds(self.odds)
    }

    pub fn display_stake(&self, decimals: u32) -> f64 {
        to_display_amount(self.stake, decimals)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PendingBetStatus {
    Pending,
    Failed,
}

impl fmt::Display for PendingBetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("PENDING"),
            Self::Failed => f.write_str("FAILED"),
        }
    }
}

/// A fill the relayer accepted but has not settled on-chain, or whose
/// settlement failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBet {
    pub fill_hash: B256,
    pub bettor: Address,
    pub market_hash: B256,
    pub base_token: Address,
    pub order_hashes: Vec<B256>,
    pub taker_amounts: Vec<TokenAmount>,
    pub status: PendingBetStatus,
    pub created_at: DateTime<Utc>,
}

/// Optional filters for trade history. Empty means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeFilter {
    pub bettor: Option<Address>,
    pub market_hashes: Option<Vec<B256>>,
    pub base_token: Option<Address>,
    pub maker: Option<bool>,
    pub settled: Option<bool>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl TradeFilter {
    pub fn for_bettor(bettor: Address) -> Self {
        Self {
            bettor: Some(bettor),
            ..Self::default()
        }
    }

    /// Whether `trade` satisfies every set constraint.
    pub fn matches(&self, trade: &Trade) -> bool {
        self.bettor.is_none_or(|b| b == trade.bettor)
            && self
                .market_hashes
                .as_ref()
                .is_none_or(|hashes| hashes.contains(&trade.market_hash))
            && self.base_token.is_none_or(|t| t == trade.base_token)
            && self.maker.is_none_or(|m| m == trade.maker)
            && self.settled.is_none_or(|s| s == trade.settled)
            && self.start_date.is_none_or(|d| trade.bet_time >= d)
            && self.end_date.is_none_or(|d| trade.bet_time <= d)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBetsFilter {
    pub bettor: Address,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl PendingBetsFilter {
    pub const fn new(bettor: Address) -> Self {
        Self {
            bettor,
            start_date: None,
            end_date: None,
        }
    }
}
