//! Read-only relayer snapshots: markets, leagues, sports, metadata.

use std::fmt;

use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Market status as published by the relayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    Pending,
    Active,
    Suspended,
    Settled,
    Void,
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::Settled => "SETTLED",
            Self::Void => "VOID",
        };
        f.write_str(label)
    }
}

/// A betting market. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub market_hash: B256,
    pub sport_id: u64,
    pub league_id: u64,
    pub team_one_name: String,
    pub team_two_name: String,
    pub outcome_one_name: String,
    pub outcome_two_name: String,
    /// Scheduled start, when the relayer publishes one.
    pub game_time: Option<DateTime<Utc>>,
    /// Spread/total line for non-moneyline markets.
    pub line: Option<f64>,
    pub status: MarketStatus,
}

impl Market {
    pub fn is_active(&self) -> bool {
        self.status == MarketStatus::Active
    }

    pub fn participants(&self) -> [&str; 2] {
        [&self.team_one_name, &self.team_two_name]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub league_id: u64,
    pub label: String,
    pub sport_id: u64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sport {
    pub sport_id: u64,
    pub label: String,
}

/// Relayer metadata needed to build orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Relayer fee / executor address stamped into every order.
    pub executor_address: Address,
    /// Protocol version advertised by the relayer.
    pub version: String,
}
