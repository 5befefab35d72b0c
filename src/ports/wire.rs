//! Relayer Wire Format - Envelope and DTOs
//!
//! Every relayer response is `{"status": "success", "data": ...}` or a
//! failure status with a reason. The envelope is opened here and the
//! payload is decoded into typed DTOs at the boundary, so nothing past
//! this module touches raw JSON.
//!
//! Integers that can exceed 2^53 travel as decimal strings; hashes,
//! addresses and signatures as `0x` hex.

use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::eip712::{SigningDomain, format_signature, parse_signature};
use crate::domain::errors::{Result, SportxError};
use crate::domain::lifecycle::RelayerOutcome;
use crate::domain::market::{League, Market, MarketStatus, Metadata, Sport};
use crate::domain::order::{BookOrder, Order, SignedOrder};
use crate::domain::trade::{
  PendingBet, PendingBetStatus, PendingBetsFilter, Trade, TradeFilter, TradeStatus,
};

/// Relayer endpoint paths, relative to the base URL.
pub mod paths {
  pub const METADATA: &str = "/metadata";
  pub const NEW_ORDER: &str = "/orders/new";
  pub const FILL_ORDERS: &str = "/orders/fill";
  pub const CANCEL_ORDERS: &str = "/orders/cancel";
  pub const ORDERS: &str = "/orders";
  pub const SUGGEST_ORDERS: &str = "/orders/suggest";
  pub const ACTIVE_MARKETS: &str = "/markets/active";
  pub const FIND_MARKETS: &str = "/markets/find";
  pub const LEAGUES: &str = "/leagues";
  pub const SPORTS: &str = "/sports";
  pub const TRADES: &str = "/trades";
  pub const PENDING_BETS: &str = "/trades/pending";
}

const SUCCESS: &str = "success";

/// Split a response into its `data` payload or the relayer's reason.
///
/// The reason is taken from `reason`, `message` or a string `data`, in
/// that order, and falls back to the status itself.
///
/// # Errors
/// `MalformedResponse` when the body is not an object with a string
/// `status`.
pub fn open_envelope(body: Value) -> Result<RelayerOutcome<Value>> {
  let Value::Object(mut fields) = body else {
    return Err(SportxError::MalformedResponse(
      "envelope is not a JSON object".into(),
    ));
  };
  let status = match fields.get("status") {
    Some(Value::String(status)) => status.clone(),
    _ => {
      return Err(SportxError::MalformedResponse(
        "envelope has no string status".into(),
      ));
    }
  };
  if status == SUCCESS {
    return Ok(RelayerOutcome::Accepted(
      fields.remove("data").unwrap_or(Value::Null),
    ));
  }
  let reason = ["reason", "message", "data"]
    .iter()
    .find_map(|key| fields.get(*key).and_then(Value::as_str).map(str::to_owned))
    .unwrap_or(status);
  Ok(RelayerOutcome::Rejected { reason })
}

/// Decode an envelope payload into `T`.
///
/// # Errors
/// `MalformedResponse` naming `what` on shape mismatch.
pub fn decode<T: DeserializeOwned>(data: Value, what: &str) -> Result<T> {
  serde_json::from_value(data).map_err(|e| SportxError::MalformedResponse(format!("{what}: {e}")))
}

/// Success envelope around `data`.
pub fn success_envelope(data: Value) -> Value {
  json!({ "status": SUCCESS, "data": data })
}

/// Failure envelope carrying `reason`.
pub fn failure_envelope(reason: &str) -> Value {
  json!({ "status": "failure", "reason": reason })
}

fn timestamp(secs: i64, what: &str) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp(secs, 0)
    .ok_or_else(|| SportxError::MalformedResponse(format!("{what}: timestamp {secs} out of range")))
}

/// Decimal-string encoding for `U256`.
pub mod dec_u256 {
  use std::str::FromStr;

  use alloy::primitives::U256;
  use serde::{Deserialize, Deserializer, Serializer};

  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Text(String),
    Number(u64),
  }

  impl Raw {
    fn parse<E: serde::de::Error>(self) -> Result<U256, E> {
      match self {
        Self::Text(text) => U256::from_str(text.trim()).map_err(E::custom),
        Self::Number(n) => Ok(U256::from(n)),
      }
    }
  }

  pub fn serialize<S: Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_string())
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
    Raw::deserialize(d)?.parse()
  }

  pub mod vec {
    use super::{Deserialize, Deserializer, Raw, Serializer, U256};

    pub fn serialize<S: Serializer>(values: &[U256], s: S) -> Result<S::Ok, S::Error> {
      s.collect_seq(values.iter().map(ToString::to_string))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<U256>, D::Error> {
      Vec::<Raw>::deserialize(d)?
        .into_iter()
        .map(Raw::parse)
        .collect()
    }
  }

  pub mod option {
    use super::{Deserialize, Deserializer, Raw, Serializer, U256};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<U256>, s: S) -> Result<S::Ok, S::Error> {
      match value {
        Some(v) => s.serialize_some(&v.to_string()),
        None => s.serialize_none(),
      }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<U256>, D::Error> {
      Option::<Raw>::deserialize(d)?.map(Raw::parse).transpose()
    }
  }

  pub mod option_vec {
    use super::{Deserialize, Deserializer, Raw, Serializer, U256};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(values: &Option<Vec<U256>>, s: S) -> Result<S::Ok, S::Error> {
      match values {
        Some(values) => s.collect_seq(values.iter().map(ToString::to_string)),
        None => s.serialize_none(),
      }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<U256>>, D::Error> {
      Option::<Vec<Raw>>::deserialize(d)?
        .map(|raw| raw.into_iter().map(Raw::parse).collect())
        .transpose()
    }
  }
}

// ────────────────────────────────────────────
// Orders
// ────────────────────────────────────────────

/// Order as the relayer lists and accepts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOrder {
  pub order_hash: B256,
  pub market_hash: B256,
  pub base_token: Address,
  #[serde(with = "dec_u256")]
  pub total_bet_size: U256,
  #[serde(with = "dec_u256")]
  pub percentage_odds: U256,
  pub expiry: u64,
  #[serde(with = "dec_u256")]
  pub salt: U256,
  pub maker: Address,
  #[serde(alias = "executor")]
  pub relayer_fee_address: Address,
  pub is_maker_betting_outcome_one: bool,
  pub signature: String,
  /// Maker-side amount matched so far; absent on submission.
  #[serde(default, with = "dec_u256::option", skip_serializing_if = "Option::is_none")]
  pub fill_amount: Option<U256>,
}

impl ApiOrder {
  pub fn from_signed(signed: &SignedOrder) -> Self {
    let order = signed.order();
    Self {
      order_hash: signed.order_hash(),
      market_hash: order.market_hash,
      base_token: order.base_token,
      total_bet_size: order.total_bet_size,
      percentage_odds: order.percentage_odds,
      expiry: order.expiry,
      salt: order.salt,
      maker: order.maker,
      relayer_fee_address: order.relayer_fee_address,
      is_maker_betting_outcome_one: order.is_maker_betting_outcome_one,
      signature: format_signature(signed.signature()),
      fill_amount: None,
    }
  }

  pub fn from_book(book: &BookOrder) -> Self {
    Self {
      fill_amount: Some(book.fill_amount),
      ..Self::from_signed(&book.signed)
    }
  }

  fn order(&self) -> Order {
    Order {
      market_hash: self.market_hash,
      base_token: self.base_token,
      total_bet_size: self.total_bet_size,
      percentage_odds: self.percentage_odds,
      is_maker_betting_outcome_one: self.is_maker_betting_outcome_one,
      expiry: self.expiry,
      salt: self.salt,
      maker: self.maker,
      relayer_fee_address: self.relayer_fee_address,
    }
  }

  /// Rebuild the typed book order, checking the hash round-trip and
  /// the maker signature.
  ///
  /// # Errors
  /// `HashMismatch` or `MalformedResponse`.
  pub fn into_book(self, domain: &SigningDomain) -> Result<BookOrder> {
    let signature = parse_signature(&self.signature)?;
    let signed = SignedOrder::from_relayer(self.order(), signature, self.order_hash, domain)?;
    Ok(BookOrder {
      signed,
      fill_amount: self.fill_amount.unwrap_or_default(),
    })
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderPayload {
  pub orders: Vec<ApiOrder>,
}

/// Accepted new-order response: the hashes the relayer now holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderData {
  pub orders: Vec<B256>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub market_hashes: Option<Vec<B256>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub maker: Option<Address>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub base_token: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestOrdersPayload {
  pub market_hash: B256,
  pub base_token: Address,
  pub taker: Address,
  #[serde(with = "dec_u256")]
  pub taker_pay_amount: U256,
  pub is_taker_betting_outcome_one: bool,
}

/// Orders the relayer proposes for a taker stake, best first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestOrdersData {
  #[serde(default)]
  pub order_hashes: Vec<B256>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillPayload {
  pub taker: Address,
  pub order_hashes: Vec<B256>,
  #[serde(with = "dec_u256::vec")]
  pub taker_amounts: Vec<U256>,
  #[serde(with = "dec_u256")]
  pub fill_salt: U256,
  pub taker_sig: String,
}

/// Accepted fill response. Fields the relayer omits stay `None` so a
/// partial match is visible as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillData {
  #[serde(default)]
  pub fill_hash: Option<B256>,
  #[serde(default)]
  pub order_hashes: Option<Vec<B256>>,
  #[serde(default, with = "dec_u256::option_vec", skip_serializing_if = "Option::is_none")]
  pub taker_amounts: Option<Vec<U256>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelPayload {
  pub maker: Address,
  pub message: String,
  pub order_hashes: Vec<B256>,
  pub cancel_signature: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelData {
  #[serde(default)]
  pub cancelled_count: Option<u64>,
}

// ────────────────────────────────────────────
// Markets and metadata
// ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMarket {
  pub market_hash: B256,
  pub sport_id: u64,
  pub league_id: u64,
  #[serde(default)]
  pub team_one_name: String,
  #[serde(default)]
  pub team_two_name: String,
  #[serde(default)]
  pub outcome_one_name: String,
  #[serde(default)]
  pub outcome_two_name: String,
  /// Unix seconds.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub game_time: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub line: Option<f64>,
  pub status: MarketStatus,
}

impl ApiMarket {
  /// # Errors
  /// `MalformedResponse` when `gameTime` is out of range.
  pub fn into_market(self) -> Result<Market> {
    let game_time = self
      .game_time
      .map(|secs| timestamp(secs, "market gameTime"))
      .transpose()?;
    Ok(Market {
      market_hash: self.market_hash,
      sport_id: self.sport_id,
      league_id: self.league_id,
      team_one_name: self.team_one_name,
      team_two_name: self.team_two_name,
      outcome_one_name: self.outcome_one_name,
      outcome_two_name: self.outcome_two_name,
      game_time,
      line: self.line,
      status: self.status,
    })
  }
}

impl From<&Market> for ApiMarket {
  fn from(market: &Market) -> Self {
    Self {
      market_hash: market.market_hash,
      sport_id: market.sport_id,
      league_id: market.league_id,
      team_one_name: market.team_one_name.clone(),
      team_two_name: market.team_two_name.clone(),
      outcome_one_name: market.outcome_one_name.clone(),
      outcome_two_name: market.outcome_two_name.clone(),
      game_time: market.game_time.map(|t| t.timestamp()),
      line: market.line,
      status: market.status,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketLookupPayload {
  pub market_hashes: Vec<B256>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLeague {
  pub league_id: u64,
  pub label: String,
  pub sport_id: u64,
  #[serde(default)]
  pub active: bool,
}

impl From<ApiLeague> for League {
  fn from(api: ApiLeague) -> Self {
    Self {
      league_id: api.league_id,
      label: api.label,
      sport_id: api.sport_id,
      active: api.active,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSport {
  pub sport_id: u64,
  pub label: String,
}

impl From<ApiSport> for Sport {
  fn from(api: ApiSport) -> Self {
    Self {
      sport_id: api.sport_id,
      label: api.label,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetadata {
  pub executor_address: Address,
  pub version: String,
}

impl From<ApiMetadata> for Metadata {
  fn from(api: ApiMetadata) -> Self {
    Self {
      executor_address: api.executor_address,
      version: api.version,
    }
  }
}

// ────────────────────────────────────────────
// Trades and pending bets
// ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTrade {
  pub fill_hash: B256,
  pub order_hash: B256,
  pub market_hash: B256,
  pub base_token: Address,
  pub bettor: Address,
  pub maker: bool,
  #[serde(with = "dec_u256")]
  pub stake: U256,
  #[serde(with = "dec_u256")]
  pub odds: U256,
  pub betting_outcome_one: bool,
  /// Unix seconds.
  pub bet_time: i64,
  #[serde(default)]
  pub settled: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub outcome: Option<u8>,
  pub trade_status: TradeStatus,
}

impl ApiTrade {
  /// # Errors
  /// `MalformedResponse` when `betTime` is out of range.
  pub fn into_trade(self) -> Result<Trade> {
    Ok(Trade {
      fill_hash: self.fill_hash,
      order_hash: self.order_hash,
      market_hash: self.market_hash,
      base_token: self.base_token,
      bettor: self.bettor,
      maker: self.maker,
      stake: self.stake,
      odds: self.odds,
      betting_outcome_one: self.betting_outcome_one,
      bet_time: timestamp(self.bet_time, "trade betTime")?,
      settled: self.settled,
      outcome: self.outcome,
      status: self.trade_status,
    })
  }
}

/// The trades endpoint answers either with a page object or a bare list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TradesData {
  Page { trades: Vec<ApiTrade> },
  List(Vec<ApiTrade>),
}

impl TradesData {
  pub fn into_trades(self) -> Vec<ApiTrade> {
    match self {
      Self::Page { trades } | Self::List(trades) => trades,
    }
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradesQuery {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bettor: Option<Address>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub market_hashes: Option<Vec<B256>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub base_token: Option<Address>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub maker: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub settled: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub start_date: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_date: Option<i64>,
}

impl From<&TradeFilter> for TradesQuery {
  fn from(filter: &TradeFilter) -> Self {
    Self {
      bettor: filter.bettor,
      market_hashes: filter.market_hashes.clone(),
      base_token: filter.base_token,
      maker: filter.maker,
      settled: filter.settled,
      start_date: filter.start_date.map(|d| d.timestamp()),
      end_date: filter.end_date.map(|d| d.timestamp()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPendingBet {
  pub fill_hash: B256,
  pub bettor: Address,
  pub market_hash: B256,
  pub base_token: Address,
  pub order_hashes: Vec<B256>,
  #[serde(with = "dec_u256::vec")]
  pub taker_amounts: Vec<U256>,
  pub status: PendingBetStatus,
  /// Unix seconds.
  pub created_at: i64,
}

impl ApiPendingBet {
  /// # Errors
  /// `MalformedResponse` when `createdAt` is out of range.
  pub fn into_pending_bet(self) -> Result<PendingBet> {
    Ok(PendingBet {
      fill_hash: self.fill_hash,
      bettor: self.bettor,
      market_hash: self.market_hash,
      base_token: self.base_token,
      order_hashes: self.order_hashes,
      taker_amounts: self.taker_amounts,
      status: self.status,
      created_at: timestamp(self.created_at, "pending bet createdAt")?,
    })
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBetsQuery {
  pub bettor: Address,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub start_date: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_date: Option<i64>,
}

impl From<&PendingBetsFilter> for PendingBetsQuery {
  fn from(filter: &PendingBetsFilter) -> Self {
    Self {
      bettor: filter.bettor,
      start_date: filter.start_date.map(|d| d.timestamp()),
      end_date: filter.end_date.map(|d| d.timestamp()),
    }
  }
}
