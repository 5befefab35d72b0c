//! SportX Client - Order Lifecycle Orchestration
//!
//! Builds, signs and submits maker orders, selects and fills taker
//! matches, cancels, and projects relayer state into typed records.
//!
//! Local validation always runs before any signing or network call.
//! Relayer business rejections on write calls come back as
//! `RelayerOutcome::Rejected` inside `Ok`; on read calls there is no
//! data to return, so they surface as `SportxError::RelayerRejected`.
//! Nothing here retries; each call is independent and shares only the
//! read-only key and configuration.

use std::collections::HashSet;
use std::sync::Arc;

use alloy::primitives::{Address, B256, Signature, U256};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::signer::OrderSigner;
use crate::config::{AppConfig, NetworkConfig};
use crate::domain::convert::TokenAmount;
use crate::domain::eip712::format_signature;
use crate::domain::errors::{Result, SportxError};
use crate::domain::fill::Fill;
use crate::domain::lifecycle::{LifecycleEvent, OrderState, RelayerOutcome};
use crate::domain::market::{League, Market, Metadata, Sport};
use crate::domain::order::{BookOrder, NewOrder, SignedOrder, unix_now};
use crate::domain::selection::{SelectionPolicy, Suggestion, TakerIntent, select_orders};
use crate::domain::trade::{PendingBet, PendingBetsFilter, Trade, TradeFilter, TradeStatus};
use crate::ports::chain::{ApprovalReceipt, ChainApproval};
use crate::ports::relayer::{HttpMethod, RelayerTransport};
use crate::ports::signing::SigningKey;
use crate::ports::wire::{
  self, ApiLeague, ApiMarket, ApiMetadata, ApiOrder, ApiPendingBet, ApiSport, CancelData,
  CancelPayload, FillData, FillPayload, MarketLookupPayload, NewOrderData, NewOrderPayload,
  OrdersQuery, PendingBetsQuery, SuggestOrdersData, SuggestOrdersPayload, TradesData, TradesQuery,
  paths,
};

/// Message the relayer expects on cancellations unless told otherwise.
pub const DEFAULT_CANCEL_MESSAGE: &str = "Are you sure you want to cancel these orders";

/// A signed maker order and what the relayer did with it.
#[derive(Debug, Clone)]
pub struct OrderSubmission {
  pub signed: SignedOrder,
  /// `Active` when accepted, `Rejected` otherwise.
  pub state: OrderState,
  pub outcome: RelayerOutcome<NewOrderData>,
}

/// A signed taker fill and the relayer's verbatim answer.
#[derive(Debug, Clone)]
pub struct FillSubmission {
  pub fill: Fill,
  pub signature: Signature,
  pub outcome: RelayerOutcome<FillData>,
}

/// A signed cancellation and what the relayer did with it.
#[derive(Debug, Clone)]
pub struct CancelSubmission {
  pub order_hashes: Vec<B256>,
  pub signature: Signature,
  /// `Cancelled` for every hash once accepted, empty otherwise.
  pub states: Vec<(B256, OrderState)>,
  pub outcome: RelayerOutcome<CancelData>,
}

impl CancelSubmission {
  /// Fold this cancellation into the state a caller tracks for one order.
  ///
  /// # Errors
  /// `InvalidTransition` when the order was not open.
  pub fn state_after(&self, order_hash: B256, current: OrderState) -> Result<OrderState> {
    if self.outcome.is_accepted() && self.order_hashes.contains(&order_hash) {
      current.apply(LifecycleEvent::CancelConfirmed)
    } else {
      Ok(current)
    }
  }
}

/// Order lifecycle client bound to one key, one relayer and one network.
pub struct SportX<R: RelayerTransport, K: SigningKey, A: ChainApproval> {
  relayer: Arc<R>,
  signer: OrderSigner<K>,
  approvals: Arc<A>,
  network: NetworkConfig,
  policy: SelectionPolicy,
  metadata: Metadata,
}

fn encode<T: Serialize>(payload: &T) -> Result<Value> {
  serde_json::to_value(payload)
    .map_err(|e| SportxError::TransportFailure(format!("request encoding failed: {e}")))
}

impl<R: RelayerTransport, K: SigningKey, A: ChainApproval> SportX<R, K, A> {
  /// Fetch relayer metadata and bind the client to it.
  ///
  /// # Errors
  /// `TransportFailure` or `RelayerRejected` when metadata is unavailable.
  #[instrument(skip_all, fields(chain_id = config.network.chain_id()))]
  pub async fn connect(
    relayer: Arc<R>,
    key: Arc<K>,
    approvals: Arc<A>,
    config: &AppConfig,
  ) -> Result<Self> {
    let metadata = fetch_metadata(relayer.as_ref()).await?;
    info!(
      executor = %metadata.executor_address,
      version = %metadata.version,
      maker = %key.address(),
      "Connected to relayer"
    );
    Ok(Self {
      relayer,
      signer: OrderSigner::new(key, config.network.signing_domain()),
      approvals,
      network: config.network.clone(),
      policy: config.selection.policy(),
      metadata,
    })
  }

  /// Metadata captured at connect time.
  pub const fn metadata(&self) -> &Metadata {
    &self.metadata
  }

  pub fn address(&self) -> Address {
    self.signer.address()
  }

  pub const fn signer(&self) -> &OrderSigner<K> {
    &self.signer
  }

  pub const fn network(&self) -> &NetworkConfig {
    &self.network
  }

  // ── relayer plumbing ──────────────────────

  async fn call(
    &self,
    method: HttpMethod,
    path: &str,
    payload: Option<Value>,
  ) -> Result<RelayerOutcome<Value>> {
    let body = self.relayer.request(method, path, payload).await?;
    wire::open_envelope(body)
  }

  /// Read call: a rejection has no data to return, so it is an error.
  async fn query<T: DeserializeOwned>(
    &self,
    method: HttpMethod,
    path: &str,
    payload: Option<Value>,
  ) -> Result<T> {
    match self.call(method, path, payload).await? {
      RelayerOutcome::Accepted(data) => wire::decode(data, path),
      RelayerOutcome::Rejected { reason } => {
        warn!(path, %reason, "Relayer rejected query");
        Err(SportxError::RelayerRejected { reason })
      }
    }
  }

  /// Write call: a rejection is an expected outcome.
  async fn submit<T: DeserializeOwned>(
    &self,
    path: &str,
    payload: Value,
  ) -> Result<RelayerOutcome<T>> {
    Ok(match self.call(HttpMethod::Post, path, Some(payload)).await? {
      RelayerOutcome::Accepted(data) => RelayerOutcome::Accepted(wire::decode(data, path)?),
      RelayerOutcome::Rejected { reason } => {
        warn!(path, %reason, "Relayer rejected submission");
        RelayerOutcome::Rejected { reason }
      }
    })
  }

  // ── reference data ────────────────────────

  /// Fresh relayer metadata.
  ///
  /// # Errors
  /// `TransportFailure`, `RelayerRejected` or `MalformedResponse`.
  #[instrument(skip(self))]
  pub async fn get_metadata(&self) -> Result<Metadata> {
    fetch_metadata(self.relayer.as_ref()).await
  }

  /// # Errors
  /// `TransportFailure`, `RelayerRejected` or `MalformedResponse`.
  #[instrument(skip(self))]
  pub async fn get_active_markets(&self) -> Result<Vec<Market>> {
    let markets: Vec<ApiMarket> = self.query(HttpMethod::Get, paths::ACTIVE_MARKETS, None).await?;
    let markets = markets
      .into_iter()
      .map(ApiMarket::into_market)
      .collect::<Result<Vec<_>>>()?;
    debug!(count = markets.len(), "Fetched active markets");
    Ok(markets)
  }

  /// Markets by hash. Unknown hashes are simply absent from the result.
  ///
  /// # Errors
  /// `TransportFailure`, `RelayerRejected` or `MalformedResponse`.
  #[instrument(skip(self), fields(count = market_hashes.len()))]
  pub async fn market_lookup(&self, market_hashes: &[B256]) -> Result<Vec<Market>> {
    if market_hashes.is_empty() {
      return Ok(Vec::new());
    }
    let payload = encode(&MarketLookupPayload {
      market_hashes: market_hashes.to_vec(),
    })?;
    let markets: Vec<ApiMarket> = self
      .query(HttpMethod::Post, paths::FIND_MARKETS, Some(payload))
      .await?;
    markets.into_iter().map(ApiMarket::into_market).collect()
  }

  /// # Errors
  /// `TransportFailure`, `RelayerRejected` or `MalformedResponse`.
  #[instrument(skip(self))]
  pub async fn get_leagues(&self) -> Result<Vec<League>> {
    let leagues: Vec<ApiLeague> = self.query(HttpMethod::Get, paths::LEAGUES, None).await?;
    Ok(leagues.into_iter().map(League::from).collect())
  }

  /// # Errors
  /// `TransportFailure`, `RelayerRejected` or `MalformedResponse`.
  #[instrument(skip(self))]
  pub async fn get_sports(&self) -> Result<Vec<Sport>> {
    let sports: Vec<ApiSport> = self.query(HttpMethod::Get, paths::SPORTS, None).await?;
    Ok(sports.into_iter().map(Sport::from).collect())
  }

  // ── approvals ─────────────────────────────

  /// Authorize the protocol's transfer proxy to move `token`.
  ///
  /// # Errors
  /// `TransportFailure` when the chain call fails.
  #[instrument(skip(self), fields(spender = %self.network.token_transfer_proxy))]
  pub async fn approve_sportx_contracts(&self, token: Address) -> Result<ApprovalReceipt> {
    let receipt = self
      .approvals
      .approve(token, self.network.token_transfer_proxy)
      .await
      .map_err(|e| SportxError::TransportFailure(format!("approval failed: {e:#}")))?;
    info!(
      token = %token,
      already_approved = receipt.already_approved,
      tx_hash = ?receipt.tx_hash,
      "Transfer proxy approval done"
    );
    Ok(receipt)
  }

  // ── orders ────────────────────────────────

  /// Validate, sign and submit a maker order.
  ///
  /// # Errors
  /// Local: `InvalidAmount`, `InvalidOdds`, `ExpiryInPast`,
  /// `MarketNotFound`, `MarketNotActive`. Collaborators:
  /// `SigningUnavailable`, `TransportFailure`. A relayer rejection is
  /// returned in `OrderSubmission::outcome`.
  #[instrument(skip(self, intent), fields(market = %intent.market_hash, expiry = intent.expiry))]
  pub async fn new_order(&self, intent: NewOrder) -> Result<OrderSubmission> {
    intent.validate(unix_now())?;

    let market = self
      .market_lookup(&[intent.market_hash])
      .await?
      .into_iter()
      .find(|m| m.market_hash == intent.market_hash)
      .ok_or(SportxError::MarketNotFound(intent.market_hash))?;
    if !market.is_active() {
      return Err(SportxError::MarketNotActive {
        market_hash: market.market_hash,
        status: market.status,
      });
    }

    let order = intent.into_order(self.address(), self.metadata.executor_address);
    let signed = self.signer.sign_order(order).await?;
    let state = OrderState::Built
      .apply(LifecycleEvent::Signed)?
      .apply(LifecycleEvent::Submitted)?;

    let payload = encode(&NewOrderPayload {
      orders: vec![ApiOrder::from_signed(&signed)],
    })?;
    let outcome: RelayerOutcome<NewOrderData> = self.submit(paths::NEW_ORDER, payload).await?;

    let state = if outcome.is_accepted() {
      info!(order_hash = %signed.order_hash(), "Order accepted");
      state.apply(LifecycleEvent::Accepted)?
    } else {
      state.apply(LifecycleEvent::Rejected)?
    };

    Ok(OrderSubmission {
      signed,
      state,
      outcome,
    })
  }

  /// Book orders filtered by market and/or maker. Every returned order
  /// has been re-hashed and signature-checked.
  ///
  /// # Errors
  /// `HashMismatch` when a listed order does not round-trip, plus the
  /// usual transport and envelope errors.
  #[instrument(skip(self))]
  pub async fn get_orders(
    &self,
    market_hashes: Option<Vec<B256>>,
    maker: Option<Address>,
  ) -> Result<Vec<BookOrder>> {
    let payload = encode(&OrdersQuery {
      market_hashes,
      maker,
      base_token: None,
    })?;
    let orders: Vec<ApiOrder> = self.query(HttpMethod::Post, paths::ORDERS, Some(payload)).await?;
    let domain = self.signer.domain();
    orders.into_iter().map(|o| o.into_book(domain)).collect()
  }

  /// Greedy fill set for a taker stake.
  ///
  /// The relayer proposes candidate orders; each is re-read from the book,
  /// re-verified and checked locally for eligibility and remaining size.
  ///
  /// # Errors
  /// `InvalidAmount` for a zero stake, `InsufficientLiquidity` when the
  /// eligible book cannot cover it.
  #[instrument(skip(self), fields(desired = %desired_stake))]
  pub async fn suggest_orders(
    &self,
    market_hash: B256,
    desired_stake: TokenAmount,
    is_taker_betting_outcome_one: bool,
    taker: Address,
    base_token: Address,
  ) -> Result<Suggestion> {
    if desired_stake.is_zero() {
      return Err(SportxError::InvalidAmount(
        "desired stake must be positive".into(),
      ));
    }
    let intent = TakerIntent {
      market_hash,
      base_token,
      taker,
      is_taker_betting_outcome_one,
      desired_stake,
    };
    let payload = encode(&SuggestOrdersPayload {
      market_hash,
      base_token,
      taker,
      taker_pay_amount: desired_stake,
      is_taker_betting_outcome_one,
    })?;
    let suggested: SuggestOrdersData = self
      .query(HttpMethod::Post, paths::SUGGEST_ORDERS, Some(payload))
      .await?;

    let book = if suggested.order_hashes.is_empty() {
      Vec::new()
    } else {
      let candidates: HashSet<B256> = suggested.order_hashes.iter().copied().collect();
      let mut book = self.get_orders(Some(vec![market_hash]), None).await?;
      book.retain(|b| candidates.contains(&b.order_hash()));
      book
    };
    let suggestion = select_orders(&book, &intent, &self.policy, unix_now())?;
    debug!(
      candidates = suggested.order_hashes.len(),
      legs = suggestion.legs.len(),
      "Suggested fill set"
    );
    Ok(suggestion)
  }

  /// Sign and submit a taker fill of `stakes[i]` against `orders[i]`.
  ///
  /// # Errors
  /// Local: `LengthMismatch`, `EmptyOrderSet`, `DuplicateOrder`,
  /// `StakeExceedsRemaining`.
  /// A relayer rejection or partial match is returned in the outcome.
  #[instrument(skip_all, fields(orders = orders.len(), stakes = stakes.len()))]
  pub async fn fill_orders(
    &self,
    orders: &[BookOrder],
    stakes: &[TokenAmount],
  ) -> Result<FillSubmission> {
    let fill = Fill::new(orders, stakes)?;
    let signature = self.signer.sign_fill(&fill).await?;

    let payload = encode(&FillPayload {
      taker: self.address(),
      order_hashes: fill.order_hashes.clone(),
      taker_amounts: fill.taker_amounts.clone(),
      fill_salt: fill.fill_salt,
      taker_sig: format_signature(&signature),
    })?;
    let outcome: RelayerOutcome<FillData> = self.submit(paths::FILL_ORDERS, payload).await?;
    if let RelayerOutcome::Accepted(data) = &outcome {
      info!(fill_hash = ?data.fill_hash, total = %fill.total_stake(), "Fill accepted");
    }

    Ok(FillSubmission {
      fill,
      signature,
      outcome,
    })
  }

  /// Cancel orders this client's key made.
  ///
  /// # Errors
  /// `EmptyOrderSet`, or `ForeignOrder` when any order belongs to a
  /// different maker. A relayer rejection is returned in the outcome.
  #[instrument(skip_all, fields(orders = orders.len()))]
  pub async fn cancel_order(
    &self,
    orders: &[SignedOrder],
    message: &str,
  ) -> Result<CancelSubmission> {
    if orders.is_empty() {
      return Err(SportxError::EmptyOrderSet);
    }
    let signer = self.address();
    if let Some(foreign) = orders.iter().find(|o| o.maker() != signer) {
      return Err(SportxError::ForeignOrder {
        order_hash: foreign.order_hash(),
        maker: foreign.maker(),
        signer,
      });
    }
    let hashes: Vec<B256> = orders.iter().map(SignedOrder::order_hash).collect();
    self.cancel_order_hashes(&hashes, message).await
  }

  /// Cancel by hash only. Ownership is left for the relayer to check.
  ///
  /// # Errors
  /// `EmptyOrderSet`, `SigningUnavailable` or `TransportFailure`.
  #[instrument(skip_all, fields(orders = order_hashes.len()))]
  pub async fn cancel_order_hashes(
    &self,
    order_hashes: &[B256],
    message: &str,
  ) -> Result<CancelSubmission> {
    if order_hashes.is_empty() {
      return Err(SportxError::EmptyOrderSet);
    }
    let signature = self.signer.sign_cancellation(message, order_hashes).await?;
    let payload = encode(&CancelPayload {
      maker: self.address(),
      message: message.to_string(),
      order_hashes: order_hashes.to_vec(),
      cancel_signature: format_signature(&signature),
    })?;
    let outcome: RelayerOutcome<CancelData> = self.submit(paths::CANCEL_ORDERS, payload).await?;
    let states = if outcome.is_accepted() {
      info!(count = order_hashes.len(), "Cancellation accepted");
      let cancelled = OrderState::Active.apply(LifecycleEvent::CancelConfirmed)?;
      order_hashes.iter().map(|hash| (*hash, cancelled)).collect()
    } else {
      Vec::new()
    };
    Ok(CancelSubmission {
      order_hashes: order_hashes.to_vec(),
      signature,
      states,
      outcome,
    })
  }

  /// Re-query the book and fold what it shows into `current`.
  ///
  /// An open order that is no longer listed is resolved against the
  /// maker's trades: fully matched is `Filled`, past expiry is `Expired`,
  /// anything else was cancelled.
  ///
  /// # Errors
  /// `InvalidTransition` when the observation contradicts `current`,
  /// plus the errors of `get_orders` and `get_trades`.
  #[instrument(skip(self, signed, current), fields(order_hash = %signed.order_hash(), %current))]
  pub async fn refresh_order_state(
    &self,
    signed: &SignedOrder,
    current: OrderState,
  ) -> Result<OrderState> {
    let order = signed.order();
    let order_hash = signed.order_hash();
    let book = self
      .get_orders(Some(vec![order.market_hash]), Some(order.maker))
      .await?;
    let observed = book.iter().find(|b| b.order_hash() == order_hash);
    let now = unix_now();
    let next = match observed {
      None if current.is_open() => {
        let matched = self.matched_maker_stake(signed).await?;
        current.observe_delisted(matched, order.total_bet_size, order.expiry, now)?
      }
      observed => current.observe(observed, order.expiry, now)?,
    };
    if next != current {
      info!(from = %current, to = %next, "Order state changed");
    }
    Ok(next)
  }

  /// Maker stake matched against one order, from non-failed trades.
  async fn matched_maker_stake(&self, signed: &SignedOrder) -> Result<U256> {
    let order = signed.order();
    let filter = TradeFilter {
      bettor: Some(order.maker),
      market_hashes: Some(vec![order.market_hash]),
      maker: Some(true),
      ..TradeFilter::default()
    };
    let trades = self.get_trades(&filter).await?;
    Ok(trades
      .iter()
      .filter(|t| t.maker && t.order_hash == signed.order_hash() && t.status != TradeStatus::Failed)
      .fold(U256::ZERO, |acc, t| acc + t.stake))
  }

  // ── bets and trades ───────────────────────

  /// # Errors
  /// `TransportFailure`, `RelayerRejected` or `MalformedResponse`.
  #[instrument(skip(self), fields(bettor = %filter.bettor))]
  pub async fn get_pending_or_failed_bets(
    &self,
    filter: &PendingBetsFilter,
  ) -> Result<Vec<PendingBet>> {
    let payload = encode(&PendingBetsQuery::from(filter))?;
    let bets: Vec<ApiPendingBet> = self
      .query(HttpMethod::Post, paths::PENDING_BETS, Some(payload))
      .await?;
    bets.into_iter().map(ApiPendingBet::into_pending_bet).collect()
  }

  /// # Errors
  /// `TransportFailure`, `RelayerRejected` or `MalformedResponse`.
  #[instrument(skip(self))]
  pub async fn get_trades(&self, filter: &TradeFilter) -> Result<Vec<Trade>> {
    let payload = encode(&TradesQuery::from(filter))?;
    let data: TradesData = self.query(HttpMethod::Post, paths::TRADES, Some(payload)).await?;
    data
      .into_trades()
      .into_iter()
      .map(wire::ApiTrade::into_trade)
      .collect()
  }
}

async fn fetch_metadata<R: RelayerTransport>(relayer: &R) -> Result<Metadata> {
  let body = relayer.request(HttpMethod::Get, paths::METADATA, None).await?;
  match wire::open_envelope(body)? {
    RelayerOutcome::Accepted(data) => {
      let metadata: ApiMetadata = wire::decode(data, paths::METADATA)?;
      Ok(metadata.into())
    }
    RelayerOutcome::Rejected { reason } => Err(SportxError::RelayerRejected { reason }),
  }
}
