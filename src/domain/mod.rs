//! Domain layer - protocol arithmetic, order model and matching rules.
//!
//! Pure logic only: nothing here performs I/O. Hashing and signature
//! recovery come from `alloy` primitives, everything else is plain data.

pub mod convert;
pub mod eip712;
pub mod errors;
pub mod fill;
pub mod lifecycle;
pub mod market;
pub mod order;
pub mod selection;
pub mod trade;

pub use convert::{
    DEFAULT_TOKEN_DECIMALS, ODDS_PRECISION, PercentageOdds, TokenAmount, from_protocol_odds,
    from_protocol_odds_str, odds_scale, to_display_amount, to_protocol_amount,
    to_protocol_amount_f64, to_protocol_odds, to_protocol_odds_f64,
};
pub use eip712::SigningDomain;
pub use errors::{Result, SportxError};
pub use fill::Fill;
pub use lifecycle::{LifecycleEvent, OrderState, RelayerOutcome};
pub use market::{League, Market, MarketStatus, Metadata, Sport};
pub use order::{BookOrder, NewOrder, Order, SignedOrder};
pub use selection::{PriorityKey, SelectionPolicy, SuggestedLeg, Suggestion, TakerIntent};
pub use trade::{PendingBet, PendingBetStatus, PendingBetsFilter, Trade, TradeFilter, TradeStatus};
