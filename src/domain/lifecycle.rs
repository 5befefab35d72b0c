//! Client-observed order lifecycle.
//!
//! ```text
//! BUILT → SIGNED → SUBMITTED → {ACTIVE | REJECTED}
//!   ACTIVE → PARTIALLY_FILLED → ... → {FILLED | CANCELLED | EXPIRED}
//! ```
//!
//! Transitions are driven by relayer responses. `Expired` is the only
//! terminal state the client may infer on its own, once `now > expiry`.
//! An open order dropping off the book is relayer evidence: it was
//! filled, cancelled or expired, and `observe_delisted` tells which.

use std::fmt;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use super::errors::{Result, SportxError};
use super::order::BookOrder;

/// Outcome of a write request the relayer answered.
///
/// A rejection is an expected result of concurrent market activity, so
/// it is a value rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayerOutcome<T> {
    Accepted(T),
    Rejected { reason: String },
}

impl<T> RelayerOutcome<T> {
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected { reason } => Some(reason),
        }
    }

    pub fn accepted(self) -> Option<T> {
        match self {
            Self::Accepted(value) => Some(value),
            Self::Rejected { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RelayerOutcome<U> {
        match self {
            Self::Accepted(value) => RelayerOutcome::Accepted(f(value)),
            Self::Rejected { reason } => RelayerOutcome::Rejected { reason },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    Built,
    Signed,
    Submitted,
    Active,
    Rejected,
    PartiallyFilled,
    Filled,
    Cancelled,
    Expired,
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Built => "BUILT",
            Self::Signed => "SIGNED",
            Self::Submitted => "SUBMITTED",
            Self::Active => "ACTIVE",
            Self::Rejected => "REJECTED",
            Self::PartiallyFilled => "PARTIALLY_FILLED",
            Self::Filled => "FILLED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        };
        f.write_str(label)
    }
}

/// Something the client learned about an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Signed,
    Submitted,
    /// Relayer accepted the order into its book.
    Accepted,
    /// Relayer refused the submission.
    Rejected,
    /// Book query reported this much maker stake matched.
    FillObserved { filled: U256, total: U256 },
    /// Relayer confirmed a cancellation.
    CancelConfirmed,
    /// Local clock passed the order's expiry.
    ExpiryPassed,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed => f.write_str("signed"),
            Self::Submitted => f.write_str("submitted"),
            Self::Accepted => f.write_str("accepted"),
            Self::Rejected => f.write_str("rejected"),
            Self::FillObserved { filled, total } => write!(f, "fill {filled}/{total}"),
            Self::CancelConfirmed => f.write_str("cancel confirmed"),
            Self::ExpiryPassed => f.write_str("expiry passed"),
        }
    }
}

impl OrderState {
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Filled | Self::Cancelled | Self::Expired
        )
    }

    /// Resting on the book, possibly partially matched.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Active | Self::PartiallyFilled)
    }

    /// Apply `event`, returning the next state.
    ///
    /// # Errors
    /// `InvalidTransition` when the event cannot happen in this state.
    pub fn apply(self, event: LifecycleEvent) -> Result<Self> {
        use LifecycleEvent as E;

        let next = match (self, event) {
            (Self::Built, E::Signed) => Self::Signed,
            (Self::Signed, E::Submitted) => Self::Submitted,
            (Self::Submitted, E::Accepted) => Self::Active,
            (Self::Submitted, E::Rejected) => Self::Rejected,
            (Self::Active | Self::PartiallyFilled, E::FillObserved { filled, total }) => {
                if filled >= total {
                    Self::Filled
                } else if filled.is_zero() {
                    self
                } else {
                    Self::PartiallyFilled
                }
            }
            (Self::Active | Self::PartiallyFilled, E::CancelConfirmed) => Self::Cancelled,
            (state, E::ExpiryPassed) if !state.is_terminal() => Self::Expired,
            (state, E::FillObserved { .. } | E::CancelConfirmed | E::ExpiryPassed)
                if state.is_terminal() =>
            {
                state
            }
            (from, event) => {
                return Err(SportxError::InvalidTransition {
                    from: from.to_string(),
                    event: event.to_string(),
                });
            }
        };
        Ok(next)
    }

    /// Fold a fresh book observation into the current state.
    ///
    /// `observed` is the order as the relayer currently lists it, or
    /// `None` when it is no longer listed. An unlisted order is only
    /// declared `Expired` once the local clock has passed its expiry;
    /// otherwise the state is left alone until the relayer confirms.
    ///
    /// # Errors
    /// `InvalidTransition` when an observation contradicts this state.
    pub fn observe(self, observed: Option<&BookOrder>, expiry: u64, now: u64) -> Result<Self> {
        if let Some(book) = observed {
            let state = self.apply(LifecycleEvent::FillObserved {
                filled: book.fill_amount,
                total: book.order().total_bet_size,
            })?;
            if state.is_open() && now > expiry {
                return state.apply(LifecycleEvent::ExpiryPassed);
            }
            return Ok(state);
        }
        if now > expiry && !self.is_terminal() {
            return self.apply(LifecycleEvent::ExpiryPassed);
        }
        Ok(self)
    }

    /// Fold the disappearance of a previously open order from the book.
    ///
    /// The relayer only delists an order once it is filled, cancelled or
    /// expired. `matched` is the maker stake its trades account for; when
    /// that falls short of `total` and the expiry has not passed, the
    /// order was cancelled.
    ///
    /// # Errors
    /// `InvalidTransition` when this state is not open.
    pub fn observe_delisted(self, matched: U256, total: U256, expiry: u64, now: u64) -> Result<Self> {
        if !self.is_open() {
            return Err(SportxError::InvalidTransition {
                from: self.to_string(),
                event: "delisted".into(),
            });
        }
        if matched >= total {
            return self.apply(LifecycleEvent::FillObserved {
                filled: matched,
                total,
            });
        }
        if now > expiry {
            return self.apply(LifecycleEvent::ExpiryPassed);
        }
        self.apply(LifecycleEvent::CancelConfirmed)
    }
}
