//! Relayer Transport Port - JSON Request/Response Interface
//!
//! The lifecycle client talks to the relayer only through this trait.
//! Implementations own URL building, timeouts and any retry policy;
//! the core never retries on its own.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// HTTP verb of a relayer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
  Get,
  Post,
}

impl HttpMethod {
  /// Whether the call can be repeated without side effects.
  pub const fn is_idempotent(self) -> bool {
    matches!(self, Self::Get)
  }
}

impl fmt::Display for HttpMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Get => f.write_str("GET"),
      Self::Post => f.write_str("POST"),
    }
  }
}

/// The relayer could not be reached or did not answer in JSON.
#[derive(Debug, Error)]
pub enum TransportError {
  #[error("request timed out")]
  Timeout,

  #[error("relayer unreachable: {0}")]
  Unreachable(String),

  /// Non-success HTTP status without a JSON body to classify.
  #[error("HTTP {code}: {body}")]
  Status { code: u16, body: String },

  #[error("response is not JSON: {0}")]
  Decode(String),
}

/// Transport to the relayer HTTP API.
///
/// `path` is relative to the relayer base URL (e.g. `/orders/new`).
/// Any JSON body the relayer returns, including error envelopes, is
/// handed back unchanged for the caller to classify.
#[async_trait]
pub trait RelayerTransport: Send + Sync + 'static {
  async fn request(
    &self,
    method: HttpMethod,
    path: &str,
    payload: Option<Value>,
  ) -> Result<Value, TransportError>;
}
