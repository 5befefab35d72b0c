//! Relayer HTTP Client - Bounded, Timeout-aware REST Client
//!
//! Wraps reqwest with a concurrency limit, a per-request timeout and
//! exponential back-off. Only idempotent GETs are retried; a POST that
//! fails is reported once so an order or fill is never sent twice.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use crate::config::RelayerConfig;
use crate::ports::relayer::{HttpMethod, RelayerTransport, TransportError};

/// Configuration for the relayer HTTP client.
#[derive(Debug, Clone)]
pub struct RelayerClientConfig {
  /// Relayer base URL, without trailing slash.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Maximum concurrent requests.
  pub max_concurrent: usize,
  /// Maximum retries of a GET on transient errors.
  pub max_retries: u32,
  /// Base delay between retries (exponential backoff).
  pub retry_base_delay: Duration,
}

impl From<&RelayerConfig> for RelayerClientConfig {
  fn from(config: &RelayerConfig) -> Self {
    Self {
      base_url: config.base_url.trim_end_matches('/').to_string(),
      timeout: Duration::from_millis(config.timeout_ms),
      max_concurrent: config.max_concurrent,
      max_retries: config.max_retries,
      retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
    }
  }
}

/// Concurrency-limited HTTP client for the relayer API.
pub struct RelayerHttpClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: RelayerClientConfig,
  /// Concurrency limiter.
  semaphore: Arc<Semaphore>,
}

impl RelayerHttpClient {
  /// Create a new relayer client.
  pub fn new(config: RelayerClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent));

    Ok(Self {
      http,
      config,
      semaphore,
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url, path)
  }

  /// Total attempts allowed for `method`.
  const fn attempts(&self, method: HttpMethod) -> u32 {
    if method.is_idempotent() {
      self.config.max_retries + 1
    } else {
      1
    }
  }

  fn backoff(&self, attempt: u32) -> Duration {
    self.config.retry_base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
  }

  /// Hand back any JSON body, whatever the status, for envelope
  /// classification. A non-JSON error body becomes `Status`.
  async fn read_body(response: Response) -> Result<Value, TransportError> {
    let status = response.status();
    let text = response
      .text()
      .await
      .map_err(|e| TransportError::Decode(e.to_string()))?;

    match serde_json::from_str::<Value>(&text) {
      Ok(body) => {
        if !status.is_success() {
          debug!(status = %status, "Relayer error status with JSON body");
        }
        Ok(body)
      }
      Err(e) if status.is_success() => Err(TransportError::Decode(e.to_string())),
      Err(_) => Err(TransportError::Status {
        code: status.as_u16(),
        body: text,
      }),
    }
  }
}

fn is_transient(status: StatusCode) -> bool {
  status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl RelayerTransport for RelayerHttpClient {
  #[instrument(skip_all, fields(method = %method, path = path))]
  async fn request(
    &self,
    method: HttpMethod,
    path: &str,
    payload: Option<Value>,
  ) -> Result<Value, TransportError> {
    let _permit = self
      .semaphore
      .acquire()
      .await
      .map_err(|_| TransportError::Unreachable("client is shut down".into()))?;

    let url = self.url(path);
    let attempts = self.attempts(method);
    let mut last_error = TransportError::Unreachable("no attempt made".into());

    for attempt in 0..attempts {
      if attempt > 0 {
        let delay = self.backoff(attempt);
        debug!(attempt, delay_ms = delay.as_millis(), path, "Retrying request");
        sleep(delay).await;
      }

      let request = match method {
        HttpMethod::Get => self.http.get(&url),
        HttpMethod::Post => self
          .http
          .post(&url)
          .json(payload.as_ref().unwrap_or(&Value::Object(serde_json::Map::new()))),
      };

      match request.send().await {
        Ok(response) => {
          let status = response.status();
          if is_transient(status) && attempt + 1 < attempts {
            warn!(status = %status, path, "Transient relayer status, retrying");
            last_error = TransportError::Status {
              code: status.as_u16(),
              body: String::new(),
            };
            continue;
          }
          return Self::read_body(response).await;
        }
        Err(e) => {
          warn!(error = %e, attempt, %method, path, "Request failed");
          last_error = if e.is_timeout() {
            TransportError::Timeout
          } else {
            TransportError::Unreachable(e.to_string())
          };
        }
      }
    }

    Err(last_error)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(max_retries: u32) -> RelayerHttpClient {
    RelayerHttpClient::new(RelayerClientConfig {
      base_url: "https://relayer.test".into(),
      timeout: Duration::from_millis(100),
      max_concurrent: 2,
      max_retries,
      retry_base_delay: Duration::from_millis(10),
    })
    .unwrap()
  }

  #[test]
  fn test_only_get_is_retried() {
    let c = client(3);
    assert_eq!(c.attempts(HttpMethod::Get), 4);
    assert_eq!(c.attempts(HttpMethod::Post), 1);
  }

  #[test]
  fn test_backoff_doubles() {
    let c = client(3);
    assert_eq!(c.backoff(1), Duration::from_millis(10));
    assert_eq!(c.backoff(2), Duration::from_millis(20));
    assert_eq!(c.backoff(3), Duration::from_millis(40));
  }

  #[test]
  fn test_transient_statuses() {
    assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
    assert!(is_transient(StatusCode::BAD_GATEWAY));
    assert!(!is_transient(StatusCode::BAD_REQUEST));
  }

  #[test]
  fn test_config_strips_trailing_slash() {
    let config = RelayerConfig {
      base_url: "https://relayer.test/".into(),
      ..RelayerConfig::default()
    };
    let client_config = RelayerClientConfig::from(&config);
    assert_eq!(client_config.base_url, "https://relayer.test");
    assert_eq!(client(0).url("/metadata"), "https://relayer.test/metadata");
  }

  #[tokio::test]
  async fn test_unreachable_relayer_is_transport_error() {
    let c = RelayerHttpClient::new(RelayerClientConfig {
      base_url: "http://127.0.0.1:9".into(),
      timeout: Duration::from_millis(200),
      max_concurrent: 1,
      max_retries: 0,
      retry_base_delay: Duration::from_millis(1),
    })
    .unwrap();
    let err = c
      .request(HttpMethod::Post, "/orders/new", None)
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      TransportError::Unreachable(_) | TransportError::Timeout
    ));
  }
}
