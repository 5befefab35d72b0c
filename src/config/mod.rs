//! Configuration Module - TOML-based Client Configuration
//!
//! Loads and validates configuration from `config.toml`. Network
//! constants (chain id, contract addresses, token table, relayer URL)
//! are resolved once here and passed by reference afterwards; nothing
//! network-specific is hardcoded in the domain layer.
//!
//! The private key is never part of this file; see
//! `adapters::wallet::PRIVATE_KEY_ENV`.

pub mod loader;

use std::fmt;

use alloy::primitives::Address;
use serde::Deserialize;

use crate::domain::eip712::SigningDomain;
use crate::domain::selection::{PriorityKey, SelectionPolicy};

pub use loader::{load_config, parse_config};

pub const PRODUCTION_RELAYER_URL: &str = "https://app.api.sportx.bet";
pub const RINKEBY_RELAYER_URL: &str = "https://rinkeby.api.sportx.bet";
/// Relayer request timeout in milliseconds.
pub const RELAYER_TIMEOUT_MS: u64 = 10_000;

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Relayer HTTP endpoint and transport limits.
  #[serde(default)]
  pub relayer: RelayerConfig,
  /// Protocol network constants.
  pub network: NetworkConfig,
  /// Sidechain RPC used for approvals.
  #[serde(default)]
  pub chain: ChainConfig,
  /// Fill-set selection priority.
  #[serde(default)]
  pub selection: SelectionConfig,
}

/// Deployment environment of the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  Production,
  Rinkeby,
}

impl Environment {
  pub const fn relayer_url(self) -> &'static str {
    match self {
      Self::Production => PRODUCTION_RELAYER_URL,
      Self::Rinkeby => RINKEBY_RELAYER_URL,
    }
  }

  pub const fn sidechain_network(self) -> SidechainNetwork {
    match self {
      Self::Production => SidechainNetwork::MaticMainnet,
      Self::Rinkeby => SidechainNetwork::MaticTestnet,
    }
  }
}

impl fmt::Display for Environment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Production => f.write_str("production"),
      Self::Rinkeby => f.write_str("rinkeby"),
    }
  }
}

/// Sidechain where orders settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidechainNetwork {
  MaticMainnet,
  MaticTestnet,
}

impl SidechainNetwork {
  pub const fn chain_id(self) -> u64 {
    match self {
      Self::MaticMainnet => 137,
      Self::MaticTestnet => 80_001,
    }
  }

  pub const fn default_rpc_url(self) -> &'static str {
    match self {
      Self::MaticMainnet => "https://rpc-mainnet.matic.network",
      Self::MaticTestnet => "https://rpc-mumbai.matic.today",
    }
  }
}

impl fmt::Display for SidechainNetwork {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::MaticMainnet => f.write_str("matic_mainnet"),
      Self::MaticTestnet => f.write_str("matic_testnet"),
    }
  }
}

/// Relayer endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayerConfig {
  /// Relayer base URL. Empty means the environment default.
  #[serde(default)]
  pub base_url: String,
  /// Request timeout in milliseconds.
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  /// Maximum concurrent requests.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent: usize,
  /// Retries for idempotent GETs. POSTs are never retried.
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
  /// Base delay for exponential back-off (milliseconds).
  #[serde(default = "default_retry_base_delay_ms")]
  pub retry_base_delay_ms: u64,
}

impl Default for RelayerConfig {
  fn default() -> Self {
    Self {
      base_url: String::new(),
      timeout_ms: default_timeout_ms(),
      max_concurrent: default_max_concurrent(),
      max_retries: default_max_retries(),
      retry_base_delay_ms: default_retry_base_delay_ms(),
    }
  }
}

/// One row of the token address table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenEntry {
  /// Token symbol, e.g. `DAI`.
  pub symbol: String,
  pub network: SidechainNetwork,
  pub address: Address,
}

/// Protocol network constants.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
  pub environment: Environment,
  /// Overrides the sidechain's chain id.
  #[serde(default)]
  pub chain_id: Option<u64>,
  /// EIP-712 domain name.
  #[serde(default = "default_domain_name")]
  pub domain_name: String,
  /// EIP-712 domain version.
  #[serde(default = "default_domain_version")]
  pub domain_version: String,
  /// EIP-712 verifying contract.
  pub verifying_contract: Address,
  /// Spender authorised by `approve_sportx_contracts`.
  pub token_transfer_proxy: Address,
  /// Token addresses keyed by symbol and sidechain.
  #[serde(default)]
  pub tokens: Vec<TokenEntry>,
}

impl NetworkConfig {
  pub const fn sidechain(&self) -> SidechainNetwork {
    self.environment.sidechain_network()
  }

  pub fn chain_id(&self) -> u64 {
    self.chain_id.unwrap_or_else(|| self.sidechain().chain_id())
  }

  /// Address of `symbol` on the current environment's sidechain.
  pub fn token_address(&self, symbol: &str) -> Option<Address> {
    let network = self.sidechain();
    self
      .tokens
      .iter()
      .find(|t| t.network == network && t.symbol.eq_ignore_ascii_case(symbol))
      .map(|t| t.address)
  }

  /// EIP-712 domain every order, fill and cancellation is signed under.
  pub fn signing_domain(&self) -> SigningDomain {
    SigningDomain::new(
      &self.domain_name,
      &self.domain_version,
      self.chain_id(),
      self.verifying_contract,
    )
  }
}

/// Sidechain RPC configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainConfig {
  /// RPC endpoint. Empty means the sidechain default.
  #[serde(default)]
  pub rpc_url: String,
}

/// Priority applied by `suggest_orders`; order hash breaks final ties.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
  #[serde(default = "default_priority")]
  pub priority: Vec<PriorityKey>,
}

impl Default for SelectionConfig {
  fn default() -> Self {
    Self {
      priority: default_priority(),
    }
  }
}

impl SelectionConfig {
  pub fn policy(&self) -> SelectionPolicy {
    SelectionPolicy::new(self.priority.clone())
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

const fn default_timeout_ms() -> u64 {
  RELAYER_TIMEOUT_MS
}

const fn default_max_concurrent() -> usize {
  8
}

const fn default_max_retries() -> u32 {
  2
}

const fn default_retry_base_delay_ms() -> u64 {
  250
}

fn default_domain_name() -> String {
  "SportX".to_string()
}

fn default_domain_version() -> String {
  "1.0".to_string()
}

fn default_priority() -> Vec<PriorityKey> {
  SelectionPolicy::default().priority
}
