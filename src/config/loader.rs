//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, filling environment-derived
//! defaults, validating every parameter and providing clear error
//! messages for misconfiguration.

use std::collections::HashSet;
use std::path::Path;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)
    .with_context(|| format!("Invalid config file: {}", path.display()))?;

  info!(
    environment = %config.network.environment,
    chain_id = config.network.chain_id(),
    relayer = %config.relayer.base_url,
    tokens = config.network.tokens.len(),
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse TOML text, resolve defaults and validate.
///
/// # Errors
/// Returns error on TOML syntax or validation failure.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let mut config: AppConfig = toml::from_str(content).context("Failed to parse config TOML")?;
  resolve_defaults(&mut config);
  validate_config(&config)?;
  Ok(config)
}

/// Fill values that depend on the selected environment.
fn resolve_defaults(config: &mut AppConfig) {
  if config.relayer.base_url.trim().is_empty() {
    config.relayer.base_url = config.network.environment.relayer_url().to_string();
  }
  if config.chain.rpc_url.trim().is_empty() {
    config.chain.rpc_url = config.network.sidechain().default_rpc_url().to_string();
  }
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    LOG_LEVELS.contains(&config.log_level.to_ascii_lowercase().as_str()),
    "log_level must be one of {LOG_LEVELS:?}, got {}",
    config.log_level
  );

  // Relayer validation
  let relayer = &config.relayer;
  anyhow::ensure!(
    relayer.base_url.starts_with("http://") || relayer.base_url.starts_with("https://"),
    "relayer.base_url must be an http(s) URL, got {}",
    relayer.base_url
  );
  anyhow::ensure!(relayer.timeout_ms > 0, "relayer.timeout_ms must be positive");
  anyhow::ensure!(
    relayer.max_concurrent > 0,
    "relayer.max_concurrent must be positive"
  );

  // Network validation
  let network = &config.network;
  anyhow::ensure!(network.chain_id() > 0, "network.chain_id must be positive");
  anyhow::ensure!(
    !network.domain_name.is_empty() && !network.domain_version.is_empty(),
    "network.domain_name and domain_version must not be empty"
  );
  anyhow::ensure!(
    network.verifying_contract != Address::ZERO,
    "network.verifying_contract must be set"
  );
  anyhow::ensure!(
    network.token_transfer_proxy != Address::ZERO,
    "network.token_transfer_proxy must be set"
  );

  let mut seen = HashSet::new();
  for token in &network.tokens {
    anyhow::ensure!(
      !token.symbol.trim().is_empty(),
      "token on {} has empty symbol",
      token.network
    );
    anyhow::ensure!(
      seen.insert((token.symbol.to_ascii_uppercase(), token.network)),
      "token {} listed twice for {}",
      token.symbol,
      token.network
    );
  }

  // Selection validation
  let priority = &config.selection.priority;
  let unique: HashSet<_> = priority.iter().collect();
  anyhow::ensure!(
    unique.len() == priority.len(),
    "selection.priority must not repeat keys, got {priority:?}"
  );

  Ok(())
}
