//! SportX Order Engine — Entry Point
//!
//! Wires the adapters into a `SportX` client and reports what the
//! relayer currently offers.
//!
//! Wiring sequence:
//! 1. Load config.toml (path from SPORTX_CONFIG) + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Load the signing key from SPORTX_PRIVATE_KEY
//! 4. Create RelayerHttpClient (timeout + bounded concurrency + GET retry)
//! 5. Connect the sidechain provider and ERC-20 approver
//! 6. Connect SportX (fetches relayer metadata)
//! 7. Log metadata and the active market count

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use sportx_order_engine::adapters::api::{RelayerClientConfig, RelayerHttpClient};
use sportx_order_engine::adapters::chain::{Erc20Approver, SidechainProvider};
use sportx_order_engine::adapters::wallet::LocalKeySigner;
use sportx_order_engine::config;
use sportx_order_engine::usecases::SportX;

const CONFIG_ENV: &str = "SPORTX_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = config::load_config(&path).context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.network.environment,
        relayer = %config.relayer.base_url,
        "Starting SportX order engine"
    );

    // ── 3. Signing key from env ─────────────────────────────
    let key = Arc::new(LocalKeySigner::from_env().context("Failed to load signing key")?);

    // ── 4. Relayer HTTP client ──────────────────────────────
    let relayer = Arc::new(
        RelayerHttpClient::new(RelayerClientConfig::from(&config.relayer))
            .context("Failed to create relayer client")?,
    );

    // ── 5. Sidechain provider + approver ────────────────────
    let provider = SidechainProvider::connect(
        &config.chain,
        config.network.chain_id(),
        key.alloy_signer(),
    )
    .await
    .context("Failed to connect to sidechain RPC")?;
    if !provider.is_healthy().await {
        warn!("Sidechain RPC did not answer a block number probe");
    }
    let approver = Arc::new(Erc20Approver::new(provider));

    // ── 6. Connect the lifecycle client ─────────────────────
    let sportx = SportX::connect(relayer, key, approver, &config)
        .await
        .context("Failed to connect to relayer")?;

    // ── 7. Report ───────────────────────────────────────────
    let metadata = sportx.metadata();
    info!(
        executor = %metadata.executor_address,
        protocol_version = %metadata.version,
        address = %sportx.address(),
        "Relayer metadata"
    );

    let markets = sportx
        .get_active_markets()
        .await
        .context("Failed to fetch active markets")?;
    info!(active_markets = markets.len(), "Active markets fetched");

    Ok(())
}
