//! # Whiteflag Gateway Node
//!
//! Entry point for a stand-alone gateway core. Chain wire clients and the
//! full codec pipeline are provided by the embedding application; on its
//! own the binary runs the state store, the streams, the management plane
//! and the authentication plane.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gateway_runtime::{Gateway, GatewayConfig, UnresolvedRetriever};
use wf_auth::HttpSignatureFetcher;
use wf_state::FileDatastore;

/// Default config path when none is given on the command line.
const DEFAULT_CONFIG_PATH: &str = "./config/gateway.json";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = GatewayConfig::load(&config_path)
        .with_context(|| format!("loading {config_path}"))?;

    info!(config = config_path.as_str(), "starting whiteflag gateway");
    if !config.listeners.is_empty() {
        warn!(
            chains = config.listeners.len(),
            "listeners configured, but chain wire clients are provided by the embedding application"
        );
    }

    let datastore = Arc::new(FileDatastore::new(&config.datastore_file));
    let fetcher = Arc::new(
        HttpSignatureFetcher::new(Duration::from_secs(10))
            .context("building signature fetcher")?,
    );
    let retriever = Arc::new(UnresolvedRetriever::new());

    let mut gateway =
        Gateway::new(config, datastore, fetcher, retriever).context("assembling gateway")?;
    gateway.start().await.context("starting gateway")?;

    info!("gateway is running, press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    info!("shutting down");
    gateway.shutdown().await.context("shutting down gateway")?;
    Ok(())
}
