//! `whereismycity`: serves the location search API until Ctrl-C.
//!
//! The config path comes from the first argument or `WHEREISMYCITY_CONFIG`;
//! without either, defaults plus environment overrides are used.

use std::path::PathBuf;

use anyhow::Context;
use whereismycity::{AppConfig, SearchServer, build_search};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("WHEREISMYCITY_CONFIG").ok())
        .map(PathBuf::from);

    let config = AppConfig::load(config_path.as_deref()).context("failed to load config")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    if let Some(path) = &config_path {
        tracing::info!(path = %path.display(), "config loaded");
    }

    let search = build_search(&config).context("failed to build search service")?;
    let server = SearchServer::start(search, &config.server)
        .await
        .context("failed to start server")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    tracing::info!(addr = %server.addr(), "shutting down");
    server.shutdown();
    Ok(())
}
