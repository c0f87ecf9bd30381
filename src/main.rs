use std::sync::Arc;

use anyhow::{Context, Result};

use market_pulse::api::{self, AppState};
use market_pulse::assistant::AssistantClient;
use market_pulse::config::Config;
use market_pulse::market::{provider_from_config, MarketGateway};
use market_pulse::news::NewsClient;

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config
            .logging
            .level
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::warn!("Shutdown signal received, stopping");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure config/default.toml exists (or set MARKET_PULSE_CONFIG)");
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    tracing::info!(
        provider = ?config.market.provider,
        top_n = config.market.top_n,
        bind_addr = %config.server.bind_addr,
        "Starting market-pulse"
    );
    if config.market.coinapi_key.is_empty() {
        tracing::warn!("COINAPI_KEY not set; CoinAPI requests will fall back to synthetic data");
    }

    let provider = provider_from_config(&config.market)?;
    let gateway = MarketGateway::new(provider)
        .with_top_n(config.market.top_n)
        .with_history_timeout(config.indicators.history_timeout());

    let timeout = config.market.request_timeout();
    let state = Arc::new(AppState {
        gateway,
        assistant: AssistantClient::new(&config.assistant, timeout)?,
        news: NewsClient::new(&config.news, timeout)?,
        snapshot_limit: config.indicators.snapshot_limit,
        snapshot_concurrency: config.indicators.snapshot_concurrency,
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "API server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    tracing::info!("market-pulse shut down complete");
    Ok(())
}
