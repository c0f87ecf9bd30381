//! Market data gateway: a provider-agnostic capability trait, concrete
//! provider adapters, deterministic synthetic fallback data, and the
//! [`MarketGateway`] that ties them together.

pub mod binance;
pub mod coinapi;
pub mod gateway;
pub mod synthetic;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::{MarketConfig, ProviderKind};
use crate::error::{compact_error_body, AppError};
use crate::model::asset::Asset;
use crate::model::bar::{Granularity, OhlcBar};

pub use binance::BinanceProvider;
pub use coinapi::CoinApiProvider;
pub use gateway::MarketGateway;

/// What a market-data provider must offer. Implementations only speak their
/// provider's protocol and report failures; ranking, truncation and fallback
/// are the gateway's job.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Current asset listing in any order.
    async fn list_assets(&self) -> Result<Vec<Asset>>;

    /// Most recent `granularity.bar_count()` bars, oldest first.
    async fn fetch_history(&self, asset_id: &str, granularity: Granularity)
        -> Result<Vec<OhlcBar>>;
}

/// Build the provider selected in config.
pub fn provider_from_config(cfg: &MarketConfig) -> Result<Arc<dyn MarketDataProvider>> {
    let provider: Arc<dyn MarketDataProvider> = match cfg.provider {
        ProviderKind::CoinApi => Arc::new(CoinApiProvider::new(
            &cfg.coinapi_base_url,
            &cfg.coinapi_key,
            cfg.request_timeout(),
        )?),
        ProviderKind::Binance => Arc::new(BinanceProvider::new(
            &cfg.binance_base_url,
            cfg.request_timeout(),
        )?),
    };
    tracing::info!(provider = provider.name(), "market data provider configured");
    Ok(provider)
}

/// Turn a non-2xx response into [`AppError::ProviderStatus`], otherwise
/// decode the JSON body. Body read and decode failures surface as
/// [`AppError::Http`] and [`AppError::Json`].
pub(crate) async fn decode_response<T: DeserializeOwned>(
    provider: &'static str,
    what: &str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::ProviderStatus {
            provider,
            status: status.as_u16(),
            body: compact_error_body(&body),
        }
        .into());
    }
    let body = response.text().await.map_err(AppError::Http)?;
    serde_json::from_str::<T>(&body)
        .map_err(AppError::Json)
        .with_context(|| format!("{} {} JSON parse failed", provider, what))
}
