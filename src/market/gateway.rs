use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};

use super::synthetic::{fallback_assets, synthetic_history};
use super::MarketDataProvider;
use crate::error::AppError;
use crate::model::asset::{rank_by_market_cap, Asset};
use crate::model::bar::{Granularity, OhlcBar};
use crate::model::source::Sourced;

pub const DEFAULT_TOP_N: usize = 20;
pub const DEFAULT_HISTORY_TIMEOUT: Duration = Duration::from_secs(10);

/// Front door for market data. Wraps any [`MarketDataProvider`], applies the
/// listing conventions (market-cap ranking, top-N) and substitutes synthetic
/// data whenever the provider fails, tagging every result with its
/// provenance.
#[derive(Clone)]
pub struct MarketGateway {
    provider: Arc<dyn MarketDataProvider>,
    top_n: usize,
    history_timeout: Duration,
}

impl MarketGateway {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            top_n: DEFAULT_TOP_N,
            history_timeout: DEFAULT_HISTORY_TIMEOUT,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    pub fn with_history_timeout(mut self, timeout: Duration) -> Self {
        self.history_timeout = timeout;
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Ranked top-N assets. Never fails: a provider error or an empty listing
    /// yields the static fallback list.
    pub async fn list_assets(&self) -> Sourced<Vec<Asset>> {
        match self.provider.list_assets().await {
            Ok(mut assets) if !assets.is_empty() => {
                rank_by_market_cap(&mut assets);
                assets.truncate(self.top_n);
                tracing::debug!(
                    provider = self.provider.name(),
                    count = assets.len(),
                    "asset listing refreshed"
                );
                Sourced::live(assets)
            }
            Ok(_) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    "provider returned no assets, serving fallback listing"
                );
                Sourced::fallback(self.fallback_listing())
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    error = %format!("{:#}", e),
                    "asset listing failed, serving fallback listing"
                );
                Sourced::fallback(self.fallback_listing())
            }
        }
    }

    /// History for one asset. Never fails: a provider error, timeout or empty
    /// series yields a synthetic walk ending at the current period.
    pub async fn fetch_history(
        &self,
        asset_id: &str,
        granularity: Granularity,
    ) -> Sourced<Vec<OhlcBar>> {
        match self.try_fetch_history(asset_id, granularity).await {
            Ok(bars) => Sourced::live(bars),
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    asset_id,
                    granularity = %granularity,
                    error = %format!("{:#}", e),
                    "history fetch failed, serving synthetic series"
                );
                let now_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
                Sourced::fallback(synthetic_history(
                    asset_id,
                    granularity,
                    granularity.align(now_ms),
                ))
            }
        }
    }

    /// Live-only history, bounded by the gateway's history timeout. The
    /// series is sorted, de-duplicated by open time and capped at the
    /// granularity's bar count. An empty series is an error.
    pub async fn try_fetch_history(
        &self,
        asset_id: &str,
        granularity: Granularity,
    ) -> Result<Vec<OhlcBar>> {
        let fetch = self.provider.fetch_history(asset_id, granularity);
        let mut bars = match tokio::time::timeout(self.history_timeout, fetch).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(AppError::Timeout(format!(
                    "{} history for {} after {:?}",
                    self.provider.name(),
                    asset_id,
                    self.history_timeout
                ))
                .into())
            }
        };

        bars.sort_by_key(|b| b.open_time);
        bars.dedup_by_key(|b| b.open_time);
        let excess = bars.len().saturating_sub(granularity.bar_count());
        bars.drain(..excess);

        if bars.is_empty() {
            bail!("{} returned an empty history for {}", self.provider.name(), asset_id);
        }
        Ok(bars)
    }

    fn fallback_listing(&self) -> Vec<Asset> {
        let mut assets = fallback_assets();
        assets.truncate(self.top_n);
        assets
    }
}
