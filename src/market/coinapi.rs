use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::header::{HeaderMap, HeaderValue};

use super::types::{CoinApiAsset, CoinApiOhlcv};
use super::{decode_response, MarketDataProvider};
use crate::model::asset::Asset;
use crate::model::bar::{Granularity, OhlcBar};

const NAME: &str = "coinapi";
const ICON_BASE_URL: &str = "https://s3.eu-central-1.amazonaws.com/bbxt-static-icons/type-id/png_32";

pub struct CoinApiProvider {
    http: reqwest::Client,
    base_url: String,
    has_key: bool,
}

impl CoinApiProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let has_key = !api_key.trim().is_empty();
        if has_key {
            headers.insert("X-CoinAPI-Key", HeaderValue::from_str(api_key.trim())?);
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("failed to build CoinAPI HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            has_key,
        })
    }

    fn ensure_key(&self) -> Result<()> {
        if !self.has_key {
            bail!("COINAPI_KEY not set in .env or environment");
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for CoinApiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn list_assets(&self) -> Result<Vec<Asset>> {
        self.ensure_key()?;
        let url = format!("{}/v1/assets", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("coinapi list_assets HTTP failed")?;
        let raw: Vec<CoinApiAsset> = decode_response(NAME, "list_assets", response).await?;

        let assets: Vec<Asset> = raw.into_iter().filter_map(asset_from_coinapi).collect();
        tracing::debug!(count = assets.len(), "coinapi assets received");
        Ok(assets)
    }

    async fn fetch_history(
        &self,
        asset_id: &str,
        granularity: Granularity,
    ) -> Result<Vec<OhlcBar>> {
        self.ensure_key()?;
        let asset_id = asset_id.trim().to_ascii_uppercase();
        if asset_id.is_empty() {
            bail!("asset id is empty");
        }
        let url = format!("{}/v1/ohlcv/{}/USD/history", self.base_url, asset_id);
        let limit = granularity.bar_count().to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("period_id", granularity.as_period_id()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .context("coinapi fetch_history HTTP failed")?;
        let raw: Vec<CoinApiOhlcv> = decode_response(NAME, "fetch_history", response).await?;

        let mut bars = raw
            .iter()
            .map(|row| bar_from_coinapi(row, granularity))
            .collect::<Result<Vec<_>>>()?;
        bars.sort_by_key(|b| b.open_time);
        Ok(bars)
    }
}

/// Only crypto assets with a USD price are listed.
fn asset_from_coinapi(raw: CoinApiAsset) -> Option<Asset> {
    let price_usd = raw.price_usd.filter(|p| *p > 0.0)?;
    if raw.type_is_crypto != 1 {
        return None;
    }
    let logo_url = raw
        .id_icon
        .as_deref()
        .map(str::trim)
        .filter(|icon| !icon.is_empty())
        .map(|icon| format!("{}/{}.png", ICON_BASE_URL, icon.replace('-', "").to_lowercase()));
    Some(Asset {
        name: raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| raw.asset_id.clone()),
        asset_id: raw.asset_id,
        price_usd,
        volume_1day_usd: raw.volume_1day_usd.unwrap_or(0.0),
        market_cap_usd: raw.market_cap_usd.unwrap_or(0.0),
        change_24h: raw.price_usd_change_24h.unwrap_or(0.0),
        logo_url,
    })
}

fn bar_from_coinapi(raw: &CoinApiOhlcv, granularity: Granularity) -> Result<OhlcBar> {
    let open_time = parse_rfc3339_ms(&raw.time_period_start)?;
    let close_time = match raw.time_period_end.as_deref() {
        Some(end) => parse_rfc3339_ms(end)?,
        None => open_time.saturating_add(granularity.period_ms()),
    };
    Ok(OhlcBar {
        open_time,
        close_time,
        open: raw.rate_open,
        high: raw.rate_high,
        low: raw.rate_low,
        close: raw.rate_close,
    })
}

fn parse_rfc3339_ms(s: &str) -> Result<u64> {
    let dt =
        DateTime::parse_from_rfc3339(s).with_context(|| format!("invalid timestamp '{}'", s))?;
    Ok(dt.timestamp_millis().max(0) as u64)
}
