use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::synthetic::display_name;
use super::types::{value_to_f64, BinanceKlineRow, BinanceTicker24h};
use super::{decode_response, MarketDataProvider};
use crate::error::AppError;
use crate::model::asset::Asset;
use crate::model::bar::{Granularity, OhlcBar};

const NAME: &str = "binance";
const QUOTE_ASSET: &str = "USDT";

/// Public (unauthenticated) Binance spot market data. Binance does not report
/// market capitalisation, so listed assets carry `market_cap_usd = 0` and the
/// gateway's ranking falls back to 24h quote volume.
pub struct BinanceProvider {
    http: reqwest::Client,
    base_url: String,
}

impl BinanceProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Binance HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn list_assets(&self) -> Result<Vec<Asset>> {
        let url = format!("{}/api/v3/ticker/24hr", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("binance ticker HTTP failed")?;
        let tickers: Vec<BinanceTicker24h> = decode_response(NAME, "ticker", response).await?;

        let assets: Vec<Asset> = tickers.iter().filter_map(asset_from_ticker).collect();
        tracing::debug!(
            tickers = tickers.len(),
            assets = assets.len(),
            "binance tickers received"
        );
        Ok(assets)
    }

    async fn fetch_history(
        &self,
        asset_id: &str,
        granularity: Granularity,
    ) -> Result<Vec<OhlcBar>> {
        let base = asset_id.trim().to_ascii_uppercase();
        if base.is_empty() {
            bail!("asset id is empty");
        }
        let symbol = format!("{}{}", base, QUOTE_ASSET);
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = granularity.bar_count().to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol.as_str()),
                ("interval", kline_interval(granularity)),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .context("binance klines HTTP failed")?;
        let rows: Vec<BinanceKlineRow> = decode_response(NAME, "klines", response).await?;

        let mut bars = rows
            .iter()
            .map(|row| bar_from_kline(row, granularity))
            .collect::<Result<Vec<_>>>()?;
        bars.sort_by_key(|b| b.open_time);
        Ok(bars)
    }
}

fn kline_interval(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Hourly => "1h",
        Granularity::FourHourly => "4h",
        Granularity::Daily => "1d",
    }
}

fn asset_from_ticker(t: &BinanceTicker24h) -> Option<Asset> {
    let base = t.symbol.strip_suffix(QUOTE_ASSET)?;
    if base.is_empty() || t.last_price <= 0.0 {
        return None;
    }
    Some(Asset {
        asset_id: base.to_string(),
        name: display_name(base).unwrap_or(base).to_string(),
        price_usd: t.last_price,
        volume_1day_usd: t.quote_volume,
        market_cap_usd: 0.0,
        change_24h: t.price_change_percent,
        logo_url: None,
    })
}

fn bar_from_kline(row: &[Value], granularity: Granularity) -> Result<OhlcBar> {
    if row.len() < 5 {
        return Err(AppError::Schema(format!(
            "kline row has {} fields, expected at least 5",
            row.len()
        ))
        .into());
    }
    let open_time = row[0]
        .as_u64()
        .ok_or_else(|| AppError::Schema("kline open time is not an integer".to_string()))?;
    let field = |i: usize| -> Result<f64> {
        value_to_f64(&row[i])
            .map_err(|e| AppError::Schema(format!("kline field {}: {}", i, e)).into())
    };
    Ok(OhlcBar {
        open_time,
        close_time: open_time.saturating_add(granularity.period_ms()),
        open: field(1)?,
        high: field(2)?,
        low: field(3)?,
        close: field(4)?,
    })
}
