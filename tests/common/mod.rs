#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::Router;

use market_pulse::market::MarketDataProvider;
use market_pulse::model::asset::Asset;
use market_pulse::model::bar::{Granularity, OhlcBar};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL nothing listens on; connections are refused immediately.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

pub fn asset(id: &str, price: f64, cap: f64) -> Asset {
    Asset {
        asset_id: id.to_string(),
        name: format!("{} Token", id),
        price_usd: price,
        volume_1day_usd: price * 1_000.0,
        market_cap_usd: cap,
        change_24h: 1.5,
        logo_url: None,
    }
}

/// Bars with closes 100, 101, 102, ... one day apart.
pub fn rising_bars(n: usize) -> Vec<OhlcBar> {
    bars_from_closes(&(0..n).map(|i| 100.0 + i as f64).collect::<Vec<_>>())
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcBar> {
    let day = Granularity::Daily.period_ms();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            OhlcBar {
                open_time: i as u64 * day,
                close_time: (i as u64 + 1) * day,
                open,
                high: open.max(close) + 0.5,
                low: open.min(close) - 0.5,
                close,
            }
        })
        .collect()
}

/// Scriptable in-memory provider.
#[derive(Default)]
pub struct FakeProvider {
    pub assets: Vec<Asset>,
    pub fail_listing: bool,
    pub history_len: usize,
    pub fail_history_for: Vec<String>,
    pub history_override: HashMap<String, Vec<OhlcBar>>,
    pub delay_for: HashMap<String, Duration>,
    pub history_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeProvider {
    pub fn with_assets(assets: Vec<Asset>) -> Self {
        Self {
            assets,
            history_len: 30,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    /// Highest number of history fetches observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn list_assets(&self) -> Result<Vec<Asset>> {
        if self.fail_listing {
            bail!("listing unavailable");
        }
        Ok(self.assets.clone())
    }

    async fn fetch_history(&self, asset_id: &str, _granularity: Granularity) -> Result<Vec<OhlcBar>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay_for.get(asset_id) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.fail_history_for.iter().any(|id| id == asset_id) {
            bail!("history for {} unavailable", asset_id);
        }
        if let Some(bars) = self.history_override.get(asset_id) {
            return Ok(bars.clone());
        }
        Ok(rising_bars(self.history_len))
    }
}
