//! Batch indicator snapshots for the market overview.

use futures_util::stream::{self, StreamExt};
use serde::Serialize;

use crate::indicator::signal::{
    classify_bands, classify_macd, classify_rsi, BandSignal, MacdSignal, RsiSignal,
};
use crate::indicator::{bollinger_bands, macd, rsi};
use crate::market::MarketGateway;
use crate::model::asset::Asset;
use crate::model::bar::{closes, Granularity};
use crate::model::indicator::{IndicatorSnapshot, BOLLINGER_PERIOD, MACD_SLOW, RSI_PERIOD};
use crate::model::source::DataSource;

pub const DEFAULT_SNAPSHOT_LIMIT: usize = 15;

/// Snapshot granularity used for the overview table.
pub const SNAPSHOT_GRANULARITY: Granularity = Granularity::Daily;

/// Compute indicator snapshots for the first `per_asset_limit` assets.
///
/// Each asset is handled independently: if its daily history cannot be
/// fetched (error, timeout, empty series) its entry keeps price, volume and
/// change but has every indicator absent. Up to `concurrency` fetches run at
/// once; output order always matches input order.
pub async fn snapshot_indicators(
    gateway: &MarketGateway,
    assets: &[Asset],
    per_asset_limit: usize,
    concurrency: usize,
) -> Vec<IndicatorSnapshot> {
    let selected = &assets[..assets.len().min(per_asset_limit)];

    let snapshots: Vec<IndicatorSnapshot> = stream::iter(selected.iter().cloned())
        .map(|asset| async move { snapshot_one(gateway, &asset).await })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let partial = snapshots.iter().filter(|s| s.source.is_none()).count();
    tracing::info!(
        assets = snapshots.len(),
        partial,
        provider = gateway.provider_name(),
        "indicator snapshots computed"
    );
    snapshots
}

async fn snapshot_one(gateway: &MarketGateway, asset: &Asset) -> IndicatorSnapshot {
    match gateway
        .try_fetch_history(&asset.asset_id, SNAPSHOT_GRANULARITY)
        .await
    {
        Ok(bars) => compute_snapshot(asset, &closes(&bars), DataSource::Live),
        Err(e) => {
            tracing::warn!(
                asset_id = %asset.asset_id,
                error = %format!("{:#}", e),
                "history unavailable, emitting partial snapshot"
            );
            partial_snapshot(asset)
        }
    }
}

/// Snapshot from a known closing-price series. Each indicator is present only
/// once the series covers its window.
pub fn compute_snapshot(asset: &Asset, prices: &[f64], source: DataSource) -> IndicatorSnapshot {
    if prices.is_empty() {
        return partial_snapshot(asset);
    }

    let mut snapshot = partial_snapshot(asset);
    snapshot.source = Some(source);

    if prices.len() >= RSI_PERIOD {
        snapshot.rsi = Some(rsi(prices, RSI_PERIOD));
    }
    if prices.len() >= MACD_SLOW {
        let m = macd(prices);
        snapshot.macd = Some(m.macd);
        snapshot.macd_signal = Some(m.signal);
    }
    if prices.len() >= BOLLINGER_PERIOD {
        let b = bollinger_bands(prices, BOLLINGER_PERIOD);
        snapshot.bollinger_upper = Some(b.upper);
        snapshot.bollinger_middle = Some(b.middle);
        snapshot.bollinger_lower = Some(b.lower);
    }
    snapshot
}

/// Entry with market fields only.
pub fn partial_snapshot(asset: &Asset) -> IndicatorSnapshot {
    IndicatorSnapshot {
        asset_id: asset.asset_id.clone(),
        name: asset.name.clone(),
        price_usd: asset.price_usd,
        volume_1day_usd: asset.volume_1day_usd,
        change_24h: asset.change_24h,
        rsi: None,
        macd: None,
        macd_signal: None,
        bollinger_upper: None,
        bollinger_middle: None,
        bollinger_lower: None,
        source: None,
    }
}

/// Dashboard labels derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotSignals {
    pub rsi: Option<RsiSignal>,
    pub macd: Option<MacdSignal>,
    pub bands: Option<BandSignal>,
}

impl IndicatorSnapshot {
    pub fn signals(&self) -> SnapshotSignals {
        SnapshotSignals {
            rsi: self.rsi.map(classify_rsi),
            macd: self
                .macd
                .zip(self.macd_signal)
                .map(|(m, s)| classify_macd(m, s)),
            bands: self
                .bollinger_upper
                .zip(self.bollinger_lower)
                .map(|(upper, lower)| classify_bands(self.price_usd, upper, lower)),
        }
    }
}
