mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use market_pulse::indicator::signal::RsiSignal;
use market_pulse::market::MarketGateway;
use market_pulse::model::source::DataSource;
use market_pulse::snapshot::snapshot_indicators;

use common::{asset, rising_bars, FakeProvider};

fn three_assets() -> Vec<market_pulse::model::asset::Asset> {
    vec![
        asset("AAA", 10.0, 300.0),
        asset("BBB", 20.0, 200.0),
        asset("CCC", 30.0, 100.0),
    ]
}

#[tokio::test]
async fn failing_asset_yields_partial_entry_in_place() {
    let assets = three_assets();
    let provider = Arc::new(FakeProvider {
        fail_history_for: vec!["BBB".to_string()],
        ..FakeProvider::with_assets(assets.clone())
    });
    let gw = MarketGateway::new(provider.clone());

    let snapshots = snapshot_indicators(&gw, &assets, 15, 1).await;
    let ids: Vec<&str> = snapshots.iter().map(|s| s.asset_id.as_str()).collect();
    assert_eq!(ids, ["AAA", "BBB", "CCC"]);

    assert!(snapshots[0].has_indicators());
    assert_eq!(snapshots[0].source, Some(DataSource::Live));

    let partial = &snapshots[1];
    assert!(!partial.has_indicators());
    assert_eq!(partial.source, None);
    assert_eq!(partial.price_usd, 20.0);
    assert_eq!(partial.volume_1day_usd, 20_000.0);
    assert_eq!(partial.change_24h, 1.5);

    assert!(snapshots[2].has_indicators());
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn limit_caps_processed_assets() {
    let assets: Vec<_> = (0..6)
        .map(|i| asset(&format!("A{}", i), 1.0, 100.0 - i as f64))
        .collect();
    let provider = Arc::new(FakeProvider::with_assets(assets.clone()));
    let gw = MarketGateway::new(provider.clone());

    let snapshots = snapshot_indicators(&gw, &assets, 4, 2).await;
    assert_eq!(snapshots.len(), 4);
    assert_eq!(snapshots[3].asset_id, "A3");
    assert_eq!(provider.calls(), 4);

    assert!(snapshot_indicators(&gw, &assets, 0, 1).await.is_empty());
    assert!(snapshot_indicators(&gw, &[], 10, 1).await.is_empty());
}

#[tokio::test]
async fn concurrent_fetches_keep_input_order() {
    let assets = three_assets();
    let provider = Arc::new(FakeProvider {
        delay_for: HashMap::from([
            ("AAA".to_string(), Duration::from_millis(120)),
            ("BBB".to_string(), Duration::from_millis(60)),
            ("CCC".to_string(), Duration::from_millis(10)),
        ]),
        ..FakeProvider::with_assets(assets.clone())
    });
    let gw = MarketGateway::new(provider.clone());

    let snapshots = snapshot_indicators(&gw, &assets, 15, 3).await;

    let ids: Vec<&str> = snapshots.iter().map(|s| s.asset_id.as_str()).collect();
    assert_eq!(ids, ["AAA", "BBB", "CCC"]);
    assert!(snapshots.iter().all(|s| s.has_indicators()));
    assert_eq!(provider.peak_concurrency(), 3);
}

#[tokio::test]
async fn concurrency_of_one_fetches_sequentially() {
    let assets = three_assets();
    let provider = Arc::new(FakeProvider {
        delay_for: HashMap::from([
            ("AAA".to_string(), Duration::from_millis(20)),
            ("BBB".to_string(), Duration::from_millis(20)),
            ("CCC".to_string(), Duration::from_millis(20)),
        ]),
        ..FakeProvider::with_assets(assets.clone())
    });
    let gw = MarketGateway::new(provider.clone());

    let snapshots = snapshot_indicators(&gw, &assets, 15, 1).await;
    assert_eq!(snapshots.len(), 3);
    assert_eq!(provider.peak_concurrency(), 1);
}

fn assert_send<T: Send>(_: &T) {}

#[test]
fn snapshot_batch_future_is_send() {
    let assets = three_assets();
    let gw = MarketGateway::new(Arc::new(FakeProvider::with_assets(assets.clone())));
    let fut = snapshot_indicators(&gw, &assets, 15, 1);
    assert_send(&fut);
}

#[tokio::test]
async fn offline_snapshots_are_partial_and_unsourced() {
    let assets = three_assets();
    let provider = Arc::new(FakeProvider {
        fail_history_for: assets.iter().map(|a| a.asset_id.clone()).collect(),
        ..FakeProvider::with_assets(assets.clone())
    });
    let gw = MarketGateway::new(provider);

    let snapshots = snapshot_indicators(&gw, &assets, 15, 2).await;
    assert_eq!(snapshots.len(), 3);
    for snap in &snapshots {
        assert!(!snap.has_indicators());
        assert_eq!(snap.source, None);
    }
}

#[tokio::test]
async fn slow_asset_times_out_to_partial() {
    let assets = three_assets();
    let provider = Arc::new(FakeProvider {
        delay_for: HashMap::from([("CCC".to_string(), Duration::from_secs(5))]),
        ..FakeProvider::with_assets(assets.clone())
    });
    let gw = MarketGateway::new(provider).with_history_timeout(Duration::from_millis(100));

    let snapshots = snapshot_indicators(&gw, &assets, 15, 1).await;
    assert_eq!(snapshots.len(), 3);
    assert!(snapshots[0].has_indicators());
    assert!(snapshots[1].has_indicators());
    assert!(!snapshots[2].has_indicators());
}

#[tokio::test]
async fn short_history_omits_macd() {
    let assets = vec![asset("AAA", 119.0, 1.0)];
    let provider = Arc::new(FakeProvider {
        history_override: HashMap::from([("AAA".to_string(), rising_bars(20))]),
        ..FakeProvider::with_assets(assets.clone())
    });
    let gw = MarketGateway::new(provider);

    let snap = &snapshot_indicators(&gw, &assets, 15, 1).await[0];
    assert_eq!(snap.rsi, Some(100.0));
    assert!(snap.bollinger_upper.is_some());
    assert!(snap.bollinger_middle.is_some());
    assert!(snap.bollinger_lower.is_some());
    assert_eq!(snap.macd, None);
    assert_eq!(snap.macd_signal, None);

    let signals = snap.signals();
    assert_eq!(signals.rsi, Some(RsiSignal::Overbought));
    assert_eq!(signals.macd, None);
}

#[tokio::test]
async fn full_history_fills_every_indicator() {
    let assets = vec![asset("AAA", 129.0, 1.0)];
    let gw = MarketGateway::new(Arc::new(FakeProvider::with_assets(assets.clone())));
    let snap = &snapshot_indicators(&gw, &assets, 15, 1).await[0];
    assert!(snap.rsi.is_some());
    assert!(snap.macd.is_some());
    assert!(snap.macd_signal.is_some());
    assert!(snap.bollinger_middle.is_some());
    let middle = snap.bollinger_middle.unwrap();
    assert!((middle - 119.5).abs() < 1e-9);
}

#[test]
fn snapshot_batch_runs_on_a_plain_runtime() {
    let assets = three_assets();
    let gw = MarketGateway::new(Arc::new(FakeProvider::with_assets(assets.clone())));
    let snapshots = tokio_test::block_on(snapshot_indicators(&gw, &assets, 2, 1));
    assert_eq!(snapshots.len(), 2);
    assert!(snapshots.iter().all(|s| s.source == Some(DataSource::Live)));
}
