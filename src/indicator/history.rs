use super::bollinger::bollinger_bands;
use super::macd::macd;
use super::rsi::rsi;
use crate::model::bar::{closes, Granularity, OhlcBar};
use crate::model::indicator::{
    IndicatorHistory, IndicatorHistoryPoint, IndicatorKind, BOLLINGER_PERIOD, RSI_PERIOD,
};

/// Replay an indicator over every prefix of `bars` for charting.
///
/// One point is emitted per prefix whose length reaches the indicator's
/// minimum window, stamped with the open time of the prefix's last bar, so
/// the output has `bars.len() - (window - 1)` points (none when the series is
/// shorter than the window). Each prefix is recomputed from scratch, which is
/// O(n * window); fine for dashboard-sized windows.
pub fn indicator_history(
    bars: &[OhlcBar],
    kind: IndicatorKind,
    granularity: Granularity,
) -> IndicatorHistory {
    let prices = closes(bars);
    let window = kind.min_window();

    let points: Vec<IndicatorHistoryPoint> = if bars.len() < window {
        Vec::new()
    } else {
        (window..=bars.len())
            .map(|n| point_at(kind, &prices[..n], bars[n - 1].open_time))
            .collect()
    };

    tracing::debug!(
        kind = %kind,
        granularity = %granularity,
        bars = bars.len(),
        points = points.len(),
        "indicator history computed"
    );

    IndicatorHistory {
        asset_id: None,
        kind,
        granularity,
        points,
    }
}

fn point_at(kind: IndicatorKind, prefix: &[f64], time: u64) -> IndicatorHistoryPoint {
    match kind {
        IndicatorKind::Rsi => IndicatorHistoryPoint {
            time,
            value: rsi(prefix, RSI_PERIOD),
            signal: None,
            upper: None,
            lower: None,
        },
        IndicatorKind::Macd => {
            let m = macd(prefix);
            IndicatorHistoryPoint {
                time,
                value: m.macd,
                signal: Some(m.signal),
                upper: None,
                lower: None,
            }
        }
        IndicatorKind::Bollinger => {
            let b = bollinger_bands(prefix, BOLLINGER_PERIOD);
            IndicatorHistoryPoint {
                time,
                value: b.middle,
                signal: None,
                upper: Some(b.upper),
                lower: Some(b.lower),
            }
        }
    }
}
