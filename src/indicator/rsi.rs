/// Value returned when there is not enough data to judge momentum.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Relative Strength Index over the trailing `period` price transitions.
///
/// Gains and losses are plain averages over the window (no Wilder smoothing).
/// Fewer than `period` prices yields [`NEUTRAL_RSI`]. With exactly `period`
/// prices only `period - 1` transitions exist; their sums are still divided by
/// `period`.
pub fn rsi(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period {
        return NEUTRAL_RSI;
    }

    let start = (prices.len() - period).max(1);
    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in start..prices.len() {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return 100.0;
    }
    if avg_gain == 0.0 {
        return 0.0;
    }

    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}
