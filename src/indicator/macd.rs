use serde::{Deserialize, Serialize};

use super::sma::sma;
use crate::model::indicator::{MACD_FAST, MACD_SIGNAL, MACD_SLOW};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
}

impl Macd {
    pub fn histogram(&self) -> f64 {
        self.macd - self.signal
    }
}

/// MACD line as the difference of the 12- and 26-period simple averages, with
/// the signal line taken as the 9-period simple average of the prices
/// themselves. This differs from the textbook EMA-based MACD; dashboards built
/// on these numbers expect it.
///
/// Fewer than 26 prices yields `{0, 0}`.
pub fn macd(prices: &[f64]) -> Macd {
    match (
        sma(prices, MACD_FAST),
        sma(prices, MACD_SLOW),
        sma(prices, MACD_SIGNAL),
    ) {
        (Some(fast), Some(slow), Some(signal)) => Macd {
            macd: fast - slow,
            signal,
        },
        _ => Macd::default(),
    }
}
