use serde::{Deserialize, Serialize};

use super::sma::{population_std_dev, sma};

pub const BAND_WIDTH_STD_DEVS: f64 = 2.0;
/// Placeholder band (+/-5% of the last price) used before a full window exists.
pub const FALLBACK_UPPER_FACTOR: f64 = 1.05;
pub const FALLBACK_LOWER_FACTOR: f64 = 0.95;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands over the trailing `period` prices, two population standard
/// deviations wide.
///
/// With fewer than `period` prices a synthetic +/-5% band around the last
/// price is returned instead; an empty input yields all zeros.
pub fn bollinger_bands(prices: &[f64], period: usize) -> BollingerBands {
    match (sma(prices, period), population_std_dev(prices, period)) {
        (Some(middle), Some(std_dev)) => {
            let half_width = BAND_WIDTH_STD_DEVS * std_dev;
            BollingerBands {
                upper: middle + half_width,
                middle,
                lower: middle - half_width,
            }
        }
        _ => {
            let last = prices.last().copied().unwrap_or(0.0);
            BollingerBands {
                upper: last * FALLBACK_UPPER_FACTOR,
                middle: last,
                lower: last * FALLBACK_LOWER_FACTOR,
            }
        }
    }
}

impl BollingerBands {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_collapses_band() {
        let b = bollinger_bands(&[50.0; 20], 20);
        assert_eq!(b.upper, 50.0);
        assert_eq!(b.middle, 50.0);
        assert_eq!(b.lower, 50.0);
        assert_eq!(b.width(), 0.0);
    }

    #[test]
    fn empty_input_is_all_zero() {
        assert_eq!(bollinger_bands(&[], 20), BollingerBands::default());
    }

    #[test]
    fn known_values() {
        let prices = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let b = bollinger_bands(&prices, 8);
        assert!((b.middle - 5.0).abs() < 1e-12);
        assert!((b.upper - 9.0).abs() < 1e-12);
        assert!((b.lower - 1.0).abs() < 1e-12);
    }
}
