use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

const HOUR_MS: u64 = 3_600_000;

/// One OHLC record for a fixed period. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub open_time: u64,
    pub close_time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcBar {
    /// True when high/low bracket both open and close.
    pub fn is_consistent(&self) -> bool {
        self.high >= self.open.max(self.close).max(self.low)
            && self.low <= self.open.min(self.close).min(self.high)
    }
}

/// Extract the closing-price sequence the indicator engine works on.
pub fn closes(bars: &[OhlcBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Sampling period of a history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    #[serde(rename = "1HRS")]
    Hourly,
    #[serde(rename = "4HRS")]
    FourHourly,
    #[serde(rename = "1DAY")]
    Daily,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Self::Hourly, Self::FourHourly, Self::Daily];

    pub fn period_ms(self) -> u64 {
        match self {
            Self::Hourly => HOUR_MS,
            Self::FourHourly => 4 * HOUR_MS,
            Self::Daily => 24 * HOUR_MS,
        }
    }

    /// Number of bars requested for one history window.
    pub fn bar_count(self) -> usize {
        match self {
            Self::Hourly => 24,
            Self::FourHourly => 42,
            Self::Daily => 30,
        }
    }

    pub fn as_period_id(self) -> &'static str {
        match self {
            Self::Hourly => "1HRS",
            Self::FourHourly => "4HRS",
            Self::Daily => "1DAY",
        }
    }

    /// Start of the period containing `timestamp_ms`.
    pub fn align(self, timestamp_ms: u64) -> u64 {
        timestamp_ms - (timestamp_ms % self.period_ms())
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_period_id())
    }
}

impl FromStr for Granularity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1HRS" | "1H" => Ok(Self::Hourly),
            "4HRS" | "4H" => Ok(Self::FourHourly),
            "1DAY" | "1D" => Ok(Self::Daily),
            _ => bail!(
                "invalid granularity '{}': expected one of 1HRS/4HRS/1DAY",
                s
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_sizes_per_granularity() {
        assert_eq!(Granularity::Hourly.bar_count(), 24);
        assert_eq!(Granularity::FourHourly.bar_count(), 42);
        assert_eq!(Granularity::Daily.bar_count(), 30);
        assert_eq!(Granularity::FourHourly.period_ms(), 14_400_000);
    }

    #[test]
    fn parses_wire_names_and_short_forms() {
        assert_eq!("1DAY".parse::<Granularity>().unwrap(), Granularity::Daily);
        assert_eq!("4hrs".parse::<Granularity>().unwrap(), Granularity::FourHourly);
        assert_eq!(" 1h ".parse::<Granularity>().unwrap(), Granularity::Hourly);
        assert!("1w".parse::<Granularity>().is_err());
        assert!("".parse::<Granularity>().is_err());
    }

    #[test]
    fn align_truncates_to_period_start() {
        assert_eq!(Granularity::Hourly.align(3_600_000 + 59_999), 3_600_000);
        assert_eq!(Granularity::Daily.align(86_399_999), 0);
    }

    #[test]
    fn consistency_check() {
        let bar = OhlcBar {
            open_time: 0,
            close_time: 60_000,
            open: 100.0,
            high: 105.0,
            low: 95.0,
            close: 102.0,
        };
        assert!(bar.is_consistent());
        let broken = OhlcBar { high: 101.0, ..bar };
        assert!(!broken.is_consistent());
    }
}
