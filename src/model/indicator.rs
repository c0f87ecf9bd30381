use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use super::bar::Granularity;
use super::source::DataSource;

pub const RSI_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Rsi,
    Macd,
    Bollinger,
}

impl IndicatorKind {
    /// Number of bars needed before the indicator is computed rather than
    /// short-circuited to its neutral value.
    pub fn min_window(self) -> usize {
        match self {
            Self::Rsi => RSI_PERIOD,
            Self::Macd => MACD_SLOW,
            Self::Bollinger => BOLLINGER_PERIOD,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rsi => "rsi",
            Self::Macd => "macd",
            Self::Bollinger => "bollinger",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rsi" => Ok(Self::Rsi),
            "macd" => Ok(Self::Macd),
            "bollinger" | "bb" => Ok(Self::Bollinger),
            _ => bail!(
                "invalid indicator '{}': expected one of rsi/macd/bollinger",
                s
            ),
        }
    }
}

/// Point-in-time indicator values for one asset. `None` means the value
/// could not be computed (history unavailable or too short).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub asset_id: String,
    pub name: String,
    pub price_usd: f64,
    pub volume_1day_usd: f64,
    pub change_24h: f64,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
    /// Provenance of the history the indicators were computed from. Batch
    /// snapshots only use live history, so this is `Some(Live)` or `None`;
    /// an unavailable series leaves it `None` instead of substituting
    /// synthetic bars.
    pub source: Option<DataSource>,
}

impl IndicatorSnapshot {
    pub fn has_indicators(&self) -> bool {
        self.rsi.is_some() || self.macd.is_some() || self.bollinger_middle.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorHistoryPoint {
    pub time: u64,
    /// RSI, MACD line, or Bollinger middle band depending on the kind.
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
}

/// A charting series of one indicator over one bar series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    pub kind: IndicatorKind,
    pub granularity: Granularity,
    pub points: Vec<IndicatorHistoryPoint>,
}

impl IndicatorHistory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}
