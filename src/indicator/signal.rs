use serde::{Deserialize, Serialize};

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdSignal {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandSignal {
    Overbought,
    Oversold,
    WithinBands,
}

pub fn classify_rsi(value: f64) -> RsiSignal {
    if value > RSI_OVERBOUGHT {
        RsiSignal::Overbought
    } else if value < RSI_OVERSOLD {
        RsiSignal::Oversold
    } else {
        RsiSignal::Neutral
    }
}

pub fn classify_macd(macd: f64, signal: f64) -> MacdSignal {
    if macd > signal {
        MacdSignal::Bullish
    } else if macd < signal {
        MacdSignal::Bearish
    } else {
        MacdSignal::Neutral
    }
}

pub fn classify_bands(price: f64, upper: f64, lower: f64) -> BandSignal {
    if price > upper {
        BandSignal::Overbought
    } else if price < lower {
        BandSignal::Oversold
    } else {
        BandSignal::WithinBands
    }
}
