//! Provider-native payload shapes. Adapters convert these into
//! [`Asset`](crate::model::asset::Asset) and
//! [`OhlcBar`](crate::model::bar::OhlcBar).

use serde::Deserialize;
use serde_json::Value;

/// Deserialize Binance string-encoded numbers to f64.
pub fn string_to_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<f64>().map_err(serde::de::Error::custom)
}

/// Accept a number, a numeric string, or null (as 0).
pub fn string_or_number_to_f64_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    value_to_f64(&v).map_err(serde::de::Error::custom)
}

pub fn value_to_f64(v: &Value) -> Result<f64, String> {
    match v {
        Value::Null => Ok(0.0),
        Value::String(s) => s.parse::<f64>().map_err(|e| e.to_string()),
        Value::Number(n) => n.as_f64().ok_or_else(|| "invalid number".to_string()),
        _ => Err("invalid numeric value".to_string()),
    }
}

/// CoinAPI `GET /v1/assets` item.
#[derive(Debug, Deserialize)]
pub struct CoinApiAsset {
    pub asset_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub type_is_crypto: i64,
    #[serde(default)]
    pub price_usd: Option<f64>,
    #[serde(default)]
    pub volume_1day_usd: Option<f64>,
    #[serde(default)]
    pub market_cap_usd: Option<f64>,
    #[serde(default)]
    pub price_usd_change_24h: Option<f64>,
    #[serde(default)]
    pub id_icon: Option<String>,
}

/// CoinAPI OHLCV history item. Exchange-rate endpoints use `rate_*`,
/// symbol endpoints use `price_*`.
#[derive(Debug, Deserialize)]
pub struct CoinApiOhlcv {
    pub time_period_start: String,
    #[serde(default)]
    pub time_period_end: Option<String>,
    #[serde(alias = "price_open")]
    pub rate_open: f64,
    #[serde(alias = "price_high")]
    pub rate_high: f64,
    #[serde(alias = "price_low")]
    pub rate_low: f64,
    #[serde(alias = "price_close")]
    pub rate_close: f64,
}

/// Binance `GET /api/v3/ticker/24hr` item (only the fields we use).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTicker24h {
    pub symbol: String,
    #[serde(deserialize_with = "string_to_f64")]
    pub last_price: f64,
    #[serde(default, deserialize_with = "string_or_number_to_f64_default")]
    pub price_change_percent: f64,
    #[serde(default, deserialize_with = "string_or_number_to_f64_default")]
    pub quote_volume: f64,
}

/// Binance kline rows are heterogeneous arrays:
/// `[open_time, "open", "high", "low", "close", "volume", close_time, ...]`.
pub type BinanceKlineRow = Vec<Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_parses_string_numbers() {
        let json = r#"{"symbol":"BTCUSDT","lastPrice":"64000.50","priceChangePercent":"-1.25","quoteVolume":"123456.7","count":10}"#;
        let t: BinanceTicker24h = serde_json::from_str(json).unwrap();
        assert_eq!(t.symbol, "BTCUSDT");
        assert!((t.last_price - 64000.5).abs() < f64::EPSILON);
        assert!((t.price_change_percent + 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn coinapi_ohlcv_accepts_price_aliases() {
        let json = r#"{"time_period_start":"2024-01-01T00:00:00.0000000Z","price_open":1.0,"price_high":2.0,"price_low":0.5,"price_close":1.5}"#;
        let bar: CoinApiOhlcv = serde_json::from_str(json).unwrap();
        assert_eq!(bar.rate_high, 2.0);
        assert!(bar.time_period_end.is_none());
    }

    #[test]
    fn value_to_f64_handles_all_shapes() {
        assert_eq!(value_to_f64(&Value::Null).unwrap(), 0.0);
        assert_eq!(value_to_f64(&Value::String("2.5".into())).unwrap(), 2.5);
        assert_eq!(value_to_f64(&serde_json::json!(3)).unwrap(), 3.0);
        assert!(value_to_f64(&serde_json::json!([1])).is_err());
    }
}
