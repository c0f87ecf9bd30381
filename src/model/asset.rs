use serde::{Deserialize, Serialize};

/// A tradable asset as shown in the market overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: String,
    pub name: String,
    pub price_usd: f64,
    pub volume_1day_usd: f64,
    pub market_cap_usd: f64,
    pub change_24h: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// Sort descending by market cap. Providers that do not report market cap
/// leave it at zero, so 24h volume breaks ties.
pub fn rank_by_market_cap(assets: &mut [Asset]) {
    assets.sort_by(|a, b| {
        b.market_cap_usd
            .total_cmp(&a.market_cap_usd)
            .then_with(|| b.volume_1day_usd.total_cmp(&a.volume_1day_usd))
    });
}
