//! Deterministic stand-in data used when the live provider is unavailable.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::model::asset::Asset;
use crate::model::bar::{Granularity, OhlcBar};

/// Noise per bar, as a fraction of the running base price.
pub const NOISE_PCT: f64 = 0.015;
/// Peak of the damped sine trend, as a fraction of the running base price.
pub const TREND_AMPLITUDE: f64 = 0.004;
/// Maximum wick beyond the open/close body.
pub const WICK_PCT: f64 = 0.005;

struct KnownAsset {
    id: &'static str,
    name: &'static str,
    slug: &'static str,
    price: f64,
    volume: f64,
    market_cap: f64,
    change_24h: f64,
}

static KNOWN_ASSETS: [KnownAsset; 20] = [
    KnownAsset {
        id: "BTC",
        name: "Bitcoin",
        slug: "bitcoin-btc",
        price: 65_000.0,
        volume: 45_832_051_687.0,
        market_cap: 1_280_000_000_000.0,
        change_24h: 2.56,
    },
    KnownAsset {
        id: "ETH",
        name: "Ethereum",
        slug: "ethereum-eth",
        price: 3_500.0,
        volume: 20_584_239_583.0,
        market_cap: 420_000_000_000.0,
        change_24h: 3.21,
    },
    KnownAsset {
        id: "BNB",
        name: "BNB",
        slug: "bnb-bnb",
        price: 580.0,
        volume: 1_486_324_785.0,
        market_cap: 86_000_000_000.0,
        change_24h: -0.72,
    },
    KnownAsset {
        id: "SOL",
        name: "Solana",
        slug: "solana-sol",
        price: 150.0,
        volume: 2_543_987_534.0,
        market_cap: 67_000_000_000.0,
        change_24h: -1.83,
    },
    KnownAsset {
        id: "XRP",
        name: "XRP",
        slug: "xrp-xrp",
        price: 0.52,
        volume: 2_143_587_215.0,
        market_cap: 28_700_000_000.0,
        change_24h: -2.17,
    },
    KnownAsset {
        id: "DOGE",
        name: "Dogecoin",
        slug: "dogecoin-doge",
        price: 0.15,
        volume: 1_102_554_120.0,
        market_cap: 21_600_000_000.0,
        change_24h: 4.08,
    },
    KnownAsset {
        id: "ADA",
        name: "Cardano",
        slug: "cardano-ada",
        price: 0.45,
        volume: 354_689_432.0,
        market_cap: 16_000_000_000.0,
        change_24h: 1.23,
    },
    KnownAsset {
        id: "AVAX",
        name: "Avalanche",
        slug: "avalanche-avax",
        price: 35.0,
        volume: 412_338_901.0,
        market_cap: 13_800_000_000.0,
        change_24h: -0.94,
    },
    KnownAsset {
        id: "LINK",
        name: "Chainlink",
        slug: "chainlink-link",
        price: 15.0,
        volume: 298_114_075.0,
        market_cap: 8_900_000_000.0,
        change_24h: 0.61,
    },
    KnownAsset {
        id: "DOT",
        name: "Polkadot",
        slug: "polkadot-new-dot",
        price: 7.2,
        volume: 187_650_312.0,
        market_cap: 10_300_000_000.0,
        change_24h: -1.12,
    },
    KnownAsset {
        id: "TRX",
        name: "TRON",
        slug: "tron-trx",
        price: 0.12,
        volume: 310_540_118.0,
        market_cap: 10_500_000_000.0,
        change_24h: 0.38,
    },
    KnownAsset {
        id: "MATIC",
        name: "Polygon",
        slug: "polygon-matic",
        price: 0.72,
        volume: 276_903_442.0,
        market_cap: 7_100_000_000.0,
        change_24h: -1.64,
    },
    KnownAsset {
        id: "LTC",
        name: "Litecoin",
        slug: "litecoin-ltc",
        price: 82.0,
        volume: 402_776_510.0,
        market_cap: 6_100_000_000.0,
        change_24h: 0.87,
    },
    KnownAsset {
        id: "SHIB",
        name: "Shiba Inu",
        slug: "shiba-inu-shib",
        price: 0.000_024,
        volume: 520_118_930.0,
        market_cap: 14_100_000_000.0,
        change_24h: 2.93,
    },
    KnownAsset {
        id: "BCH",
        name: "Bitcoin Cash",
        slug: "bitcoin-cash-bch",
        price: 460.0,
        volume: 311_208_774.0,
        market_cap: 9_000_000_000.0,
        change_24h: 1.05,
    },
    KnownAsset {
        id: "UNI",
        name: "Uniswap",
        slug: "uniswap-uni",
        price: 7.8,
        volume: 142_665_019.0,
        market_cap: 4_700_000_000.0,
        change_24h: -0.48,
    },
    KnownAsset {
        id: "ATOM",
        name: "Cosmos",
        slug: "cosmos-atom",
        price: 8.4,
        volume: 151_302_856.0,
        market_cap: 3_300_000_000.0,
        change_24h: -1.27,
    },
    KnownAsset {
        id: "XLM",
        name: "Stellar",
        slug: "stellar-xlm",
        price: 0.11,
        volume: 88_420_317.0,
        market_cap: 3_200_000_000.0,
        change_24h: 0.52,
    },
    KnownAsset {
        id: "NEAR",
        name: "NEAR Protocol",
        slug: "near-protocol-near",
        price: 5.6,
        volume: 233_981_640.0,
        market_cap: 6_000_000_000.0,
        change_24h: 3.41,
    },
    KnownAsset {
        id: "ETC",
        name: "Ethereum Classic",
        slug: "ethereum-classic-etc",
        price: 26.0,
        volume: 129_774_205.0,
        market_cap: 3_800_000_000.0,
        change_24h: -0.73,
    },
];

fn known(asset_id: &str) -> Option<&'static KnownAsset> {
    let id = asset_id.trim();
    KNOWN_ASSETS.iter().find(|a| a.id.eq_ignore_ascii_case(id))
}

/// Human-readable name for well-known tickers.
pub fn display_name(asset_id: &str) -> Option<&'static str> {
    known(asset_id).map(|a| a.name)
}

/// Static listing of well-known assets with plausible prices, in descending
/// market-cap order.
pub fn fallback_assets() -> Vec<Asset> {
    let mut assets: Vec<Asset> = KNOWN_ASSETS
        .iter()
        .map(|a| Asset {
            asset_id: a.id.to_string(),
            name: a.name.to_string(),
            price_usd: a.price,
            volume_1day_usd: a.volume,
            market_cap_usd: a.market_cap,
            change_24h: a.change_24h,
            logo_url: Some(format!("https://cryptologos.cc/logos/{}-logo.png", a.slug)),
        })
        .collect();
    crate::model::asset::rank_by_market_cap(&mut assets);
    assets
}

/// Seed derived from the upper-cased ticker bytes.
pub fn seed_for(asset_id: &str) -> u64 {
    asset_id
        .trim()
        .bytes()
        .map(|b| b.to_ascii_uppercase())
        .fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(u64::from(b)))
}

/// Starting price of the synthetic walk. Unknown tickers get a seed-derived
/// price between 1 and 101.
pub fn base_price(asset_id: &str) -> f64 {
    match known(asset_id) {
        Some(a) => a.price,
        None => 1.0 + (seed_for(asset_id) % 10_000) as f64 / 100.0,
    }
}

/// Generate `granularity.bar_count()` bars whose last bar opens at
/// `last_open_time`.
///
/// The walk is autocorrelated: each close becomes the next bar's open. Each
/// step applies a damped sine trend plus uniform noise bounded to
/// +/-[`NOISE_PCT`] of the running base; highs and lows add a small wick
/// around the body so every bar stays internally consistent. Prices depend
/// only on the asset id and the granularity's bar count.
pub fn synthetic_history(
    asset_id: &str,
    granularity: Granularity,
    last_open_time: u64,
) -> Vec<OhlcBar> {
    let count = granularity.bar_count();
    let period = granularity.period_ms();
    let first_open = last_open_time.saturating_sub(period * (count as u64 - 1));
    let mut rng = ChaCha8Rng::seed_from_u64(seed_for(asset_id));
    let mut base = base_price(asset_id);

    let mut bars = Vec::with_capacity(count);
    for i in 0..count {
        let t = i as f64;
        let trend = TREND_AMPLITUDE * (t / 4.0).sin() * (-t / count as f64).exp();
        let noise = rng.gen_range(-NOISE_PCT..=NOISE_PCT);

        let open = base;
        let close = open * (1.0 + trend + noise);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..WICK_PCT));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..WICK_PCT));

        let open_time = first_open + period * i as u64;
        bars.push(OhlcBar {
            open_time,
            close_time: open_time + period,
            open,
            high,
            low,
            close,
        });
        base = close;
    }
    bars
}
