use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::AppError;
use crate::market::gateway::DEFAULT_TOP_N;
use crate::snapshot::DEFAULT_SNAPSHOT_LIMIT;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub market: MarketConfig,
    pub indicators: IndicatorConfig,
    pub assistant: AssistantConfig,
    pub news: NewsConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    CoinApi,
    Binance,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub provider: ProviderKind,
    pub coinapi_base_url: String,
    pub binance_base_url: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(skip)]
    pub coinapi_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default = "default_snapshot_limit")]
    pub snapshot_limit: usize,
    #[serde(default = "default_snapshot_concurrency")]
    pub snapshot_concurrency: usize,
    #[serde(default = "default_history_timeout_ms")]
    pub history_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(skip)]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    pub base_url: String,
    #[serde(default = "default_news_limit")]
    pub limit: usize,
    #[serde(skip)]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_request_timeout_ms() -> u64 {
    8_000
}

fn default_snapshot_limit() -> usize {
    DEFAULT_SNAPSHOT_LIMIT
}

fn default_snapshot_concurrency() -> usize {
    1
}

fn default_history_timeout_ms() -> u64 {
    10_000
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

fn default_news_limit() -> usize {
    12
}

impl MarketConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl IndicatorConfig {
    pub fn history_timeout(&self) -> Duration {
        Duration::from_millis(self.history_timeout_ms)
    }
}

impl Config {
    /// Load `config/default.toml` (or `$MARKET_PULSE_CONFIG`) and overlay
    /// secrets from `.env` / the environment. Missing API keys are allowed:
    /// the affected live calls fail and their fallbacks take over.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var("MARKET_PULSE_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_path(Path::new(&path))?;

        config.market.coinapi_key = std::env::var("COINAPI_KEY").unwrap_or_default();
        config.assistant.api_key = std::env::var("ASSISTANT_API_KEY").unwrap_or_default();
        config.news.api_key = std::env::var("NEWS_API_KEY").unwrap_or_default();
        if let Ok(addr) = std::env::var("MARKET_PULSE_BIND_ADDR") {
            if !addr.trim().is_empty() {
                config.server.bind_addr = addr.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Read, parse and validate a config file. Secrets stay empty.
    pub fn from_path(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .map_err(AppError::Io)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to parse {}", config_path.display()))
    }

    /// Parse and validate a TOML document without touching the environment.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("invalid config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.market.top_n == 0 {
            return Err(AppError::Config("market.top_n must be > 0".to_string()).into());
        }
        if self.indicators.snapshot_concurrency == 0 {
            return Err(
                AppError::Config("indicators.snapshot_concurrency must be > 0".to_string()).into(),
            );
        }
        for (field, value) in [
            ("market.coinapi_base_url", &self.market.coinapi_base_url),
            ("market.binance_base_url", &self.market.binance_base_url),
            ("assistant.endpoint", &self.assistant.endpoint),
            ("news.base_url", &self.news.base_url),
        ] {
            url::Url::parse(value).with_context(|| format!("{} is not a valid URL", field))?;
        }
        Ok(())
    }
}
