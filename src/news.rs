//! Headline feed for the news panel.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::NewsConfig;
use crate::error::AppError;
use crate::market::decode_response;
use crate::model::source::Sourced;

const NAME: &str = "mediastack";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    pub published_at: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
}

#[derive(Debug, Deserialize)]
struct MediastackResponse {
    #[serde(default)]
    data: Option<Vec<MediastackArticle>>,
}

#[derive(Debug, Deserialize)]
struct MediastackArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Keyword buckets checked in order; the first hit wins.
const CATEGORY_KEYWORDS: [(&str, &[&str]); 5] = [
    ("Business", &["business", "economy", "market"]),
    ("Technology", &["tech", "technology", "digital"]),
    ("Politics", &["politics", "government", "election"]),
    ("Health", &["health", "medical", "covid"]),
    ("Sports", &["sport", "football", "olympic"]),
];

pub fn categorize(title: &str) -> &'static str {
    let lower = title.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(category, _)| *category)
        .unwrap_or("General")
}

pub fn fallback_articles() -> Vec<NewsArticle> {
    [
        (
            "Global Climate Summit Reaches Historic Agreement on Emissions",
            "World News Daily",
            "2025-04-12T10:30:00Z",
            "World leaders have agreed to unprecedented carbon reduction targets after a week of intense negotiations at the Global Climate Summit.",
        ),
        (
            "Bitcoin Market Steadies as Institutional Inflows Continue",
            "Crypto Wire",
            "2025-04-12T08:15:00Z",
            "Spot fund inflows extended their streak while volatility compressed to its lowest level in a month.",
        ),
        (
            "Ethereum Layer-2 Networks Post Record Digital Activity",
            "Chain Report",
            "2025-04-11T17:40:00Z",
            "Rollup transaction counts hit new highs as fees on the base layer stayed subdued.",
        ),
        (
            "Government Panel Outlines Framework for Stablecoin Oversight",
            "Policy Desk",
            "2025-04-11T13:05:00Z",
            "A draft framework proposes reserve disclosure rules and licensing for large issuers.",
        ),
    ]
    .into_iter()
    .map(|(title, source, published_at, description)| NewsArticle {
        title: title.to_string(),
        source: source.to_string(),
        published_at: published_at.to_string(),
        url: "#".to_string(),
        description: Some(description.to_string()),
        category: categorize(title).to_string(),
    })
    .collect()
}

pub struct NewsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    default_limit: usize,
}

impl NewsClient {
    pub fn new(cfg: &NewsConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build news HTTP client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.trim().to_string(),
            default_limit: cfg.limit.max(1),
        })
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Latest English headlines, newest first. Never fails: errors and
    /// unexpected payloads yield the static fallback list.
    pub async fn latest(&self, limit: usize) -> Sourced<Vec<NewsArticle>> {
        match self.fetch(limit.max(1)).await {
            Ok(articles) => Sourced::live(articles),
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "news fetch failed, serving fallback headlines");
                let mut articles = fallback_articles();
                articles.truncate(limit.max(1));
                Sourced::fallback(articles)
            }
        }
    }

    async fn fetch(&self, limit: usize) -> Result<Vec<NewsArticle>> {
        if self.api_key.is_empty() {
            bail!("NEWS_API_KEY not set in .env or environment");
        }
        let url = format!("{}/v1/news", self.base_url);
        let limit_s = limit.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("access_key", self.api_key.as_str()),
                ("languages", "en"),
                ("limit", limit_s.as_str()),
                ("sort", "published_desc"),
            ])
            .send()
            .await
            .context("news HTTP failed")?;
        let parsed: MediastackResponse = decode_response(NAME, "news", response).await?;

        let Some(data) = parsed.data else {
            return Err(AppError::Schema("news response has no data array".to_string()).into());
        };
        Ok(data
            .into_iter()
            .filter_map(|a| {
                let title = a.title.filter(|t| !t.trim().is_empty())?;
                Some(NewsArticle {
                    category: categorize(&title).to_string(),
                    title,
                    source: a.source.unwrap_or_default(),
                    published_at: a.published_at.unwrap_or_default(),
                    url: a.url.unwrap_or_else(|| "#".to_string()),
                    description: a.description.filter(|d| !d.trim().is_empty()),
                })
            })
            .take(limit)
            .collect())
    }
}
