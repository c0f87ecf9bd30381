//! Chat assistant: a thin client for an OpenAI-compatible chat completion
//! endpoint plus extraction of buy/sell/hold suggestions from its replies.

use std::fmt::Write as _;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::AssistantConfig;
use crate::market::decode_response;
use crate::model::indicator::IndicatorSnapshot;
use crate::model::source::DataSource;

const NAME: &str = "assistant";

pub const SYSTEM_PROMPT: &str = "You are a cryptocurrency trading assistant that provides expert analysis on crypto assets. Provide concise, helpful advice about trading opportunities, market trends, and investment strategies. Use data to support your recommendations when possible. Keep responses focused on cryptocurrency trading and investment.";

pub const FALLBACK_REPLY: &str =
    "I'm having trouble connecting to my analysis engine. Please try again in a moment.";

static BUY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)should (buy|purchase|acquire|accumulate) ([A-Z]{3,5})\b")
        .expect("valid buy regex")
});
static SELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)should (sell|exit|reduce) ([A-Z]{3,5})\b").expect("valid sell regex")
});
static HOLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)should (hold|keep|maintain) ([A-Z]{3,5})\b").expect("valid hold regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub asset: String,
    pub action: AdviceAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: DataSource,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct AssistantClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    api_key: String,
}

impl AssistantClient {
    pub fn new(cfg: &AssistantConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build assistant HTTP client")?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            api_key: cfg.api_key.trim().to_string(),
        })
    }

    /// Ask the model. Never fails: any error produces [`FALLBACK_REPLY`].
    pub async fn ask(&self, prompt: &str) -> AssistantReply {
        match self.complete(prompt).await {
            Ok((text, id)) => AssistantReply {
                text,
                id,
                source: DataSource::Live,
            },
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "assistant completion failed");
                AssistantReply {
                    text: FALLBACK_REPLY.to_string(),
                    id: None,
                    source: DataSource::Fallback,
                }
            }
        }
    }

    async fn complete(&self, prompt: &str) -> Result<(String, Option<String>)> {
        if self.api_key.is_empty() {
            bail!("ASSISTANT_API_KEY not set in .env or environment");
        }
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("assistant completion HTTP failed")?;
        let parsed: ChatResponse = decode_response(NAME, "completion", response).await?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .context("assistant completion had no content")?;
        Ok((text, parsed.id))
    }
}

/// Find a "should buy/sell/hold TICKER" recommendation in free text. Buy
/// phrasing wins over sell, sell over hold.
///
/// The ticker must end on a word boundary, so "should buy bitcoin" yields no
/// advice rather than a truncated `BITC`.
pub fn extract_advice(text: &str) -> Option<Advice> {
    [
        (&*BUY_RE, AdviceAction::Buy),
        (&*SELL_RE, AdviceAction::Sell),
        (&*HOLD_RE, AdviceAction::Hold),
    ]
    .into_iter()
    .find_map(|(re, action)| {
        re.captures(text).map(|caps| Advice {
            asset: caps[2].to_ascii_uppercase(),
            action,
        })
    })
}

/// Prefix the user's question with a compact indicator summary so the model
/// can ground its answer in current numbers.
pub fn build_market_prompt(question: &str, snapshots: &[IndicatorSnapshot]) -> String {
    if snapshots.is_empty() {
        return question.to_string();
    }
    let mut out = String::from("Current market indicators:\n");
    for s in snapshots {
        let _ = write!(out, "- {} ${:.4} ({:+.2}% 24h)", s.asset_id, s.price_usd, s.change_24h);
        if let Some(rsi) = s.rsi {
            let _ = write!(out, " RSI {:.1}", rsi);
        }
        if let (Some(m), Some(sig)) = (s.macd, s.macd_signal) {
            let _ = write!(out, " MACD {:.4}/{:.4}", m, sig);
        }
        if let (Some(upper), Some(lower)) = (s.bollinger_upper, s.bollinger_lower) {
            let _ = write!(out, " BB {:.4}-{:.4}", lower, upper);
        }
        out.push('\n');
    }
    out.push('\n');
    out.push_str(question);
    out
}
