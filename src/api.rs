//! JSON API consumed by the dashboard front end.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};

use crate::assistant::{build_market_prompt, extract_advice, Advice, AssistantClient, AssistantReply};
use crate::indicator::indicator_history;
use crate::market::MarketGateway;
use crate::model::asset::Asset;
use crate::model::bar::{Granularity, OhlcBar};
use crate::model::indicator::{IndicatorHistory, IndicatorKind, IndicatorSnapshot};
use crate::model::source::{DataSource, Sourced};
use crate::news::{NewsArticle, NewsClient};
use crate::snapshot::{snapshot_indicators, SnapshotSignals};

pub struct AppState {
    pub gateway: MarketGateway,
    pub assistant: AssistantClient,
    pub news: NewsClient,
    pub snapshot_limit: usize,
    pub snapshot_concurrency: usize,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/assets", get(assets))
        .route("/api/assets/{id}/history", get(asset_history))
        .route("/api/indicators", get(indicators))
        .route("/api/indicators/{id}/history", get(indicator_series))
        .route("/api/news", get(news))
        .route("/api/assistant", post(ask_assistant))
        .layer(cors)
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    provider: &'static str,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        provider: state.gateway.provider_name(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

async fn assets(State(state): State<Arc<AppState>>) -> Json<Sourced<Vec<Asset>>> {
    Json(state.gateway.list_assets().await)
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    granularity: Option<String>,
    kind: Option<String>,
}

fn parse_granularity(raw: Option<&str>) -> Result<Granularity, ApiError> {
    match raw {
        None => Ok(Granularity::Daily),
        Some(s) => s
            .parse()
            .map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string())),
    }
}

fn parse_kind(raw: Option<&str>) -> Result<IndicatorKind, ApiError> {
    match raw {
        None => Ok(IndicatorKind::Rsi),
        Some(s) => s
            .parse()
            .map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string())),
    }
}

async fn asset_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Sourced<Vec<OhlcBar>>>, ApiError> {
    let granularity = parse_granularity(q.granularity.as_deref())?;
    tracing::debug!(asset_id = %id, granularity = %granularity, "history requested");
    Ok(Json(state.gateway.fetch_history(&id, granularity).await))
}

#[derive(Debug, Deserialize)]
struct SnapshotQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct SnapshotEntry {
    #[serde(flatten)]
    snapshot: IndicatorSnapshot,
    signals: SnapshotSignals,
}

#[derive(Serialize)]
struct SnapshotResponse {
    source: DataSource,
    snapshots: Vec<SnapshotEntry>,
}

async fn indicators(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SnapshotQuery>,
) -> Json<SnapshotResponse> {
    let listing = state.gateway.list_assets().await;
    let limit = q.limit.unwrap_or(state.snapshot_limit);
    let snapshots = snapshot_indicators(
        &state.gateway,
        &listing.data,
        limit,
        state.snapshot_concurrency,
    )
    .await;
    Json(SnapshotResponse {
        source: listing.source,
        snapshots: snapshots
            .into_iter()
            .map(|snapshot| SnapshotEntry {
                signals: snapshot.signals(),
                snapshot,
            })
            .collect(),
    })
}

#[derive(Serialize)]
struct IndicatorSeriesResponse {
    source: DataSource,
    history: IndicatorHistory,
}

async fn indicator_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<IndicatorSeriesResponse>, ApiError> {
    let granularity = parse_granularity(q.granularity.as_deref())?;
    let kind = parse_kind(q.kind.as_deref())?;
    let bars = state.gateway.fetch_history(&id, granularity).await;
    let mut history = indicator_history(&bars.data, kind, granularity);
    history.asset_id = Some(id);
    Ok(Json(IndicatorSeriesResponse {
        source: bars.source,
        history,
    }))
}

#[derive(Debug, Deserialize)]
struct NewsQuery {
    limit: Option<usize>,
}

async fn news(
    State(state): State<Arc<AppState>>,
    Query(q): Query<NewsQuery>,
) -> Json<Sourced<Vec<NewsArticle>>> {
    let limit = q.limit.unwrap_or(state.news.default_limit());
    Json(state.news.latest(limit).await)
}

#[derive(Debug, Deserialize)]
struct AssistantRequest {
    prompt: String,
    #[serde(default)]
    include_indicators: bool,
}

#[derive(Serialize)]
struct AssistantResponse {
    reply: AssistantReply,
    advice: Option<Advice>,
}

async fn ask_assistant(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AssistantRequest>,
) -> Result<Json<AssistantResponse>, ApiError> {
    let question = req.prompt.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("prompt must not be empty".to_string()));
    }

    let prompt = if req.include_indicators {
        let listing = state.gateway.list_assets().await;
        let snapshots = snapshot_indicators(
            &state.gateway,
            &listing.data,
            state.snapshot_limit,
            state.snapshot_concurrency,
        )
        .await;
        build_market_prompt(question, &snapshots)
    } else {
        question.to_string()
    };

    let reply = state.assistant.ask(&prompt).await;
    let advice = if reply.source.is_fallback() {
        None
    } else {
        extract_advice(&reply.text)
    };
    Ok(Json(AssistantResponse { reply, advice }))
}
