mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use market_pulse::config::NewsConfig;
use market_pulse::model::source::DataSource;
use market_pulse::news::{fallback_articles, NewsClient};

use common::{spawn_server, UNREACHABLE};

type Seen = Arc<Mutex<Option<HashMap<String, String>>>>;

async fn news(
    State(seen): State<Seen>,
    Query(q): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    *seen.lock().unwrap() = Some(q.clone());
    match q.get("access_key").map(String::as_str) {
        Some("good") => (
            StatusCode::OK,
            Json(json!({
                "pagination": {"limit": 3, "count": 3},
                "data": [
                    {"title": "Crypto market rallies", "source": "Wire", "published_at": "2025-04-12T10:00:00+00:00",
                     "url": "https://example.test/a", "description": "Prices up."},
                    {"title": "  ", "source": "Blank", "published_at": "2025-04-12T09:00:00+00:00", "url": "https://example.test/b"},
                    {"title": "Election night recap", "source": "Desk", "published_at": "2025-04-12T08:00:00+00:00",
                     "description": ""}
                ]
            })),
        ),
        Some("shape") => (StatusCode::OK, Json(json!({"error": {"code": "usage_limit_reached"}}))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"code": "invalid_access_key"}})),
        ),
    }
}

async fn client_with_key(key: &str) -> (NewsClient, Seen) {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/v1/news", get(news))
        .with_state(seen.clone());
    let base = spawn_server(router).await;
    let cfg = NewsConfig {
        base_url: base,
        limit: 12,
        api_key: key.to_string(),
    };
    (NewsClient::new(&cfg, Duration::from_secs(5)).unwrap(), seen)
}

#[tokio::test]
async fn live_headlines_are_mapped() {
    let (client, seen) = client_with_key("good").await;
    let result = client.latest(5).await;
    assert_eq!(result.source, DataSource::Live);
    assert_eq!(result.data.len(), 2);

    let first = &result.data[0];
    assert_eq!(first.title, "Crypto market rallies");
    assert_eq!(first.category, "Business");
    assert_eq!(first.description.as_deref(), Some("Prices up."));

    let second = &result.data[1];
    assert_eq!(second.category, "Politics");
    assert_eq!(second.url, "#");
    assert_eq!(second.description, None);

    let q = seen.lock().unwrap().clone().unwrap();
    assert_eq!(q.get("languages").map(String::as_str), Some("en"));
    assert_eq!(q.get("sort").map(String::as_str), Some("published_desc"));
    assert_eq!(q.get("limit").map(String::as_str), Some("5"));
}

#[tokio::test]
async fn rejected_key_serves_fallback() {
    let (client, _) = client_with_key("bad").await;
    let result = client.latest(12).await;
    assert_eq!(result.source, DataSource::Fallback);
    assert_eq!(result.data, fallback_articles());
}

#[tokio::test]
async fn payload_without_data_serves_fallback() {
    let (client, _) = client_with_key("shape").await;
    let result = client.latest(2).await;
    assert_eq!(result.source, DataSource::Fallback);
    assert_eq!(result.data.len(), 2);
}

#[tokio::test]
async fn missing_key_never_calls_out() {
    let (client, seen) = client_with_key("").await;
    assert_eq!(client.latest(3).await.source, DataSource::Fallback);
    assert!(seen.lock().unwrap().is_none());

    let cfg = NewsConfig {
        base_url: UNREACHABLE.to_string(),
        limit: 12,
        api_key: "good".to_string(),
    };
    let down = NewsClient::new(&cfg, Duration::from_secs(1)).unwrap();
    assert_eq!(down.latest(3).await.source, DataSource::Fallback);
    assert_eq!(down.default_limit(), 12);
}
