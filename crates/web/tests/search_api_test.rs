//! REST API integration tests

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use marcus_core::Settings;
use marcus_web::{AppState, BackendError, SearchBackend, create_router};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Answers every search with a canned response and records what it was sent.
struct CannedBackend {
    response: Result<Value, u16>,
    calls: Mutex<Vec<(Vec<String>, Value)>>,
}

impl CannedBackend {
    fn ok(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(response),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            response: Err(status),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(Vec<String>, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchBackend for CannedBackend {
    async fn search(&self, indices: &[String], body: &Value) -> Result<Value, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push((indices.to_vec(), body.clone()));
        match &self.response {
            Ok(value) => Ok(value.clone()),
            Err(0) => Err(BackendError::Unreachable("connection refused".into())),
            Err(status) => Err(BackendError::Status {
                status: *status,
                body: String::new(),
            }),
        }
    }
}

fn app(backend: Arc<CannedBackend>) -> Router {
    let settings = Settings::from_toml("[search]\ndefault_indices = [\"marcus\"]").unwrap();
    create_router(AppState::new(backend, settings)).unwrap()
}

async fn get(app: Router, uri: &str) -> (StatusCode, String, Option<String>) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post_form(
    app: Router,
    uri: &str,
    form: &'static str,
) -> (StatusCode, String, Option<String>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String, Option<String>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap(), content_type)
}

fn hits() -> Value {
    json!({"hits": {"total": 1, "hits": [{"_id": "ubb-ms-0001", "_source": {"label": "Brev"}}]}})
}

#[tokio::test]
async fn test_health_check_returns_ok() {
    let (status, body, _) = get(app(CannedBackend::ok(hits())), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_search_passes_response_through() {
    let backend = CannedBackend::ok(hits());
    let (status, body, _) = get(
        app(backend.clone()),
        "/search?q=brev&filter=type%23Brev&size=20&from=20",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), hits());

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    let (indices, sent) = &calls[0];
    assert_eq!(indices, &vec!["marcus".to_string()]);
    assert_eq!(sent["from"], 20);
    assert_eq!(sent["size"], 20);
    assert_eq!(
        sent["query"]["bool"]["filter"][0]["bool"]["must"][0],
        json!({"term": {"type": "Brev"}})
    );
}

#[tokio::test]
async fn test_search_uses_requested_indices() {
    let backend = CannedBackend::ok(hits());
    get(app(backend.clone()), "/search?index=wab&index=wab-admin&service=wab").await;

    assert_eq!(backend.calls()[0].0, vec!["wab", "wab-admin"]);
}

#[tokio::test]
async fn test_search_pretty_prints() {
    let (status, body, content_type) =
        get(app(CannedBackend::ok(hits())), "/search?pretty=true").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\n  \"hits\""));
    assert_eq!(content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_search_bad_size_returns_400_problem() {
    let backend = CannedBackend::ok(hits());
    let (status, body, content_type) = get(app(backend.clone()), "/search?size=ten").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    let problem: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(problem["status"], 400);
    assert_eq!(problem["title"], "Bad Request");
    assert!(problem["detail"].as_str().unwrap().contains("size"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_search_invalid_aggs_returns_400() {
    let (status, _, _) = get(app(CannedBackend::ok(hits())), "/search?aggs=%7Bnope").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_backend_unreachable_returns_503() {
    let (status, body, _) = get(app(CannedBackend::failing(0)), "/search?q=bergen").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let problem: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(problem["status"], 503);
}

#[tokio::test]
async fn test_search_backend_5xx_returns_503_and_4xx_returns_500() {
    let (status, _, _) = get(app(CannedBackend::failing(502)), "/search").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _, _) = get(app(CannedBackend::failing(400)), "/search").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_search_rejects_index_outside_a_collection() {
    let backend = CannedBackend::ok(hits());
    let (status, body, _) = get(
        app(backend.clone()),
        "/search?index=_cluster%2Fsettings%3Fflat_settings",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let problem: Value = serde_json::from_str(&body).unwrap();
    assert!(problem["detail"].as_str().unwrap().contains("index"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_post_search_reads_form_body() {
    let backend = CannedBackend::ok(hits());
    let (status, body, _) = post_form(
        app(backend.clone()),
        "/search?index=wab",
        "q=brev&filter=type%23Brev&from=10&service=wab",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), hits());
    let (indices, sent) = &backend.calls()[0];
    assert_eq!(indices, &vec!["wab".to_string()]);
    assert_eq!(sent["from"], 10);
    assert_eq!(
        sent["query"]["bool"]["filter"][0]["bool"]["must"][0],
        json!({"term": {"type": "Brev"}})
    );
}

#[tokio::test]
async fn test_post_search_with_json_body_returns_415() {
    let request = Request::builder()
        .method("POST")
        .uri("/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"q\":\"brev\"}"))
        .unwrap();
    let (status, _, content_type) = send(app(CannedBackend::ok(hits())), request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
}

#[tokio::test]
async fn test_put_search_returns_405() {
    let request = Request::builder()
        .method("PUT")
        .uri("/search")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(app(CannedBackend::ok(hits())), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_discover_pages_through_default_indices() {
    let backend = CannedBackend::ok(hits());
    let (status, body, _) = get(
        app(backend.clone()),
        "/discover?type=brev&from=20&size=5&filter=type%23Kart&sort=label:asc",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), hits());
    let (indices, sent) = &backend.calls()[0];
    assert_eq!(indices, &vec!["marcus".to_string()]);
    assert_eq!(sent["query"]["bool"]["must"][0], json!({"match_all": {}}));
    assert_eq!(
        sent["query"]["bool"]["filter"][0],
        json!({"terms": {"type": ["brev"]}})
    );
    assert_eq!(sent["from"], 20);
    assert_eq!(sent["size"], 5);
    assert!(sent.get("sort").is_none());
}

#[tokio::test]
async fn test_post_discover_reads_form_body() {
    let backend = CannedBackend::ok(hits());
    let (status, _, _) = post_form(app(backend.clone()), "/discover", "index=ska&q=bergen").await;

    assert_eq!(status, StatusCode::OK);
    let (indices, sent) = &backend.calls()[0];
    assert_eq!(indices, &vec!["ska".to_string()]);
    assert_eq!(sent["query"]["bool"]["must"][0]["query_string"]["query"], "bergen");
}

#[tokio::test]
async fn test_discover_bad_from_returns_400() {
    let backend = CannedBackend::ok(hits());
    let (status, _, _) = get(app(backend.clone()), "/discover?from=-5").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_suggest_returns_sorted_suggestions() {
    let backend = CannedBackend::ok(json!({
        "suggest": {
            "completion_suggestion": [{
                "text": "ber",
                "options": [{"text": "Bergen"}, {"text": "Berg"}, {"text": "Bergen"}]
            }]
        }
    }));
    let (status, body, _) = get(app(backend.clone()), "/suggest?q=ber&index=wab&size=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!(["Berg", "Bergen"])
    );
    let (indices, sent) = &backend.calls()[0];
    assert_eq!(indices, &vec!["wab".to_string()]);
    assert_eq!(sent["suggest"]["completion_suggestion"]["completion"]["size"], 3);
}

#[tokio::test]
async fn test_suggest_without_text_skips_backend() {
    let backend = CannedBackend::ok(hits());
    let (status, body, _) = get(app(backend.clone()), "/suggest").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_suggest_without_suggester_in_response_is_empty() {
    let (status, body, _) = get(app(CannedBackend::ok(hits())), "/suggest?q=x").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_post_suggest_reads_form_body() {
    let backend = CannedBackend::ok(json!({
        "suggest": {"completion_suggestion": [{"options": [{"text": "Bergen"}]}]}
    }));
    let (status, body, _) = post_form(app(backend.clone()), "/suggest", "q=ber").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[\"Bergen\"]");
    assert_eq!(
        backend.calls()[0].1["suggest"]["completion_suggestion"]["prefix"],
        "ber"
    );
}
