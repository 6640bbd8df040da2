//! End-to-end exercises of the HTTP surface with a scripted backend.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower::util::ServiceExt;

use keigo_sensei::analysis::{AnalysisService, CallPolicy};
use keigo_sensei::config::Config;
use keigo_sensei::gemini::{GenerativeClient, GenerativeError};
use keigo_sensei::http::{HttpState, router};
use keigo_sensei::session::SessionState;
use keigo_sensei::topics::TopicService;

/// Backend stand-in that always fails at the transport layer, forcing every
/// scoring path onto its fallback.
struct DownClient;

#[async_trait]
impl GenerativeClient for DownClient {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerativeError> {
        Err(GenerativeError::Transport("connection refused".to_string()))
    }
}

fn test_state(client: Option<Arc<dyn GenerativeClient>>) -> HttpState {
    let policy = CallPolicy {
        deadline: Duration::from_millis(100),
        max_attempts: 2,
        backoff_unit: Duration::from_millis(5),
    };
    HttpState {
        config: Arc::new(Config::default()),
        analysis: Arc::new(AnalysisService::new(client.clone(), policy)),
        topics: Arc::new(TopicService::new(client, Duration::from_millis(100))),
        session: Arc::new(Mutex::new(SessionState::new())),
    }
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_answers_ok() {
    let app = router(test_state(Some(Arc::new(DownClient))));
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn scenarios_listing_returns_the_fixed_four() {
    let app = router(test_state(Some(Arc::new(DownClient))));
    let response = app
        .oneshot(Request::get("/api/scenarios").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let scenarios = json["scenarios"].as_array().unwrap();
    assert_eq!(scenarios.len(), 4);
    assert_eq!(scenarios[0]["id"], "business-meeting");
    assert_eq!(scenarios[3]["id"], "presentation");
}

#[tokio::test]
async fn analyze_with_missing_fields_is_a_400() {
    let app = router(test_state(Some(Arc::new(DownClient))));
    let response = app
        .oneshot(json_post("/api/analyze", r#"{"userInput": "ございます"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], 400);
}

#[tokio::test]
async fn analyze_with_backend_down_still_answers_200() {
    let app = router(test_state(Some(Arc::new(DownClient))));
    let body = r#"{"userInput": "ございます", "context": "接客", "situation": "店頭での応対"}"#;
    let response = app.oneshot(json_post("/api/analyze", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["category"], "丁寧語");
    assert_eq!(json["score"], 70);
    assert_eq!(json["isCorrect"], true);
}

#[tokio::test]
async fn score_with_backend_down_degrades_to_heuristic() {
    let app = router(test_state(Some(Arc::new(DownClient))));
    let body = r#"{"userText": "明日行く"}"#;
    let response = app
        .oneshot(json_post("/api/score-keigo", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["category"], "普通語");
    assert_eq!(json["isCorrect"], false);
    let score = json["score"].as_u64().unwrap();
    assert!(score <= 100);
}

#[tokio::test]
async fn score_without_user_text_is_a_400() {
    let app = router(test_state(Some(Arc::new(DownClient))));
    let response = app
        .oneshot(json_post("/api/score-keigo", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generate_topic_with_backend_down_serves_the_pool() {
    let app = router(test_state(Some(Arc::new(DownClient))));
    let response = app
        .oneshot(json_post("/api/generate-topic", r#"{"existingTopics": []}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let name = json["topic"].as_str().unwrap();
    assert!(["病院敬語", "美容院敬語", "銀行敬語"].contains(&name));
    assert!(!json["question"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn missing_api_key_surfaces_a_configuration_error() {
    let app = router(test_state(None));
    let body = r#"{"userInput": "ございます", "context": "接客", "situation": "店頭での応対"}"#;
    let response = app.oneshot(json_post("/api/analyze", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert!(
        json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("GEMINI_API_KEY")
    );
}
