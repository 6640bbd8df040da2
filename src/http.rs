//! HTTP surface for keigo-sensei.
//!
//! Axum router and handlers over the analysis and topic services. The
//! scoring endpoints answer 200 even when Gemini is down (the services
//! degrade internally); only validation and configuration failures map to
//! error responses, via `KeigoError`'s `IntoResponse`.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::analysis::AnalysisService;
use crate::config::Config;
use crate::error::Result;
use crate::schemas::{
    AnalyzeRequest, GenerateTopicRequest, KeigoAnalysis, KeigoScore, ScenariosResponse,
    ScoreRequest, Topic,
};
use crate::session::SessionState;
use crate::topics::{self, TopicService};

/// Shared state for the HTTP server
#[derive(Clone)]
pub struct HttpState {
    pub config: Arc<Config>,
    pub analysis: Arc<AnalysisService>,
    pub topics: Arc<TopicService>,
    pub session: Arc<Mutex<SessionState>>,
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Analyze one sentence; records the exchange in the session history.
pub async fn analyze_handler(
    State(state): State<HttpState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<KeigoAnalysis>> {
    let analysis = state.analysis.analyze(&req).await?;

    let mut session = state.session.lock().await;
    session.record_user(&req.user_input);
    session.record_analysis(analysis.explanation.clone(), analysis.clone());

    Ok(Json(analysis))
}

/// Detailed scoring of one sentence.
pub async fn score_handler(
    State(state): State<HttpState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<KeigoScore>> {
    let score = state.analysis.score(&req).await?;
    Ok(Json(score))
}

/// Generate a practice topic, merging the caller's exclusion list with the
/// topics already seen this session.
pub async fn generate_topic_handler(
    State(state): State<HttpState>,
    Json(req): Json<GenerateTopicRequest>,
) -> Result<Json<Topic>> {
    let mut existing = req.existing_topics;
    {
        let session = state.session.lock().await;
        for name in session.topic_names() {
            if !existing.contains(&name) {
                existing.push(name);
            }
        }
    }

    let topic = state.topics.generate(&existing).await?;
    state.session.lock().await.record_topic(topic.clone());

    Ok(Json(topic))
}

/// The fixed practice scenarios.
pub async fn scenarios_handler() -> Json<ScenariosResponse> {
    Json(ScenariosResponse {
        scenarios: topics::scenarios(),
    })
}

/// Build the application router.
pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler).get(scenarios_handler))
        .route("/api/score-keigo", post(score_handler))
        .route("/api/generate-topic", post(generate_topic_handler))
        .route("/api/scenarios", get(scenarios_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(state: HttpState) -> Result<()> {
    let bind = state.config.http_bind;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    tracing::info!("Starting HTTP server on {}", bind);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    Ok(())
}
