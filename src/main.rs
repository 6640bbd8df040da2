use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use keigo_sensei::analysis::{AnalysisService, CallPolicy};
use keigo_sensei::config::Config;
use keigo_sensei::gemini::{GeminiClient, GenerativeClient};
use keigo_sensei::http::{self, HttpState};
use keigo_sensei::session::SessionState;
use keigo_sensei::topics::TopicService;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load_from_env();
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("keigo_sensei={}", config.log_level))
        .init();

    info!("Starting keigo-sensei");

    let client: Option<Arc<dyn GenerativeClient>> = match &config.gemini_api_key {
        Some(key) => {
            info!("Using Gemini model {}", config.gemini_model);
            Some(Arc::new(GeminiClient::new(
                key.clone(),
                config.gemini_model.clone(),
                Duration::from_millis(config.request_timeout_ms),
            )?))
        }
        None => {
            warn!(
                "GEMINI_API_KEY is not set; scoring endpoints will answer with a configuration error"
            );
            None
        }
    };

    let policy = CallPolicy::from_config(&config);
    let topic_deadline = Duration::from_millis(config.topic_timeout_ms);
    let config = Arc::new(config);

    let state = HttpState {
        config: config.clone(),
        analysis: Arc::new(AnalysisService::new(client.clone(), policy)),
        topics: Arc::new(TopicService::new(client, topic_deadline)),
        session: Arc::new(Mutex::new(SessionState::new())),
    };

    http::serve(state).await?;

    Ok(())
}
