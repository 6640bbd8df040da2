//! Orchestration for the sentence-analysis and detailed-scoring paths.
//!
//! Both paths share the same shape: validate the request, build a prompt,
//! race the Gemini call against a deadline, retry transient overloads, and
//! on any terminal external or parse failure degrade to the heuristic
//! classifier. The external dependency's failure is never surfaced to the
//! caller on these paths; only validation and configuration problems are.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{KeigoError, Result};
use crate::extract;
use crate::gemini::{GenerativeClient, GenerativeError};
use crate::heuristic::HeuristicJudge;
use crate::prompts;
use crate::schemas::{AnalyzeRequest, KeigoAnalysis, KeigoScore, ScoreRequest};

const DEFAULT_SCORING_CONTEXT: &str = "一般的なビジネス・接客シーン";

/// Knobs for the external-call loop, split out of `Config` so tests can
/// shrink the delays.
#[derive(Debug, Clone)]
pub struct CallPolicy {
    /// Wall-clock deadline per attempt
    pub deadline: Duration,
    /// Total attempts (first call + retries); retries apply to overloads only
    pub max_attempts: u32,
    /// The delay before attempt N is N times this unit
    pub backoff_unit: Duration,
}

impl CallPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            deadline: Duration::from_millis(config.analyze_timeout_ms),
            max_attempts: config.max_attempts,
            backoff_unit: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

pub struct AnalysisService {
    client: Option<Arc<dyn GenerativeClient>>,
    heuristic: HeuristicJudge,
    policy: CallPolicy,
}

impl AnalysisService {
    /// `client` is None when no API key is configured; requests then fail
    /// with a configuration error before any external call.
    pub fn new(client: Option<Arc<dyn GenerativeClient>>, policy: CallPolicy) -> Self {
        Self {
            client,
            heuristic: HeuristicJudge::new(),
            policy,
        }
    }

    /// Analyze one sentence against its situation.
    pub async fn analyze(&self, req: &AnalyzeRequest) -> Result<KeigoAnalysis> {
        if req.user_input.trim().is_empty()
            || req.context.trim().is_empty()
            || req.situation.trim().is_empty()
        {
            return Err(KeigoError::Validation {
                message: "userInput, context and situation are required".to_string(),
            });
        }
        let client = self.client()?;

        let prompt = prompts::analysis_prompt(&req.user_input, &req.situation);
        match self.call_with_retry(client.as_ref(), &prompt).await {
            Ok(raw) => match extract::parse_analysis(&raw) {
                Ok(analysis) => Ok(analysis),
                Err(e) => {
                    warn!("Unusable Gemini output, using heuristic classification: {e}");
                    Ok(self.heuristic.classify(&req.user_input))
                }
            },
            Err(e) => {
                warn!("Gemini unavailable, using heuristic classification: {e}");
                Ok(self.heuristic.classify(&req.user_input))
            }
        }
    }

    /// Produce the detailed scoring record for one sentence.
    pub async fn score(&self, req: &ScoreRequest) -> Result<KeigoScore> {
        if req.user_text.trim().is_empty() {
            return Err(KeigoError::Validation {
                message: "userText is required".to_string(),
            });
        }
        let client = self.client()?;

        let context = req
            .context
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_SCORING_CONTEXT);
        let prompt = prompts::scoring_prompt(&req.user_text, context);
        match self.call_with_retry(client.as_ref(), &prompt).await {
            Ok(raw) => match extract::parse_score(&raw) {
                Ok(score) => Ok(score),
                Err(e) => {
                    warn!("Unusable Gemini output, using heuristic scoring: {e}");
                    Ok(self.heuristic.score(&req.user_text))
                }
            },
            Err(e) => {
                warn!("Gemini unavailable, using heuristic scoring: {e}");
                Ok(self.heuristic.score(&req.user_text))
            }
        }
    }

    fn client(&self) -> Result<&Arc<dyn GenerativeClient>> {
        self.client.as_ref().ok_or_else(|| KeigoError::Config {
            message: "GEMINI_API_KEY is not set".to_string(),
        })
    }

    /// Race each attempt against the path deadline. Only transient overloads
    /// are retried, with a linearly growing delay before each retry; any
    /// other error is terminal for the loop.
    async fn call_with_retry(
        &self,
        client: &dyn GenerativeClient,
        prompt: &str,
    ) -> std::result::Result<String, GenerativeError> {
        let mut last_err: Option<GenerativeError> = None;

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                let delay = self.policy.backoff_unit * attempt;
                debug!("Retrying Gemini call (attempt {attempt}) after {delay:?}");
                sleep(delay).await;
            }

            let result = match timeout(self.policy.deadline, client.generate(prompt)).await {
                Ok(res) => res,
                Err(_) => Err(GenerativeError::Timeout {
                    timeout_ms: self.policy.deadline.as_millis() as u64,
                }),
            };

            match result {
                Ok(text) => return Ok(text),
                Err(e @ GenerativeError::Overloaded { .. }) => {
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err
            .unwrap_or_else(|| GenerativeError::Transport("no attempts were made".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct AlwaysOverloaded {
        calls: AtomicU32,
    }

    #[async_trait]
    impl GenerativeClient for AlwaysOverloaded {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, GenerativeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GenerativeError::Overloaded { status: 503 })
        }
    }

    fn fast_policy() -> CallPolicy {
        CallPolicy {
            deadline: Duration::from_millis(200),
            max_attempts: 2,
            backoff_unit: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn overloads_are_retried_up_to_the_cap() {
        let client = Arc::new(AlwaysOverloaded {
            calls: AtomicU32::new(0),
        });
        let service = AnalysisService::new(Some(client.clone()), fast_policy());
        let req = AnalyzeRequest {
            user_input: "ございます".to_string(),
            context: "接客".to_string(),
            situation: "店頭での応対".to_string(),
        };

        let analysis = service.analyze(&req).await.unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        // retry exhaustion degrades to the heuristic, not an error
        assert_eq!(analysis.category, crate::schemas::KeigoCategory::Polite);
    }

    #[tokio::test]
    async fn missing_client_is_a_config_error() {
        let service = AnalysisService::new(None, fast_policy());
        let req = ScoreRequest {
            user_text: "伺います".to_string(),
            context: None,
        };
        let res = service.score(&req).await;
        assert!(matches!(res, Err(KeigoError::Config { .. })));
    }
}
