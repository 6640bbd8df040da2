//! Runtime configuration loaded from environment variables.

use std::net::SocketAddr;

/// Model used when KEIGO_GEMINI_MODEL is unset.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Service configuration. Every knob has a working default; only the Gemini
/// API key is genuinely optional, and its absence is reported as a
/// configuration error at call entry rather than attempted and failed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub http_bind: SocketAddr,
    /// Wall-clock deadline for one analyze/score attempt
    pub analyze_timeout_ms: u64,
    /// Wall-clock deadline for one topic-generation attempt
    pub topic_timeout_ms: u64,
    /// Transport-level timeout on the reqwest client
    pub request_timeout_ms: u64,
    /// Total attempts on the analyze/score paths (first call + retries)
    pub max_attempts: u32,
    /// Backoff unit; the delay before attempt N is N times this
    pub retry_delay_ms: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            http_bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            analyze_timeout_ms: 30_000,
            topic_timeout_ms: 30_000,
            request_timeout_ms: 30_000,
            max_attempts: 2,
            retry_delay_ms: 2_000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn load_from_env() -> Self {
        let mut config = Self::default();

        let is_placeholder = |s: &str| {
            let t = s.trim();
            t.is_empty()
                || t.contains("${")
                || t.eq_ignore_ascii_case("your-api-key-here")
                || t.eq_ignore_ascii_case("changeme")
        };

        if let Ok(key) = std::env::var("GEMINI_API_KEY")
            && !is_placeholder(&key)
        {
            config.gemini_api_key = Some(key);
        }

        if let Ok(model) = std::env::var("KEIGO_GEMINI_MODEL")
            && !model.trim().is_empty()
        {
            config.gemini_model = model;
        }

        if let Some(bind) = std::env::var("KEIGO_HTTP_BIND")
            .ok()
            .and_then(|v| v.parse::<SocketAddr>().ok())
        {
            config.http_bind = bind;
        }

        if let Some(ms) = std::env::var("KEIGO_ANALYZE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.analyze_timeout_ms = ms.clamp(1_000, 120_000);
        }

        if let Some(ms) = std::env::var("KEIGO_TOPIC_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.topic_timeout_ms = ms.clamp(1_000, 120_000);
        }

        if let Some(ms) = std::env::var("KEIGO_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.request_timeout_ms = ms.clamp(1_000, 120_000);
        }

        if let Some(attempts) = std::env::var("KEIGO_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&n| (1..=5).contains(&n))
        {
            config.max_attempts = attempts;
        }

        if let Some(delay) = std::env::var("KEIGO_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.retry_delay_ms = delay.clamp(100, 30_000);
        }

        if let Ok(level) = std::env::var("KEIGO_LOG")
            && !level.trim().is_empty()
        {
            config.log_level = level;
        }

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.gemini_model.trim().is_empty() {
            anyhow::bail!("KEIGO_GEMINI_MODEL must not be empty");
        }
        if !(1..=5).contains(&self.max_attempts) {
            anyhow::bail!("KEIGO_MAX_ATTEMPTS must be between 1 and 5");
        }
        if self.analyze_timeout_ms == 0 || self.topic_timeout_ms == 0 {
            anyhow::bail!("timeouts must be greater than zero");
        }
        Ok(())
    }
}
