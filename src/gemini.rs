//! Gemini REST client behind the `GenerativeClient` seam.
//!
//! The trait keeps services testable with scripted fakes; the real client
//! speaks the generateContent endpoint of the Google Generative Language
//! API and distinguishes transient overloads from terminal failures so the
//! orchestration layer can decide what to retry.

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Errors at the generative-service boundary.
#[derive(Debug, Error)]
pub enum GenerativeError {
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("service overloaded (status {status})")]
    Overloaded { status: u16 },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("api error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("empty completion")]
    Empty,
}

#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Send a prompt; receive free-form completion text.
    async fn generate(&self, prompt: &str) -> Result<String, GenerativeError>;
}

/// Sampling parameters. Low temperature keeps the returned JSON stable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_k: 20,
            top_p: 0.8,
            max_output_tokens: 512,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: &'a GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

/// HTTP client for the Gemini generateContent endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    generation: GenerationConfig,
    request_timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build reqwest client with timeout")?;

        Ok(Self {
            client,
            api_key,
            model,
            generation: GenerationConfig::default(),
            request_timeout,
        })
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerativeError> {
        debug!(
            "Calling Gemini (model={}, prompt_chars={})",
            self.model,
            prompt.chars().count()
        );

        let url = format!("{}/{}:generateContent", API_BASE, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: &self.generation,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerativeError::Timeout {
                        timeout_ms: self.request_timeout.as_millis() as u64,
                    }
                } else {
                    GenerativeError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(GenerativeError::Overloaded {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerativeError::Api {
                status: status.as_u16(),
                body: truncate_snippet(&body, 500),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerativeError::Transport(format!("failed to decode response: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerativeError::Empty);
        }
        Ok(text)
    }
}

fn truncate_snippet(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_config_serializes_camel_case() {
        let json = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert_eq!(json["topK"], 20);
        assert_eq!(json["maxOutputTokens"], 512);
        assert!((json["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn response_decoding_joins_candidate_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"{\"score\""},{"text":": 80}"}]}}]}"#;
        let resp: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text: String = resp
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        assert_eq!(text, "{\"score\": 80}");
    }

    #[test]
    fn snippet_truncation_is_char_aware() {
        assert_eq!(truncate_snippet("短い", 10), "短い");
        let long = "あ".repeat(600);
        let cut = truncate_snippet(&long, 500);
        assert!(cut.chars().count() <= 501);
    }
}
