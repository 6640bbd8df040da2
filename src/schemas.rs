//! Shared data model: analysis records, topics, scenarios, and the wire
//! request/response shapes used by the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The five recognized keigo registers. Serialized as the Japanese literals
/// so the wire format matches what the model is instructed to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeigoCategory {
    /// 尊敬語: respectful speech elevating the listener or subject
    #[serde(rename = "尊敬語")]
    Respectful,
    /// 謙譲語: humble speech lowering the speaker
    #[serde(rename = "謙譲語")]
    Humble,
    /// 丁寧語: neutral politeness marked by です/ます
    #[serde(rename = "丁寧語")]
    Polite,
    /// 普通語: plain speech with no politeness marking
    #[serde(rename = "普通語")]
    Plain,
    /// 不適切: not usable as keigo
    #[serde(rename = "不適切")]
    Inappropriate,
}

impl KeigoCategory {
    pub fn label(&self) -> &'static str {
        match self {
            KeigoCategory::Respectful => "尊敬語",
            KeigoCategory::Humble => "謙譲語",
            KeigoCategory::Polite => "丁寧語",
            KeigoCategory::Plain => "普通語",
            KeigoCategory::Inappropriate => "不適切",
        }
    }

    /// Map a free-form label from model output onto a recognized category.
    /// Anything unrecognized collapses to 不適切 instead of surfacing garbage.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "尊敬語" => KeigoCategory::Respectful,
            "謙譲語" => KeigoCategory::Humble,
            "丁寧語" => KeigoCategory::Polite,
            "普通語" => KeigoCategory::Plain,
            _ => KeigoCategory::Inappropriate,
        }
    }
}

impl std::fmt::Display for KeigoCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of analyzing one user sentence. Built once per message and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeigoAnalysis {
    pub is_correct: bool,
    pub category: KeigoCategory,
    /// Always within [0, 100]
    pub score: u8,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Detailed scoring record returned by the score-keigo path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeigoScore {
    /// Always within [0, 100]
    pub score: u8,
    pub category: KeigoCategory,
    pub is_correct: bool,
    pub explanation: String,
    #[serde(default)]
    pub good_points: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub better_expressions: Vec<String>,
    #[serde(default)]
    pub grammar_check: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_example: Option<String>,
}

/// A practice topic: scenario question plus hint and optional model answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub topic: String,
    pub question: String,
    pub hint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// One of the fixed practice scenarios.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Scenario {
    pub id: &'static str,
    pub title: &'static str,
    pub context: &'static str,
    pub situation: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// A chat message in the session history. Append-only; ordering is arrival
/// order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<KeigoAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content)
    }

    fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
            analysis: None,
            topic: None,
        }
    }

    pub fn with_analysis(mut self, analysis: KeigoAnalysis) -> Self {
        self.analysis = Some(analysis);
        self
    }

    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topic = Some(topic);
        self
    }
}

/// Body of `POST /api/analyze`. Fields default to empty so that missing keys
/// reach the validation gate (and a 400) instead of failing deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub user_input: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub situation: String,
}

/// Body of `POST /api/score-keigo`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    #[serde(default)]
    pub user_text: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// Body of `POST /api/generate-topic`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTopicRequest {
    #[serde(default)]
    pub existing_topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenariosResponse {
    pub scenarios: Vec<Scenario>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_japanese_literals() {
        let json = serde_json::to_string(&KeigoCategory::Humble).unwrap();
        assert_eq!(json, "\"謙譲語\"");
        let back: KeigoCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, KeigoCategory::Humble);
    }

    #[test]
    fn unknown_category_label_collapses_to_inappropriate() {
        assert_eq!(
            KeigoCategory::from_label("超敬語"),
            KeigoCategory::Inappropriate
        );
        assert_eq!(KeigoCategory::from_label(" 丁寧語 "), KeigoCategory::Polite);
    }

    #[test]
    fn analyze_request_tolerates_missing_fields() {
        let req: AnalyzeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.user_input.is_empty());
        assert!(req.situation.is_empty());
    }
}
