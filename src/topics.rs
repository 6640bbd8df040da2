//! Topic generation and the fixed practice scenarios.
//!
//! Generation follows the same orchestration shape as analysis but with a
//! single attempt and a different degraded mode: instead of a heuristic it
//! falls back to a pre-authored pool, picked pseudo-randomly.

use once_cell::sync::Lazy;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

use crate::error::{KeigoError, Result};
use crate::extract;
use crate::gemini::GenerativeClient;
use crate::prompts;
use crate::schemas::{Scenario, Topic};

static FALLBACK_POOL: Lazy<Vec<Topic>> = Lazy::new(|| {
    let entry = |topic: &str, question: &str, hint: &str| Topic {
        topic: topic.to_string(),
        question: question.to_string(),
        hint: hint.to_string(),
        answer: None,
        alternatives: vec![],
        explanation: None,
        category: None,
    };
    vec![
        entry(
            "病院敬語",
            "病院の受付で「診察券をお持ちですか？」を丁寧に言うと？",
            "お客様（患者様）に対する最上級の敬語を考えてみましょう",
        ),
        entry(
            "美容院敬語",
            "美容師さんに「もう少し短くしてください」を敬語で言ってみて！",
            "プロの技術者に対する敬意を込めた表現",
        ),
        entry(
            "銀行敬語",
            "銀行窓口で「口座を作りたいです」をもっと丁寧に！",
            "金融機関での正式な手続きの場面",
        ),
    ]
});

/// The four named practice scenarios served by the scenario listing.
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "business-meeting",
            title: "ビジネス会議",
            context: "重要な商談の場面",
            situation: "上司と顧客が同席している会議室",
        },
        Scenario {
            id: "customer-service",
            title: "顧客対応",
            context: "お客様からの問い合わせ対応",
            situation: "電話での顧客サービス",
        },
        Scenario {
            id: "email-writing",
            title: "メール作成",
            context: "社外への重要なメール",
            situation: "取引先への提案メール",
        },
        Scenario {
            id: "presentation",
            title: "プレゼンテーション",
            context: "役員への報告",
            situation: "四半期業績発表会",
        },
    ]
}

fn fallback_topic() -> Topic {
    let mut rng = rand::thread_rng();
    FALLBACK_POOL[rng.gen_range(0..FALLBACK_POOL.len())].clone()
}

pub struct TopicService {
    client: Option<Arc<dyn GenerativeClient>>,
    deadline: Duration,
}

impl TopicService {
    pub fn new(client: Option<Arc<dyn GenerativeClient>>, deadline: Duration) -> Self {
        Self { client, deadline }
    }

    /// Generate one fresh practice topic, avoiding the given names. Any
    /// external or parse failure selects from the static pool instead; only
    /// a missing API key surfaces as an error.
    pub async fn generate(&self, existing_topics: &[String]) -> Result<Topic> {
        let client = self.client.as_ref().ok_or_else(|| KeigoError::Config {
            message: "GEMINI_API_KEY is not set".to_string(),
        })?;

        let prompt = prompts::topic_prompt(existing_topics);
        let outcome = match timeout(self.deadline, client.generate(&prompt)).await {
            Ok(Ok(raw)) => extract::parse_topic(&raw),
            Ok(Err(e)) => Err(KeigoError::External {
                message: e.to_string(),
            }),
            Err(_) => Err(KeigoError::External {
                message: format!("topic generation timed out after {:?}", self.deadline),
            }),
        };

        match outcome {
            Ok(topic) => Ok(topic),
            Err(e) => {
                warn!("Topic generation degraded to the static pool: {e}");
                Ok(fallback_topic())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_list_is_the_fixed_four() {
        let list = scenarios();
        assert_eq!(list.len(), 4);
        let ids: Vec<_> = list.iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            [
                "business-meeting",
                "customer-service",
                "email-writing",
                "presentation"
            ]
        );
    }

    #[test]
    fn fallback_pool_entries_are_well_formed() {
        for topic in FALLBACK_POOL.iter() {
            assert!(!topic.topic.is_empty());
            assert!(!topic.question.is_empty());
            assert!(!topic.hint.is_empty());
        }
    }
}
