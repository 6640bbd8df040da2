//! Deterministic keigo classification used when the generative backend is
//! unavailable or returns unusable output.
//!
//! A priority-ordered table of marker substrings is evaluated top-down and
//! the first matching rule wins. Substring matching is crude across word
//! boundaries (られる can occur inside unrelated words), which is acceptable
//! for the degraded path only; Gemini remains the primary judge.

use crate::schemas::{KeigoAnalysis, KeigoCategory, KeigoScore};

/// Humble-form markers (謙譲語)
const HUMBLE_MARKERS: &[&str] = &["申し上げ", "させていただ", "伺", "拝見"];

/// Respectful-form markers (尊敬語)
const RESPECTFUL_MARKERS: &[&str] = &["いらっしゃる", "なさる", "れる", "られる"];

/// Polite-copula markers (丁寧語)
const POLITE_MARKERS: &[&str] = &["です", "ます", "ございます"];

const HUMBLE_SCORE: u8 = 85;
const RESPECTFUL_SCORE: u8 = 85;
/// Single constant for every polite-copula hit
const POLITE_SCORE: u8 = 70;
const PLAIN_SCORE: u8 = 40;

struct Rule {
    markers: &'static [&'static str],
    category: KeigoCategory,
    score: u8,
}

/// Highest specificity first; humble beats respectful beats polite.
const RULES: &[Rule] = &[
    Rule {
        markers: HUMBLE_MARKERS,
        category: KeigoCategory::Humble,
        score: HUMBLE_SCORE,
    },
    Rule {
        markers: RESPECTFUL_MARKERS,
        category: KeigoCategory::Respectful,
        score: RESPECTFUL_SCORE,
    },
    Rule {
        markers: POLITE_MARKERS,
        category: KeigoCategory::Polite,
        score: POLITE_SCORE,
    },
];

/// Pure, deterministic classifier over the rule table. No external calls.
#[derive(Debug, Default)]
pub struct HeuristicJudge;

impl HeuristicJudge {
    pub fn new() -> Self {
        HeuristicJudge
    }

    /// Classify a sentence by marker substrings alone.
    pub fn classify(&self, text: &str) -> KeigoAnalysis {
        for rule in RULES {
            if rule.markers.iter().any(|m| text.contains(m)) {
                return KeigoAnalysis {
                    is_correct: true,
                    category: rule.category,
                    score: rule.score,
                    explanation: format!(
                        "{}が使われています。適切な敬語表現です。",
                        rule.category
                    ),
                    suggestion: None,
                    examples: vec![],
                };
            }
        }

        KeigoAnalysis {
            is_correct: false,
            category: KeigoCategory::Plain,
            score: PLAIN_SCORE,
            explanation: "普通語が使われています。もう少し丁寧な表現を心がけましょう。"
                .to_string(),
            suggestion: Some(
                "文末に「です・ます」を追加してより丁寧な表現にしてみてください。".to_string(),
            ),
            examples: vec![],
        }
    }

    /// Degraded-mode detailed scoring built from the same rule table.
    pub fn score(&self, text: &str) -> KeigoScore {
        let analysis = self.classify(text);
        let good_points = if analysis.is_correct {
            vec![format!("{}を適切に使用", analysis.category)]
        } else {
            vec![]
        };
        let improvements = if analysis.is_correct {
            vec![]
        } else {
            vec!["「です・ます」を使ってより丁寧に".to_string()]
        };

        KeigoScore {
            score: analysis.score,
            category: analysis.category,
            is_correct: analysis.is_correct,
            explanation: analysis.explanation,
            good_points,
            improvements,
            better_expressions: vec![],
            grammar_check: String::new(),
            correct_example: None,
        }
    }
}
