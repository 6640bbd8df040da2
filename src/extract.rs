//! Recovery of structured records from free-form model output.
//!
//! Gemini is instructed to answer with a single JSON object but routinely
//! wraps it in prose or code fences, and occasionally truncates it. The
//! extractor slices the brace-delimited span out of the surrounding text,
//! parses it, and then validates every field individually so that no
//! partial or garbled record ever reaches a caller.

use crate::error::{KeigoError, Result};
use crate::schemas::{KeigoAnalysis, KeigoCategory, KeigoScore, Topic};
use serde_json::Value;

/// Locate the JSON object embedded in `text`.
///
/// Scans from the first `{` tracking brace depth (string-aware, so braces
/// inside string values don't terminate the span early). When the object is
/// truncated and never balances, falls back to the first-`{`..last-`}` slice
/// and lets the JSON parser have the final word.
pub fn json_span(text: &str) -> Result<&str> {
    let start = text.find('{').ok_or_else(|| KeigoError::Parse {
        message: "no JSON object found in model output".to_string(),
    })?;

    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    // `{` and `}` are ASCII, so the slice is char-aligned
                    return Ok(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    match text.rfind('}') {
        Some(end) if end > start => Ok(&text[start..=end]),
        _ => Err(KeigoError::Parse {
            message: "unterminated JSON object in model output".to_string(),
        }),
    }
}

fn parse_object(raw: &str) -> Result<Value> {
    let span = json_span(raw)?;
    serde_json::from_str(span).map_err(|e| KeigoError::Parse {
        message: format!("model output is not valid JSON: {}", e),
    })
}

/// Numeric field clamped into [0, 100]; absent or non-numeric becomes 0.
fn score_field(obj: &Value, key: &str) -> u8 {
    obj.get(key)
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 100.0)
        .round() as u8
}

fn bool_field(obj: &Value, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn string_field(obj: &Value, key: &str, default: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn opt_string_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(obj: &Value, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Category defaulted to 不適切 when the label isn't one of the five
/// recognized literals.
fn category_field(obj: &Value) -> KeigoCategory {
    obj.get("category")
        .and_then(Value::as_str)
        .map(KeigoCategory::from_label)
        .unwrap_or(KeigoCategory::Inappropriate)
}

/// Parse an analysis record out of raw model text.
pub fn parse_analysis(raw: &str) -> Result<KeigoAnalysis> {
    let obj = parse_object(raw)?;
    Ok(KeigoAnalysis {
        is_correct: bool_field(&obj, "isCorrect"),
        category: category_field(&obj),
        score: score_field(&obj, "score"),
        explanation: string_field(&obj, "explanation", "分析結果を取得できませんでした"),
        suggestion: opt_string_field(&obj, "suggestion"),
        examples: string_list(&obj, "examples"),
    })
}

/// Parse a detailed scoring record out of raw model text.
pub fn parse_score(raw: &str) -> Result<KeigoScore> {
    let obj = parse_object(raw)?;
    Ok(KeigoScore {
        score: score_field(&obj, "score"),
        category: category_field(&obj),
        is_correct: bool_field(&obj, "isCorrect"),
        explanation: string_field(&obj, "explanation", "採点結果を取得できませんでした"),
        good_points: string_list(&obj, "goodPoints"),
        improvements: string_list(&obj, "improvements"),
        better_expressions: string_list(&obj, "betterExpressions"),
        grammar_check: string_field(&obj, "grammarCheck", ""),
        correct_example: opt_string_field(&obj, "correctExample"),
    })
}

/// Parse a generated topic. A topic without both a name and a question is
/// useless to the learner, so those are required; everything else defaults.
pub fn parse_topic(raw: &str) -> Result<Topic> {
    let obj = parse_object(raw)?;
    let topic = opt_string_field(&obj, "topic").ok_or_else(|| KeigoError::Parse {
        message: "generated topic is missing a name".to_string(),
    })?;
    let question = opt_string_field(&obj, "question").ok_or_else(|| KeigoError::Parse {
        message: "generated topic is missing a question".to_string(),
    })?;

    Ok(Topic {
        topic,
        question,
        hint: string_field(&obj, "hint", ""),
        answer: opt_string_field(&obj, "answer"),
        alternatives: string_list(&obj, "alternatives"),
        explanation: opt_string_field(&obj, "explanation"),
        category: opt_string_field(&obj, "category"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_skips_surrounding_prose() {
        let raw = "もちろんです！\n{\"score\": 80}\nご参考まで。";
        assert_eq!(json_span(raw).unwrap(), "{\"score\": 80}");
    }

    #[test]
    fn span_handles_nested_objects_and_trailing_braces() {
        let raw = "x {\"a\": {\"b\": 1}} y } z";
        assert_eq!(json_span(raw).unwrap(), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn span_ignores_braces_inside_strings() {
        let raw = "{\"explanation\": \"例: {です}\"} 後書き";
        assert_eq!(json_span(raw).unwrap(), "{\"explanation\": \"例: {です}\"}");
    }

    #[test]
    fn span_fails_without_braces() {
        assert!(json_span("敬語についての説明だけの文章").is_err());
        assert!(json_span("ここに { だけ").is_err());
    }

    #[test]
    fn out_of_range_score_is_clamped() {
        let raw = "blah {\"score\":150,\"category\":\"尊敬語\"} blah";
        let score = parse_score(raw).unwrap();
        assert_eq!(score.score, 100);
        assert_eq!(score.category, KeigoCategory::Respectful);
    }

    #[test]
    fn negative_score_clamps_to_zero() {
        let analysis = parse_analysis("{\"score\": -20, \"category\": \"丁寧語\"}").unwrap();
        assert_eq!(analysis.score, 0);
    }

    #[test]
    fn unknown_category_defaults_to_inappropriate() {
        let analysis =
            parse_analysis("{\"score\": 50, \"category\": \"タメ口\", \"isCorrect\": true}")
                .unwrap();
        assert_eq!(analysis.category, KeigoCategory::Inappropriate);
        assert!(analysis.is_correct);
    }

    #[test]
    fn code_fenced_output_still_parses() {
        let raw = "```json\n{\"isCorrect\": true, \"category\": \"謙譲語\", \"score\": 90, \"explanation\": \"良い敬語です\"}\n```";
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.category, KeigoCategory::Humble);
        assert_eq!(analysis.score, 90);
    }

    #[test]
    fn topic_requires_name_and_question() {
        assert!(parse_topic("{\"hint\": \"ヒントのみ\"}").is_err());
        let topic =
            parse_topic("{\"topic\": \"駅敬語\", \"question\": \"駅員さんへの質問は？\"}").unwrap();
        assert_eq!(topic.topic, "駅敬語");
        assert!(topic.hint.is_empty());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let res = parse_analysis("{\"score\": 80, \"category\": ");
        assert!(matches!(res, Err(KeigoError::Parse { .. })));
    }
}
