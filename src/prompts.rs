//! Prompt construction for the Gemini backend.
//!
//! Each builder states the task in Japanese, embeds the caller's text
//! verbatim, and pins down the exact JSON shape expected back. Interpolating
//! user text unescaped is an accepted trust boundary: the consumer is a
//! best-effort generative text service, not an interpreter.

/// Prompt for the sentence-analysis path. Asks for a compact JSON record.
pub fn analysis_prompt(user_input: &str, situation: &str) -> String {
    format!(
        r#"以下の日本語文章の敬語使用を分析してください。

文章: "{user_input}"
状況: {situation}

以下のJSON形式で簡潔に回答してください（必ず「正しい敬語表現例」を含めてください）：
{{
  "isCorrect": true/false,
  "category": "尊敬語"/"謙譲語"/"丁寧語"/"普通語"/"不適切",
  "score": 0-100の数値,
  "explanation": "簡潔な説明（50文字以内）",
  "suggestion": "改善提案（あれば）",
  "examples": ["より良い表現例"]
}}
"#
    )
}

/// Prompt for the detailed scoring path, including the full scoring rubric.
pub fn scoring_prompt(user_text: &str, context: &str) -> String {
    format!(
        r#"以下のユーザーの敬語表現を詳しく採点してください。

【ユーザーの入力】
"{user_text}"

【文脈・シチュエーション】
{context}

以下のJSON形式で回答してください（必ず「正しい敬語表現例」を含めてください）：
{{
  "score": 85,
  "category": "謙譲語",
  "isCorrect": true,
  "explanation": "詳しい解説",
  "goodPoints": ["良い点1", "良い点2"],
  "improvements": ["改善点1", "改善点2"],
  "betterExpressions": ["より良い表現1", "より良い表現2"],
  "grammarCheck": "文法的な指摘があれば",
  "correctExample": "最も正しい敬語表現例"
}}

採点基準：
- 100点: 完璧な敬語（尊敬語・謙譲語・丁寧語が適切に使われている）
- 80-99点: とても良い敬語（少し改善の余地がある）
- 60-79点: 一般的な敬語レベル（基本はできているが向上が必要）
- 40-59点: 敬語の使い方に問題がある
- 20-39点: 敬語として不適切
- 0-19点: 敬語になっていない

要件：
- scoreは0-100の数値
- categoryは「尊敬語」「謙譲語」「丁寧語」「普通語」「不適切」のいずれか
- isCorrectは敬語として適切かどうかのboolean
- explanationは敬語の種類と評価理由の詳しい説明
- goodPointsは良かった点（配列）
- improvementsは改善点（配列）
- betterExpressionsはより良い表現の提案（配列）
- grammarCheckは文法的な問題があれば指摘（なければ空文字）
"#
    )
}

/// Prompt for generating one new practice topic, avoiding the given names.
pub fn topic_prompt(existing_topics: &[String]) -> String {
    format!(
        r#"日本語の敬語学習用の新しいトピックを1つ生成してください。

既存のトピック（重複を避けてください）:
{}

以下のJSON形式で回答してください：
{{
  "topic": "○○敬語",
  "question": "具体的なシチュエーションでの敬語の質問",
  "hint": "学習者へのヒント"
}}

要件：
- 日常生活やビジネスシーンで実際に使える実用的なシチュエーション
- 親しみやすく、面白みのある設定
- 既存のトピックとは異なる新しい視点
- 敬語（尊敬語、謙譲語、丁寧語）の学習に役立つ内容
"#,
        existing_topics.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_embeds_input_and_situation() {
        let prompt = analysis_prompt("お世話になっております", "取引先への電話");
        assert!(prompt.contains("お世話になっております"));
        assert!(prompt.contains("取引先への電話"));
        assert!(prompt.contains("isCorrect"));
    }

    #[test]
    fn scoring_prompt_carries_the_rubric_bands() {
        let prompt = scoring_prompt("伺います", "一般的なビジネス・接客シーン");
        assert!(prompt.contains("100点"));
        assert!(prompt.contains("0-19点"));
        assert!(prompt.contains("correctExample"));
    }

    #[test]
    fn topic_prompt_lists_existing_topics() {
        let existing = vec!["病院敬語".to_string(), "銀行敬語".to_string()];
        let prompt = topic_prompt(&existing);
        assert!(prompt.contains("病院敬語, 銀行敬語"));
    }
}
