//! Complexity scoring for the assist decision gate
//!
//! A scalar in [0,1] from five factors: word count, clause markers,
//! question marks, multi-intent markers, and complex question keywords.

use crate::text::tokenize;

/// Words at or above which an utterance counts as long
const LONG_WORDS: usize = 18;
/// Words at or above which an utterance counts as medium
const MEDIUM_WORDS: usize = 10;

const MULTI_INTENT_MARKERS: &[&str] = &["also", "plus", "as well", "another thing", "on top of that"];

/// Factor-by-factor breakdown, kept for the decision event
#[derive(Debug, Clone, Default)]
pub struct ComplexityScore {
    pub score: f32,
    pub word_count: usize,
    pub clause_markers: usize,
    pub question_marks: usize,
    pub multi_intent: bool,
    /// The complex keyword that hit, if any
    pub keyword_hit: Option<String>,
}

/// Score one utterance against the configured complex keywords
pub fn score(text: &str, complex_keywords: &[String]) -> ComplexityScore {
    let tokens = tokenize(text);
    let text_lower = text.to_lowercase();

    let mut result = ComplexityScore {
        word_count: tokens.len(),
        ..Default::default()
    };
    let mut score = 0.0f32;

    if result.word_count >= LONG_WORDS {
        score += 0.3;
    } else if result.word_count >= MEDIUM_WORDS {
        score += 0.15;
    }

    result.clause_markers = text.matches(',').count()
        + tokens
            .iter()
            .filter(|t| matches!(t.as_str(), "and" | "but" | "or"))
            .count();
    if result.clause_markers >= 2 {
        score += 0.2;
    } else if result.clause_markers == 1 {
        score += 0.1;
    }

    result.question_marks = text.matches('?').count();
    if result.question_marks > 0 {
        score += 0.15;
    }

    result.multi_intent = MULTI_INTENT_MARKERS.iter().any(|m| {
        if m.contains(' ') {
            text_lower.contains(m)
        } else {
            tokens.iter().any(|t| t == m)
        }
    });
    if result.multi_intent {
        score += 0.2;
    }

    result.keyword_hit = complex_keywords
        .iter()
        .find(|k| {
            let keyword = k.to_lowercase();
            if keyword.contains(' ') {
                text_lower.contains(&keyword)
            } else {
                tokens.iter().any(|t| t == &keyword)
            }
        })
        .cloned();
    if result.keyword_hit.is_some() {
        score += 0.25;
    }

    result.score = score.min(1.0);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Vec<String> {
        ["why", "how", "should", "warranty"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_simple_statement_scores_low() {
        let result = score("my ac is broken", &keywords());
        assert!(result.score < 0.3, "score was {}", result.score);
        assert!(result.keyword_hit.is_none());
    }

    #[test]
    fn test_long_multi_clause_question_scores_high() {
        let result = score(
            "the unit upstairs is rattling, and the one downstairs won't start, so how should we handle both, and also is this under warranty?",
            &keywords(),
        );
        assert!(result.score >= 0.65, "score was {}", result.score);
        assert!(result.keyword_hit.is_some());
        assert!(result.multi_intent);
    }

    #[test]
    fn test_score_clamped_to_one() {
        let result = score(
            "why, how, and should I, plus also another thing, but or and why how should, and more words to pad this out considerably today?",
            &keywords(),
        );
        assert!(result.score <= 1.0);
    }
}
