//! Output validation for LLM completions
//!
//! Mode-aware. The booking-language bans are built in and mandatory:
//! configuration can add patterns, never remove these. A completion that
//! trips any ban is rejected outright.

use frontdesk_config::{ContentBans, LlmAssistConfig};
use frontdesk_core::AssistMode;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::echo::EchoGuard;

/// Caller words that may not reappear verbatim in a completion
const ANTI_PARROT_WINDOW: usize = 8;

/// Mandatory booking-language bans: the assist path must never speak
/// times, weekdays, or scheduling phrases. Not relaxable.
static BOOKING_BAN_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("clock-time", r"\b\d{1,2}\s*(am|pm)\b"),
        ("clock-time-colon", r"\b\d{1,2}:\d{2}\b"),
        (
            "weekday",
            r"\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
        ),
        ("schedule-you", r"\bschedule\s+you\b"),
        ("next-available", r"\bnext\s+available\b"),
        ("day-part", r"\b(morning|afternoon|evening)\b"),
        ("book-you", r"\bbook\s+you\b"),
        ("tomorrow-at", r"\btomorrow\s+at\b"),
    ]
    .iter()
    .map(|(name, pattern)| {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("booking ban pattern is valid");
        (*name, regex)
    })
    .collect()
});

static PRICING_RE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"(\$\s*\d|\b\d+\s+dollars\b|\bprice\s+is\b|\bit\s+costs\b|\bfree\s+of\s+charge\b)")
        .case_insensitive(true)
        .build()
        .expect("pricing ban pattern is valid")
});

static GUARANTEE_RE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"\b(guarantee[ds]?|promise[ds]?|definitely\s+fix)\b")
        .case_insensitive(true)
        .build()
        .expect("guarantee ban pattern is valid")
});

static LEGAL_RE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"\b(liab(le|ility)|lawsuit|legal\s+action|negligen(t|ce))\b")
        .case_insensitive(true)
        .build()
        .expect("legal ban pattern is valid")
});

/// Result of validating one completion
#[derive(Debug, Clone)]
pub struct Validation {
    /// Accepted (possibly adjusted) text; `None` means rejected
    pub text: Option<String>,
    /// Ban names and patterns that fired
    pub violations: Vec<String>,
    /// Adjustments applied to the accepted text
    pub adjustments: Vec<&'static str>,
}

impl Validation {
    fn rejected(violations: Vec<String>) -> Self {
        Self {
            text: None,
            violations,
            adjustments: Vec::new(),
        }
    }
}

/// Validate a raw completion against the caller's utterance.
///
/// `handoff_question` is appended in guided mode when the completion
/// does not already end with a question.
pub fn validate(
    mode: AssistMode,
    raw_output: &str,
    caller_text: &str,
    config: &LlmAssistConfig,
    handoff_question: &str,
) -> Validation {
    let mut adjustments = Vec::new();

    let trimmed = raw_output.trim();
    if trimmed.is_empty() {
        return Validation::rejected(vec!["empty-output".to_string()]);
    }

    // Sentence cap
    let (mut text, truncated) = cap_sentences(trimmed, config.max_sentences);
    if truncated {
        adjustments.push("sentence-cap");
    }

    // Anti-parrot
    if EchoGuard::find_overlap(caller_text, &text, ANTI_PARROT_WINDOW).is_some() {
        return Validation::rejected(vec!["anti-parrot".to_string()]);
    }

    // Booking-language bans: built-in first, then configured additions
    let mut violations = Vec::new();
    for (name, regex) in BOOKING_BAN_PATTERNS.iter() {
        if regex.is_match(&text) {
            violations.push(format!("booking:{name}"));
        }
    }
    for pattern in &config.extra_banned_patterns {
        if let Ok(regex) = RegexBuilder::new(pattern).case_insensitive(true).build() {
            if regex.is_match(&text) {
                violations.push(format!("extra:{pattern}"));
            }
        }
    }
    if !violations.is_empty() {
        return Validation::rejected(violations);
    }

    // Content bans by flag
    let content = content_violations(&text, &config.content_bans);
    if !content.is_empty() {
        return Validation::rejected(content);
    }

    match mode {
        AssistMode::Guided => {
            if !text.trim_end().ends_with('?') {
                text = format!("{} {}", text.trim_end(), handoff_question);
                adjustments.push("appended-handoff-question");
            }
        }
        AssistMode::AnswerReturn => {
            if text.trim_end().ends_with('?') {
                text = strip_final_question(&text);
                adjustments.push("stripped-final-question");
                if text.trim().is_empty() {
                    return Validation::rejected(vec!["question-only-output".to_string()]);
                }
            }
        }
    }

    Validation {
        text: Some(text),
        violations: Vec::new(),
        adjustments,
    }
}

fn content_violations(text: &str, bans: &ContentBans) -> Vec<String> {
    let mut violations = Vec::new();
    if bans.pricing && PRICING_RE.is_match(text) {
        violations.push("content:pricing".to_string());
    }
    if bans.guarantees && GUARANTEE_RE.is_match(text) {
        violations.push("content:guarantees".to_string());
    }
    if bans.legal && LEGAL_RE.is_match(text) {
        violations.push("content:legal".to_string());
    }
    violations
}

/// Split into sentences on terminal punctuation, keeping the terminator
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Keep the first `max` sentences, re-punctuating the tail if needed
fn cap_sentences(text: &str, max: usize) -> (String, bool) {
    let sentences = split_sentences(text);
    if sentences.len() <= max {
        return (text.to_string(), false);
    }
    let mut kept = sentences[..max].join(" ");
    if !kept.ends_with(['.', '!', '?']) {
        kept.push('.');
    }
    (kept, true)
}

/// Drop the trailing question sentence
fn strip_final_question(text: &str) -> String {
    let mut sentences = split_sentences(text);
    while sentences.last().is_some_and(|s| s.ends_with('?')) {
        sentences.pop();
    }
    sentences.join(" ")
}

/// First sentence of a validated completion, used as the empathy line
pub fn first_sentence(text: &str) -> String {
    split_sentences(text)
        .into_iter()
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LlmAssistConfig {
        LlmAssistConfig::default()
    }

    const HANDOFF: &str = "Would you like us to get a technician out to take a look?";

    #[test]
    fn test_booking_time_rejected() {
        let validation = validate(
            AssistMode::Guided,
            "I hear you. Can I schedule you tomorrow at 9am?",
            "my furnace is acting up",
            &config(),
            HANDOFF,
        );
        assert!(validation.text.is_none());
        assert!(validation
            .violations
            .iter()
            .any(|v| v.starts_with("booking:")));
    }

    #[test]
    fn test_weekday_rejected() {
        let validation = validate(
            AssistMode::AnswerReturn,
            "We can come out Tuesday.",
            "when can you come",
            &config(),
            HANDOFF,
        );
        assert!(validation.text.is_none());
        assert!(validation.violations.contains(&"booking:weekday".to_string()));
    }

    #[test]
    fn test_guided_gets_handoff_appended() {
        let validation = validate(
            AssistMode::Guided,
            "That sounds really frustrating.",
            "my furnace is acting up",
            &config(),
            HANDOFF,
        );
        let text = validation.text.unwrap();
        assert!(text.ends_with('?'));
        assert!(text.contains(HANDOFF));
        assert!(validation.adjustments.contains(&"appended-handoff-question"));
    }

    #[test]
    fn test_answer_return_strips_final_question() {
        let validation = validate(
            AssistMode::AnswerReturn,
            "Filters need changing twice a year. Want me to explain why?",
            "how often do filters change",
            &config(),
            HANDOFF,
        );
        let text = validation.text.unwrap();
        assert!(!text.ends_with('?'));
        assert!(text.contains("twice a year"));
    }

    #[test]
    fn test_anti_parrot_rejects() {
        let caller = "the big unit out back started making a horrible grinding noise last night";
        let output = "I understand the big unit out back started making a horrible grinding noise last night.";
        let validation = validate(AssistMode::Guided, output, caller, &config(), HANDOFF);
        assert!(validation.text.is_none());
        assert!(validation.violations.contains(&"anti-parrot".to_string()));
    }

    #[test]
    fn test_sentence_cap() {
        let validation = validate(
            AssistMode::AnswerReturn,
            "First sentence. Second sentence. Third sentence. Fourth sentence.",
            "tell me everything",
            &config(),
            HANDOFF,
        );
        let text = validation.text.unwrap();
        assert_eq!(split_sentences(&text).len(), 2);
        assert!(validation.adjustments.contains(&"sentence-cap"));
    }

    #[test]
    fn test_pricing_ban() {
        let validation = validate(
            AssistMode::AnswerReturn,
            "The price is 200 dollars for that repair.",
            "how much",
            &config(),
            HANDOFF,
        );
        assert!(validation.text.is_none());
        assert!(validation.violations.contains(&"content:pricing".to_string()));
    }

    #[test]
    fn test_extra_pattern_adds_never_relaxes() {
        let mut config = config();
        config.extra_banned_patterns = vec![r"\bwarranty\b".to_string()];
        let validation = validate(
            AssistMode::AnswerReturn,
            "Your warranty covers that.",
            "is this covered",
            &config,
            HANDOFF,
        );
        assert!(validation.text.is_none());
    }
}
