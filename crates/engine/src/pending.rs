//! Classifiers for agent-initiated questions
//!
//! Two classifiers, both driven by configurable word/phrase lists and
//! both pure: state transitions happen in the runner, never here.
//!
//! - Generic pending questions classify into 4 buckets
//!   (yes / no / reprompt / complex).
//! - Trigger-card follow-ups classify into 5 buckets
//!   (yes / no / hesitant / reprompt / complex), with marker priority
//!   yes > no > hesitant > reprompt > complex.

use frontdesk_config::PendingWordsConfig;

use crate::text::tokenize;

/// Character count at or below which an utterance is a micro-utterance
const MICRO_UTTERANCE_CHARS: usize = 8;

/// Character count at or above which a non-yes/no answer is substantive
const COMPLEX_CHARS: usize = 15;

/// Buckets for a generic pending question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingBucket {
    Yes,
    No,
    Reprompt,
    /// Substantive answer: clear the pending flag and fall through
    Complex,
}

impl PendingBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            PendingBucket::Yes => "yes",
            PendingBucket::No => "no",
            PendingBucket::Reprompt => "reprompt",
            PendingBucket::Complex => "complex",
        }
    }
}

/// Buckets for a trigger-card follow-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpBucket {
    Yes,
    No,
    Hesitant,
    Reprompt,
    Complex,
}

impl FollowUpBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowUpBucket::Yes => "yes",
            FollowUpBucket::No => "no",
            FollowUpBucket::Hesitant => "hesitant",
            FollowUpBucket::Reprompt => "reprompt",
            FollowUpBucket::Complex => "complex",
        }
    }
}

/// Word-list-driven classifier
pub struct PendingClassifier<'a> {
    words: &'a PendingWordsConfig,
}

impl<'a> PendingClassifier<'a> {
    pub fn new(words: &'a PendingWordsConfig) -> Self {
        Self { words }
    }

    /// Classify a response to a generic pending question.
    ///
    /// `raw_text` is consulted for the name-like check only; everything
    /// else runs on the normalized text.
    pub fn classify_generic(&self, normalized: &str, raw_text: &str) -> PendingBucket {
        let tokens = tokenize(normalized);
        let has_yes = self.has_yes(normalized, &tokens);
        let has_no = self.has_no(normalized, &tokens);

        if has_yes && !has_no {
            return PendingBucket::Yes;
        }
        if has_no {
            return PendingBucket::No;
        }

        let chars = normalized.trim().chars().count();
        if chars <= MICRO_UTTERANCE_CHARS || is_name_like(raw_text) {
            return PendingBucket::Reprompt;
        }
        if chars >= COMPLEX_CHARS {
            return PendingBucket::Complex;
        }
        PendingBucket::Reprompt
    }

    /// Classify a response to a trigger-card follow-up.
    pub fn classify_follow_up(&self, normalized: &str) -> FollowUpBucket {
        let tokens = tokenize(normalized);

        if self.has_yes(normalized, &tokens) {
            return FollowUpBucket::Yes;
        }
        if self.has_no(normalized, &tokens) {
            return FollowUpBucket::No;
        }
        if self.has_hesitant(normalized, &tokens) {
            return FollowUpBucket::Hesitant;
        }

        let chars = normalized.trim().chars().count();
        if chars >= COMPLEX_CHARS {
            return FollowUpBucket::Complex;
        }
        FollowUpBucket::Reprompt
    }

    /// Strict yes/no for clarifier and handoff resolution.
    /// `None` means unclear.
    pub fn classify_yes_no(&self, normalized: &str) -> Option<bool> {
        let tokens = tokenize(normalized);
        let has_yes = self.has_yes(normalized, &tokens);
        let has_no = self.has_no(normalized, &tokens);
        match (has_yes, has_no) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        }
    }

    fn has_yes(&self, text: &str, tokens: &[String]) -> bool {
        let text_lower = text.to_lowercase();
        self.words
            .yes_words
            .iter()
            .any(|w| tokens.iter().any(|t| t == &w.to_lowercase()))
            || self
                .words
                .yes_phrases
                .iter()
                .any(|p| text_lower.contains(&p.to_lowercase()))
    }

    fn has_no(&self, text: &str, tokens: &[String]) -> bool {
        let text_lower = text.to_lowercase();
        self.words
            .no_words
            .iter()
            .any(|w| tokens.iter().any(|t| t == &w.to_lowercase()))
            || self
                .words
                .no_phrases
                .iter()
                .any(|p| text_lower.contains(&p.to_lowercase()))
    }

    fn has_hesitant(&self, text: &str, tokens: &[String]) -> bool {
        let text_lower = text.to_lowercase();
        self.words.hesitant_markers.iter().any(|m| {
            let marker = m.to_lowercase();
            if marker.contains(' ') {
                text_lower.contains(&marker)
            } else {
                tokens.iter().any(|t| t == &marker)
            }
        })
    }
}

/// A single capitalized alphabetic token reads like a name
fn is_name_like(raw_text: &str) -> bool {
    let trimmed = raw_text.trim();
    let mut words = trimmed.split_whitespace();
    let (Some(first), None) = (words.next(), words.next()) else {
        return false;
    };
    first.chars().next().is_some_and(|c| c.is_uppercase())
        && first.chars().all(|c| c.is_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier_words() -> PendingWordsConfig {
        PendingWordsConfig::default()
    }

    #[test]
    fn test_generic_yes() {
        let words = classifier_words();
        let classifier = PendingClassifier::new(&words);
        assert_eq!(
            classifier.classify_generic("yes please", "yes please"),
            PendingBucket::Yes
        );
        assert_eq!(
            classifier.classify_generic("that's right", "that's right"),
            PendingBucket::Yes
        );
    }

    #[test]
    fn test_generic_yes_with_no_marker_is_not_yes() {
        let words = classifier_words();
        let classifier = PendingClassifier::new(&words);
        assert_eq!(
            classifier.classify_generic("yes no wait", "yes no wait"),
            PendingBucket::No
        );
    }

    #[test]
    fn test_generic_micro_utterance_reprompts() {
        let words = classifier_words();
        let classifier = PendingClassifier::new(&words);
        assert_eq!(
            classifier.classify_generic("what", "what"),
            PendingBucket::Reprompt
        );
    }

    #[test]
    fn test_generic_name_like_reprompts() {
        let words = classifier_words();
        let classifier = PendingClassifier::new(&words);
        assert_eq!(
            classifier.classify_generic("margaret", "Margaret"),
            PendingBucket::Reprompt
        );
    }

    #[test]
    fn test_generic_complex() {
        let words = classifier_words();
        let classifier = PendingClassifier::new(&words);
        assert_eq!(
            classifier.classify_generic(
                "the water heater in the garage started leaking",
                "the water heater in the garage started leaking"
            ),
            PendingBucket::Complex
        );
    }

    #[test]
    fn test_follow_up_priority_yes_over_hesitant() {
        let words = classifier_words();
        let classifier = PendingClassifier::new(&words);
        // Contains both a hesitant marker and a yes word
        assert_eq!(
            classifier.classify_follow_up("um yes i think so"),
            FollowUpBucket::Yes
        );
    }

    #[test]
    fn test_follow_up_hesitant() {
        let words = classifier_words();
        let classifier = PendingClassifier::new(&words);
        assert_eq!(
            classifier.classify_follow_up("hmm i'm not sure"),
            FollowUpBucket::Hesitant
        );
    }

    #[test]
    fn test_follow_up_complex_falls_through() {
        let words = classifier_words();
        let classifier = PendingClassifier::new(&words);
        assert_eq!(
            classifier.classify_follow_up("my landlord handles all the billing for this"),
            FollowUpBucket::Complex
        );
    }

    #[test]
    fn test_yes_no_unclear() {
        let words = classifier_words();
        let classifier = PendingClassifier::new(&words);
        assert_eq!(classifier.classify_yes_no("yes"), Some(true));
        assert_eq!(classifier.classify_yes_no("nope"), Some(false));
        assert_eq!(classifier.classify_yes_no("the blue one"), None);
    }
}
