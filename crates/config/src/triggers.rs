//! Trigger cards: declarative matching rules with response payloads

use frontdesk_core::FollowUpDirection;
use serde::{Deserialize, Serialize};

/// Matching criteria for one card
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MatchSpec {
    /// Word-based: a keyword matches when every word of it appears
    /// anywhere in the input token set
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Substring-based: a phrase matches as a contiguous run
    #[serde(default)]
    pub phrases: Vec<String>,
    /// Word-based veto: a negative matches when all of its words appear
    #[serde(default)]
    pub negatives: Vec<String>,
}

/// Response payload, dispatched on the card's response mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnswerPayload {
    /// Pre-written line or recorded audio
    Static {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        audio_url: Option<String>,
    },
    /// Constrained LLM completion grounded on a fact pack
    Llm {
        fact_pack: String,
        /// Spoken when the completion fails validation or errors
        #[serde(default)]
        fallback_text: Option<String>,
    },
}

impl AnswerPayload {
    /// Static text, if this payload carries one
    pub fn static_text(&self) -> Option<&str> {
        match self {
            AnswerPayload::Static { text, .. } => text.as_deref(),
            AnswerPayload::Llm { fallback_text, .. } => fallback_text.as_deref(),
        }
    }

    pub fn audio_url(&self) -> Option<&str> {
        match self {
            AnswerPayload::Static { audio_url, .. } => audio_url.as_deref(),
            AnswerPayload::Llm { .. } => None,
        }
    }
}

/// Optional question appended after the card's answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
    pub question: String,
    /// Direction executed when the caller answers yes
    #[serde(default)]
    pub next_action: FollowUpDirection,
}

/// One declarative trigger rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerCard {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Base priority; lower wins
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Category used by hint boosts and the intent gate,
    /// e.g. "thermostat", "faq"
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "match")]
    pub match_spec: MatchSpec,
    pub answer: AnswerPayload,
    #[serde(default)]
    pub follow_up: Option<FollowUp>,
}

fn default_enabled() -> bool {
    true
}

fn default_priority() -> i32 {
    100
}

impl TriggerCard {
    /// Whether the card has any positive matching criteria at all
    pub fn has_criteria(&self) -> bool {
        !self.match_spec.keywords.is_empty() || !self.match_spec.phrases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_deserialization() {
        let yaml = r#"
id: ac_not_cooling
label: "AC not cooling"
priority: 10
category: cooling
match:
  keywords: ["ac", "not cooling"]
  phrases: ["blowing warm air"]
  negatives: ["heater"]
answer:
  mode: static
  text: "That sounds like your AC isn't cooling properly."
follow_up:
  question: "Would you like us to send a technician?"
  next_action: HANDOFF_BOOKING
"#;
        let card: TriggerCard = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(card.id, "ac_not_cooling");
        assert!(card.enabled);
        assert_eq!(card.match_spec.keywords.len(), 2);
        assert_eq!(
            card.answer.static_text(),
            Some("That sounds like your AC isn't cooling properly.")
        );
        let follow_up = card.follow_up.unwrap();
        assert_eq!(follow_up.next_action, FollowUpDirection::HandoffBooking);
    }

    #[test]
    fn test_llm_answer_payload() {
        let yaml = r#"
id: warranty_faq
match:
  keywords: ["warranty"]
answer:
  mode: llm
  fact_pack: "Labor warranty is 1 year. Parts follow the manufacturer."
  fallback_text: "We do offer warranty coverage on our work."
"#;
        let card: TriggerCard = serde_yaml::from_str(yaml).unwrap();
        match &card.answer {
            AnswerPayload::Llm { fact_pack, .. } => {
                assert!(fact_pack.contains("warranty"));
            }
            _ => panic!("expected llm payload"),
        }
        assert_eq!(
            card.answer.static_text(),
            Some("We do offer warranty coverage on our work.")
        );
    }
}
