//! The per-company configuration bundle
//!
//! A read-only snapshot of everything one company's receptionist may say
//! or match on. Every spoken line is addressable by a dotted UI path so
//! provenance can be recorded for each spoken byte.

use serde::{Deserialize, Serialize};

use crate::behavior::BehaviorConfig;
use crate::clarifiers::ClarifiersConfig;
use crate::greetings::GreetingsConfig;
use crate::intent_gate::IntentGateConfig;
use crate::llm_assist::LlmAssistConfig;
use crate::playbook::PlaybookConfig;
use crate::triggers::{AnswerPayload, TriggerCard};
use crate::vocabulary::{TextConfig, VocabularyEntry};

/// Feature switches evaluated at turn entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Master gate; off means every turn returns a disabled outcome
    #[serde(default = "default_true")]
    pub discovery_enabled: bool,
    /// Optional external scenario fallback branch
    #[serde(default)]
    pub use_scenario_fallback: bool,
    /// Minimum scenario confidence before its pick is used
    #[serde(default = "default_scenario_confidence")]
    pub scenario_confidence_min: f32,
    /// Scenario types the fallback may speak
    #[serde(default)]
    pub scenario_allowed_types: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_scenario_confidence() -> f32 {
    0.7
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            discovery_enabled: true,
            use_scenario_fallback: false,
            scenario_confidence_min: default_scenario_confidence(),
            scenario_allowed_types: Vec::new(),
        }
    }
}

/// Output guard settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardsConfig {
    /// Consecutive caller words that may not reappear verbatim in a response
    #[serde(default = "default_echo_window")]
    pub echo_window_words: usize,
}

fn default_echo_window() -> usize {
    8
}

impl Default for GuardsConfig {
    fn default() -> Self {
        Self {
            echo_window_words: default_echo_window(),
        }
    }
}

/// A line resolved from a UI path: pre-written text or recorded audio
#[derive(Debug, Clone)]
pub struct SpokenLine {
    pub text: Option<String>,
    pub audio_url: Option<String>,
}

impl SpokenLine {
    fn text(value: &str) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        Some(Self {
            text: Some(value.to_string()),
            audio_url: None,
        })
    }

    fn from_parts(text: Option<&str>, audio_url: Option<&str>) -> Option<Self> {
        let text = text.filter(|t| !t.is_empty()).map(|t| t.to_string());
        let audio_url = audio_url.filter(|u| !u.is_empty()).map(|u| u.to_string());
        if text.is_none() && audio_url.is_none() {
            return None;
        }
        Some(Self { text, audio_url })
    }
}

/// The full company bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyConfig {
    /// Set by the resolver from the requested company id
    #[serde(default)]
    pub company_id: String,
    /// Bundle version; bumps invalidate the trigger-variable cache
    #[serde(default)]
    pub version: u64,
    /// Monotonic updated-at marker folded into the config hash
    #[serde(default)]
    pub updated_at: u64,
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub greetings: GreetingsConfig,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyEntry>,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub triggers: Vec<TriggerCard>,
    /// Keywords that veto every card when all their words appear
    #[serde(default)]
    pub global_negatives: Vec<String>,
    #[serde(default)]
    pub intent_gate: IntentGateConfig,
    #[serde(default)]
    pub clarifiers: ClarifiersConfig,
    #[serde(default)]
    pub assist: LlmAssistConfig,
    #[serde(default)]
    pub playbook: PlaybookConfig,
    #[serde(default)]
    pub guards: GuardsConfig,
}

impl CompanyConfig {
    /// Minimal bundle for a company id; used by tests and as merge base
    pub fn bare(company_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            version: 0,
            updated_at: 0,
            features: FeatureFlags::default(),
            behavior: BehaviorConfig::default(),
            greetings: GreetingsConfig::default(),
            vocabulary: Vec::new(),
            text: TextConfig::default(),
            triggers: Vec::new(),
            global_negatives: Vec::new(),
            intent_gate: IntentGateConfig::default(),
            clarifiers: ClarifiersConfig::default(),
            assist: LlmAssistConfig::default(),
            playbook: PlaybookConfig::default(),
            guards: GuardsConfig::default(),
        }
    }

    /// Stable hash of the parts that shape a turn: rule count, ack word,
    /// assist mode, and the updated-at marker. Attached to every event.
    pub fn config_hash(&self) -> String {
        let seed = format!(
            "{}|{}|{}|{}",
            self.triggers.len(),
            self.behavior.ack_word,
            self.assist.mode.as_str(),
            self.updated_at,
        );
        format!("{:016x}", fnv1a64(seed.as_bytes()))
    }

    /// Look up a trigger card by id
    pub fn card(&self, id: &str) -> Option<&TriggerCard> {
        self.triggers.iter().find(|c| c.id == id)
    }

    /// Resolve a dotted UI path to the line it owns.
    ///
    /// Returns `None` for unknown paths and for paths whose configured
    /// value is empty; the speak gate treats both as unmapped.
    pub fn resolve_path(&self, path: &str) -> Option<SpokenLine> {
        let segments: Vec<&str> = path.split('.').collect();
        match segments.as_slice() {
            ["behavior", "ackWord"] => SpokenLine::text(&self.behavior.ack_word),
            ["behavior", "robotChallenge", "line"] => {
                SpokenLine::text(&self.behavior.robot_challenge.line)
            }
            ["greetings", "rules", id] => {
                let rule = self.greetings.rules.iter().find(|r| r.id == *id)?;
                SpokenLine::from_parts(rule.response_text.as_deref(), rule.audio_url.as_deref())
            }
            ["triggers", "cards", id, "answer"] => {
                let card = self.card(id)?;
                match &card.answer {
                    AnswerPayload::Static { text, audio_url } => {
                        SpokenLine::from_parts(text.as_deref(), audio_url.as_deref())
                    }
                    // An LLM answer is anchored by its fact pack; the
                    // fallback text is the spoken substitute when set
                    AnswerPayload::Llm {
                        fact_pack,
                        fallback_text,
                    } => {
                        let anchor = fallback_text
                            .as_deref()
                            .filter(|t| !t.is_empty())
                            .or_else(|| (!fact_pack.is_empty()).then_some(fact_pack.as_str()));
                        SpokenLine::from_parts(anchor, None)
                    }
                }
            }
            ["triggers", "cards", id, "answer", "fallbackText"] => {
                let card = self.card(id)?;
                match &card.answer {
                    AnswerPayload::Llm { fallback_text, .. } => {
                        SpokenLine::from_parts(fallback_text.as_deref(), None)
                    }
                    AnswerPayload::Static { .. } => None,
                }
            }
            ["triggers", "cards", id, "followUp", "question"] => {
                let card = self.card(id)?;
                SpokenLine::text(&card.follow_up.as_ref()?.question)
            }
            ["clarifiers", id, "question"] => {
                let entry = self.clarifiers.entries.iter().find(|e| e.id == *id)?;
                SpokenLine::text(&entry.question)
            }
            ["assist", "handoff", "confirmServiceQuestion"] => {
                SpokenLine::text(&self.assist.handoff.confirm_service_question)
            }
            ["assist", "handoff", "takeMessageQuestion"] => {
                SpokenLine::text(&self.assist.handoff.take_message_question)
            }
            ["assist", "handoff", "offerForwardQuestion"] => {
                SpokenLine::text(&self.assist.handoff.offer_forward_question)
            }
            ["assist", "handoff", "yesResponse"] => {
                SpokenLine::text(&self.assist.handoff.yes_response)
            }
            ["assist", "handoff", "noResponse"] => {
                SpokenLine::text(&self.assist.handoff.no_response)
            }
            // Prompt paths anchor provenance for LLM-produced speech
            ["assist", "guided", "systemPrompt"] => {
                SpokenLine::text(&self.assist.guided.system_prompt)
            }
            ["assist", "answerReturn", "systemPrompt"] => {
                SpokenLine::text(&self.assist.answer_return.system_prompt)
            }
            ["discovery", "playbook", "fallback", "noMatchAnswer"] => {
                SpokenLine::text(&self.playbook.no_match_answer)
            }
            ["discovery", "playbook", "fallback", "emergencyFallback"] => {
                SpokenLine::text(&self.playbook.emergency_fallback)
            }
            ["discovery", "playbook", "humanTone", "empathy"] => {
                SpokenLine::text(&self.playbook.human_tone_empathy)
            }
            ["discovery", "playbook", "pending", "yesResponse"] => {
                SpokenLine::text(&self.playbook.pending.yes_response)
            }
            ["discovery", "playbook", "pending", "noResponse"] => {
                SpokenLine::text(&self.playbook.pending.no_response)
            }
            ["discovery", "playbook", "pending", "repromptResponse"] => {
                SpokenLine::text(&self.playbook.pending.reprompt_response)
            }
            ["discovery", "playbook", "followUp", "yes", "response"] => {
                SpokenLine::text(&self.playbook.follow_up.yes.response)
            }
            ["discovery", "playbook", "followUp", "no", "response"] => {
                SpokenLine::text(&self.playbook.follow_up.no.response)
            }
            ["discovery", "playbook", "followUp", "hesitant", "response"] => {
                SpokenLine::text(&self.playbook.follow_up.hesitant.response)
            }
            ["discovery", "playbook", "followUp", "reprompt", "response"] => {
                SpokenLine::text(&self.playbook.follow_up.reprompt.response)
            }
            _ => None,
        }
    }

    /// UI path of the emergency fallback line
    pub const EMERGENCY_FALLBACK_PATH: &'static str =
        "discovery.playbook.fallback.emergencyFallback";
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::MatchSpec;

    fn config_with_card() -> CompanyConfig {
        let mut config = CompanyConfig::bare("acme-hvac");
        config.triggers.push(TriggerCard {
            id: "ac_not_cooling".to_string(),
            label: "AC not cooling".to_string(),
            enabled: true,
            priority: 10,
            category: Some("cooling".to_string()),
            match_spec: MatchSpec {
                keywords: vec!["ac".to_string()],
                phrases: vec![],
                negatives: vec![],
            },
            answer: AnswerPayload::Static {
                text: Some("That sounds like your AC isn't cooling properly.".to_string()),
                audio_url: None,
            },
            follow_up: None,
        });
        config
    }

    #[test]
    fn test_config_hash_stability() {
        let config = config_with_card();
        assert_eq!(config.config_hash(), config.config_hash());

        let mut changed = config.clone();
        changed.updated_at = 42;
        assert_ne!(config.config_hash(), changed.config_hash());

        let mut reworded = config.clone();
        reworded.behavior.ack_word = "Sure.".to_string();
        assert_ne!(config.config_hash(), reworded.config_hash());
    }

    #[test]
    fn test_resolve_card_answer_path() {
        let config = config_with_card();
        let line = config
            .resolve_path("triggers.cards.ac_not_cooling.answer")
            .unwrap();
        assert!(line.text.unwrap().contains("isn't cooling"));

        assert!(config.resolve_path("triggers.cards.nonexistent.answer").is_none());
        assert!(config.resolve_path("not.a.real.path").is_none());
    }

    #[test]
    fn test_resolve_fallback_paths() {
        let config = CompanyConfig::bare("acme");
        assert!(config
            .resolve_path("discovery.playbook.fallback.noMatchAnswer")
            .is_some());
        assert!(config.resolve_path(CompanyConfig::EMERGENCY_FALLBACK_PATH).is_some());
        assert!(config.resolve_path("behavior.ackWord").is_some());
    }

    #[test]
    fn test_empty_line_is_unmapped() {
        let mut config = CompanyConfig::bare("acme");
        config.playbook.no_match_answer = String::new();
        assert!(config
            .resolve_path("discovery.playbook.fallback.noMatchAnswer")
            .is_none());
    }
}
