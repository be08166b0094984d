//! LLM assist configuration
//!
//! Two modes. Guided mode produces one empathy sentence and hands the
//! second sentence to a UI-owned handoff question. Answer-return mode
//! produces a free-standing answer that must not end in a question.
//! The booking-language bans applied to LLM output are built into the
//! engine and cannot be relaxed here; `extra_banned_patterns` only adds.

use frontdesk_core::AssistMode;
use serde::{Deserialize, Serialize};

/// Which UI-owned handoff question guided mode appends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HandoffVariant {
    #[default]
    ConfirmService,
    TakeMessage,
    OfferForward,
}

/// UI-owned handoff lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffConfig {
    #[serde(default)]
    pub variant: HandoffVariant,
    #[serde(default = "default_confirm_service")]
    pub confirm_service_question: String,
    #[serde(default = "default_take_message")]
    pub take_message_question: String,
    #[serde(default = "default_offer_forward")]
    pub offer_forward_question: String,
    /// Spoken when the caller answers yes to the handoff question
    #[serde(default = "default_yes_response")]
    pub yes_response: String,
    /// Spoken when the caller answers no
    #[serde(default = "default_no_response")]
    pub no_response: String,
}

fn default_confirm_service() -> String {
    "Would you like us to get a technician out to take a look?".to_string()
}

fn default_take_message() -> String {
    "Can I take your name and number so the office can call you right back?".to_string()
}

fn default_offer_forward() -> String {
    "Would you like me to forward you to someone at the office?".to_string()
}

fn default_yes_response() -> String {
    "Great — let me get that scheduled for you.".to_string()
}

fn default_no_response() -> String {
    "No problem. Is there anything else I can help you with?".to_string()
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            variant: HandoffVariant::default(),
            confirm_service_question: default_confirm_service(),
            take_message_question: default_take_message(),
            offer_forward_question: default_offer_forward(),
            yes_response: default_yes_response(),
            no_response: default_no_response(),
        }
    }
}

impl HandoffConfig {
    /// The question for the active variant
    pub fn question(&self) -> &str {
        match self.variant {
            HandoffVariant::ConfirmService => &self.confirm_service_question,
            HandoffVariant::TakeMessage => &self.take_message_question,
            HandoffVariant::OfferForward => &self.offer_forward_question,
        }
    }

    /// Dotted UI path of the question for the active variant
    pub fn question_path(&self) -> &'static str {
        match self.variant {
            HandoffVariant::ConfirmService => "assist.handoff.confirmServiceQuestion",
            HandoffVariant::TakeMessage => "assist.handoff.takeMessageQuestion",
            HandoffVariant::OfferForward => "assist.handoff.offerForwardQuestion",
        }
    }
}

/// Guided-mode settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidedConfig {
    #[serde(default = "default_guided_system")]
    pub system_prompt: String,
    #[serde(default = "default_guided_format")]
    pub format_prompt: String,
    #[serde(default = "default_guided_safety")]
    pub safety_prompt: String,
    /// Guided LLM turns allowed per call
    #[serde(default = "default_guided_turns")]
    pub max_llm_fallback_turns_per_call: u32,
}

fn default_guided_system() -> String {
    "You are the phone receptionist for a home-services company. The caller said something our playbook did not cover. Respond with empathy in plain spoken language.".to_string()
}

fn default_guided_format() -> String {
    "Reply with at most two short sentences. The second sentence must be a question that moves the call forward.".to_string()
}

fn default_guided_safety() -> String {
    "Never promise prices, timeframes, or outcomes. Never attempt to schedule anything yourself.".to_string()
}

fn default_guided_turns() -> u32 {
    1
}

impl Default for GuidedConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_guided_system(),
            format_prompt: default_guided_format(),
            safety_prompt: default_guided_safety(),
            max_llm_fallback_turns_per_call: default_guided_turns(),
        }
    }
}

/// Answer-return-mode settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerReturnConfig {
    #[serde(default = "default_answer_system")]
    pub system_prompt: String,
    #[serde(default = "default_max_uses")]
    pub max_uses_per_call: u32,
    /// Turns to wait between uses
    #[serde(default = "default_cooldown")]
    pub cooldown_turns: u32,
}

fn default_answer_system() -> String {
    "You are the phone receptionist for a home-services company. Answer the caller's question factually in plain spoken language. Do not ask any question.".to_string()
}

fn default_max_uses() -> u32 {
    2
}

fn default_cooldown() -> u32 {
    2
}

impl Default for AnswerReturnConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_answer_system(),
            max_uses_per_call: default_max_uses(),
            cooldown_turns: default_cooldown(),
        }
    }
}

/// Content bans enforced on validated output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBans {
    #[serde(default = "default_true")]
    pub pricing: bool,
    #[serde(default = "default_true")]
    pub guarantees: bool,
    #[serde(default = "default_true")]
    pub legal: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ContentBans {
    fn default() -> Self {
        Self {
            pricing: true,
            guarantees: true,
            legal: true,
        }
    }
}

/// Full LLM assist configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAssistConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mode: AssistMode,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Hard deadline for the completion call
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
    #[serde(default)]
    pub guided: GuidedConfig,
    #[serde(default)]
    pub answer_return: AnswerReturnConfig,
    #[serde(default)]
    pub handoff: HandoffConfig,
    /// Complexity score at or above which the gate opens
    #[serde(default = "default_complexity_threshold")]
    pub complexity_threshold: f32,
    /// Keywords that open the gate outright
    #[serde(default = "default_complex_keywords")]
    pub complex_keywords: Vec<String>,
    /// Additional banned regexes; built-in bans always apply
    #[serde(default)]
    pub extra_banned_patterns: Vec<String>,
    #[serde(default)]
    pub content_bans: ContentBans,
    /// Sentences kept from the raw completion
    #[serde(default = "default_max_sentences")]
    pub max_sentences: usize,
    /// Speak the emergency fallback on completion error/timeout;
    /// when false the assist path is skipped silently
    #[serde(default = "default_true")]
    pub use_emergency_fallback_on_error: bool,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    120
}

fn default_deadline_ms() -> u64 {
    4_000
}

fn default_complexity_threshold() -> f32 {
    0.65
}

fn default_complex_keywords() -> Vec<String> {
    ["why", "how", "should", "warranty", "versus", "difference", "recommend"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_sentences() -> usize {
    2
}

impl Default for LlmAssistConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: AssistMode::Guided,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            deadline_ms: default_deadline_ms(),
            guided: GuidedConfig::default(),
            answer_return: AnswerReturnConfig::default(),
            handoff: HandoffConfig::default(),
            complexity_threshold: default_complexity_threshold(),
            complex_keywords: default_complex_keywords(),
            extra_banned_patterns: Vec::new(),
            content_bans: ContentBans::default(),
            max_sentences: default_max_sentences(),
            use_emergency_fallback_on_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handoff_variant_selection() {
        let mut handoff = HandoffConfig::default();
        assert!(handoff.question().contains("technician"));
        assert_eq!(handoff.question_path(), "assist.handoff.confirmServiceQuestion");

        handoff.variant = HandoffVariant::TakeMessage;
        assert!(handoff.question().contains("name and number"));
    }

    #[test]
    fn test_assist_defaults() {
        let assist = LlmAssistConfig::default();
        assert!(!assist.enabled);
        assert_eq!(assist.mode, AssistMode::Guided);
        assert_eq!(assist.deadline_ms, 4_000);
        assert_eq!(assist.guided.max_llm_fallback_turns_per_call, 1);
        assert_eq!(assist.max_sentences, 2);
        assert!((assist.complexity_threshold - 0.65).abs() < f32::EPSILON);
    }
}
