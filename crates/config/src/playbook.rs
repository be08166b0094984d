//! UI-owned playbook lines: pending-question words and responses,
//! follow-up buckets, and the deterministic fallback chain

use frontdesk_core::FollowUpDirection;
use serde::{Deserialize, Serialize};

/// Word and phrase lists driving the yes/no classifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingWordsConfig {
    #[serde(default = "default_yes_words")]
    pub yes_words: Vec<String>,
    #[serde(default = "default_yes_phrases")]
    pub yes_phrases: Vec<String>,
    #[serde(default = "default_no_words")]
    pub no_words: Vec<String>,
    #[serde(default = "default_no_phrases")]
    pub no_phrases: Vec<String>,
    #[serde(default = "default_hesitant_markers")]
    pub hesitant_markers: Vec<String>,
    /// Generic pending-question response lines
    #[serde(default = "default_pending_yes_response")]
    pub yes_response: String,
    #[serde(default = "default_pending_no_response")]
    pub no_response: String,
    #[serde(default = "default_reprompt_response")]
    pub reprompt_response: String,
}

fn default_yes_words() -> Vec<String> {
    [
        "yes", "yeah", "yep", "yup", "sure", "correct", "right", "ok", "okay", "absolutely",
        "definitely", "please",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_yes_phrases() -> Vec<String> {
    [
        "that's right",
        "that is right",
        "go ahead",
        "sounds good",
        "that works",
        "yes please",
        "let's do it",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_no_words() -> Vec<String> {
    ["no", "nope", "nah", "negative"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_no_phrases() -> Vec<String> {
    [
        "not right now",
        "no thanks",
        "no thank you",
        "i don't think so",
        "not really",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_hesitant_markers() -> Vec<String> {
    [
        "um", "uh", "hmm", "maybe", "well", "i guess", "not sure", "i don't know",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_pending_yes_response() -> String {
    "Great.".to_string()
}

fn default_pending_no_response() -> String {
    "No problem. What else can I help you with?".to_string()
}

fn default_reprompt_response() -> String {
    "Sorry, I didn't quite catch that — was that a yes or a no?".to_string()
}

impl Default for PendingWordsConfig {
    fn default() -> Self {
        Self {
            yes_words: default_yes_words(),
            yes_phrases: default_yes_phrases(),
            no_words: default_no_words(),
            no_phrases: default_no_phrases(),
            hesitant_markers: default_hesitant_markers(),
            yes_response: default_pending_yes_response(),
            no_response: default_pending_no_response(),
            reprompt_response: default_reprompt_response(),
        }
    }
}

/// One follow-up bucket: a response line and the direction it executes.
///
/// The YES bucket's direction is overridden by the asking card's
/// `next_action` when one is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpBucket {
    pub response: String,
    #[serde(default)]
    pub direction: FollowUpDirection,
}

/// Responses for the 5-bucket follow-up classifier
/// (complex carries no bucket; it falls through to the pipeline)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpBucketsConfig {
    #[serde(default = "default_followup_yes")]
    pub yes: FollowUpBucket,
    #[serde(default = "default_followup_no")]
    pub no: FollowUpBucket,
    #[serde(default = "default_followup_hesitant")]
    pub hesitant: FollowUpBucket,
    #[serde(default = "default_followup_reprompt")]
    pub reprompt: FollowUpBucket,
}

fn default_followup_yes() -> FollowUpBucket {
    FollowUpBucket {
        response: "Great — let me get that scheduled for you.".to_string(),
        direction: FollowUpDirection::ContinueDiscovery,
    }
}

fn default_followup_no() -> FollowUpBucket {
    FollowUpBucket {
        response: "No problem. Is there anything else I can help you with?".to_string(),
        direction: FollowUpDirection::ContinueDiscovery,
    }
}

fn default_followup_hesitant() -> FollowUpBucket {
    FollowUpBucket {
        response: "Take your time — no pressure at all.".to_string(),
        direction: FollowUpDirection::ContinueDiscovery,
    }
}

fn default_followup_reprompt() -> FollowUpBucket {
    FollowUpBucket {
        response: "Sorry, I didn't catch that.".to_string(),
        direction: FollowUpDirection::ContinueDiscovery,
    }
}

impl Default for FollowUpBucketsConfig {
    fn default() -> Self {
        Self {
            yes: default_followup_yes(),
            no: default_followup_no(),
            hesitant: default_followup_hesitant(),
            reprompt: default_followup_reprompt(),
        }
    }
}

/// Deterministic fallback lines and the pending-question machinery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybookConfig {
    /// Spoken when nothing matched and no reason was captured
    #[serde(default = "default_no_match_answer")]
    pub no_match_answer: String,
    /// Last-resort UI-owned line for any degraded path
    #[serde(default = "default_emergency_fallback")]
    pub emergency_fallback: String,
    /// Empathy template for the known-reason fallback;
    /// `{reason}` is replaced with the captured reason
    #[serde(default = "default_human_tone")]
    pub human_tone_empathy: String,
    #[serde(default)]
    pub pending: PendingWordsConfig,
    #[serde(default)]
    pub follow_up: FollowUpBucketsConfig,
}

fn default_no_match_answer() -> String {
    "I want to make sure I get you to the right place. Could you tell me a little more about what's going on?".to_string()
}

fn default_emergency_fallback() -> String {
    "Let me make sure the office takes care of that for you. One moment please.".to_string()
}

fn default_human_tone() -> String {
    "I'm sorry you're dealing with {reason} — that's no fun at all.".to_string()
}

impl Default for PlaybookConfig {
    fn default() -> Self {
        Self {
            no_match_answer: default_no_match_answer(),
            emergency_fallback: default_emergency_fallback(),
            human_tone_empathy: default_human_tone(),
            pending: PendingWordsConfig::default(),
            follow_up: FollowUpBucketsConfig::default(),
        }
    }
}
