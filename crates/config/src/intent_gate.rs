//! Intent priority gate configuration
//!
//! The gate detects service-down and emergency intent from regex
//! patterns. When it fires, FAQ-style cards are penalized (or, in
//! emergency, removed from the pool) so the urgent card wins.

use serde::{Deserialize, Serialize};

/// Kind of urgent intent a pattern detects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Equipment stopped working
    ServiceDown,
    /// Safety-relevant situation (gas smell, sparks, flooding)
    Emergency,
}

/// One gate pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentPattern {
    pub id: String,
    /// Regex, compiled case-insensitively by the engine
    pub pattern: String,
    pub kind: IntentKind,
}

/// Gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentGateConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_patterns")]
    pub patterns: Vec<IntentPattern>,
    /// Card categories/ids/labels pushed down while intent is flagged
    #[serde(default = "default_disqualified")]
    pub disqualified_categories: Vec<String>,
    /// Added to a disqualified card's effective priority (service-down)
    #[serde(default = "default_penalty")]
    pub penalty: i32,
}

fn default_enabled() -> bool {
    true
}

fn default_penalty() -> i32 {
    50
}

fn default_disqualified() -> Vec<String> {
    vec!["faq".to_string(), "pricing".to_string()]
}

fn default_patterns() -> Vec<IntentPattern> {
    vec![
        IntentPattern {
            id: "service_down".to_string(),
            pattern: r"\b(not (working|cooling|heating|running)|stopped working|won'?t (turn on|start)|no (heat|air|power|hot water))\b".to_string(),
            kind: IntentKind::ServiceDown,
        },
        IntentPattern {
            id: "emergency".to_string(),
            pattern: r"\b(gas (smell|leak)|smell gas|sparks?|smoke|flood(ing|ed)?|burst pipe|carbon monoxide)\b".to_string(),
            kind: IntentKind::Emergency,
        },
    ]
}

impl Default for IntentGateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            patterns: default_patterns(),
            disqualified_categories: default_disqualified(),
            penalty: default_penalty(),
        }
    }
}
