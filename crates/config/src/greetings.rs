//! Short-greeting interception rules

use serde::{Deserialize, Serialize};

/// One greeting rule; the first match by priority wins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreetingRule {
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Lower wins
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Trigger words/phrases, matched against the raw input
    pub triggers: Vec<String>,
    #[serde(default)]
    pub response_text: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_priority() -> i32 {
    100
}

/// Greeting interceptor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreetingsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Inputs longer than this many words never qualify
    #[serde(default = "default_max_words")]
    pub max_words_to_qualify: usize,
    /// Words that signal the caller already has business intent;
    /// their presence blocks interception even on short inputs
    #[serde(default = "default_intent_keywords")]
    pub intent_keywords: Vec<String>,
    #[serde(default)]
    pub rules: Vec<GreetingRule>,
}

fn default_max_words() -> usize {
    4
}

fn default_intent_keywords() -> Vec<String> {
    [
        "broken", "leaking", "emergency", "appointment", "schedule", "repair", "quote", "price",
        "invoice", "cancel",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for GreetingsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_words_to_qualify: default_max_words(),
            intent_keywords: default_intent_keywords(),
            rules: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greetings_deserialization() {
        let yaml = r#"
max_words_to_qualify: 3
rules:
  - id: hello
    priority: 1
    triggers: ["hi", "hello", "hey"]
    response_text: "Hi there! How can I help you today?"
"#;
        let greetings: GreetingsConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(greetings.enabled);
        assert_eq!(greetings.max_words_to_qualify, 3);
        assert_eq!(greetings.rules.len(), 1);
        assert_eq!(greetings.rules[0].triggers.len(), 3);
        // Intent keywords fall back to the built-in set
        assert!(greetings.intent_keywords.iter().any(|k| k == "emergency"));
    }
}
