//! One-shot short-greeting interceptor
//!
//! Fires at most once per call, only on short inputs, and never when the
//! caller already has business intent in their first words.

use frontdesk_config::GreetingsConfig;

use crate::text::tokenize;

/// A greeting rule that fired
#[derive(Debug, Clone)]
pub struct InterceptedGreeting {
    pub rule_id: String,
    pub response_text: Option<String>,
    pub audio_url: Option<String>,
}

/// Outcome of evaluating the interceptor, with the proof for the audit
/// event either way
#[derive(Debug, Clone)]
pub struct GreetingDecision {
    pub intercepted: Option<InterceptedGreeting>,
    /// Why interception did not happen
    pub block_reason: Option<&'static str>,
}

/// The interceptor; stateless, the `greeted` latch lives in call state
pub struct GreetingInterceptor;

impl GreetingInterceptor {
    pub fn evaluate(config: &GreetingsConfig, greeted: bool, raw_text: &str) -> GreetingDecision {
        if !config.enabled {
            return blocked("disabled");
        }
        if greeted {
            return blocked("already-greeted");
        }

        let tokens = tokenize(raw_text);
        if tokens.len() > config.max_words_to_qualify {
            return blocked("too-long");
        }

        let text_lower = raw_text.to_lowercase();
        let has_intent = config.intent_keywords.iter().any(|keyword| {
            let keyword_lower = keyword.to_lowercase();
            if keyword_lower.contains(' ') {
                text_lower.contains(&keyword_lower)
            } else {
                tokens.iter().any(|t| t == &keyword_lower)
            }
        });
        if has_intent {
            return blocked("intent-keyword");
        }

        let mut rules: Vec<_> = config.rules.iter().filter(|r| r.enabled).collect();
        rules.sort_by_key(|r| r.priority);

        for rule in rules {
            let hit = rule.triggers.iter().any(|trigger| {
                let trigger_lower = trigger.to_lowercase();
                if trigger_lower.contains(' ') {
                    text_lower.contains(&trigger_lower)
                } else {
                    tokens.iter().any(|t| t == &trigger_lower)
                }
            });
            if hit {
                return GreetingDecision {
                    intercepted: Some(InterceptedGreeting {
                        rule_id: rule.id.clone(),
                        response_text: rule.response_text.clone(),
                        audio_url: rule.audio_url.clone(),
                    }),
                    block_reason: None,
                };
            }
        }

        blocked("no-rule-matched")
    }
}

fn blocked(reason: &'static str) -> GreetingDecision {
    GreetingDecision {
        intercepted: None,
        block_reason: Some(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_config::GreetingRule;

    fn config() -> GreetingsConfig {
        GreetingsConfig {
            rules: vec![GreetingRule {
                id: "hello".to_string(),
                enabled: true,
                priority: 1,
                triggers: vec!["hi".to_string(), "hello".to_string(), "good morning".to_string()],
                response_text: Some("Hi there! How can I help you today?".to_string()),
                audio_url: None,
            }],
            ..GreetingsConfig::default()
        }
    }

    #[test]
    fn test_short_greeting_intercepted() {
        let decision = GreetingInterceptor::evaluate(&config(), false, "hi there");
        let hit = decision.intercepted.unwrap();
        assert_eq!(hit.rule_id, "hello");
    }

    #[test]
    fn test_phrase_trigger() {
        let decision = GreetingInterceptor::evaluate(&config(), false, "good morning");
        assert!(decision.intercepted.is_some());
    }

    #[test]
    fn test_latch_blocks_second_greeting() {
        let decision = GreetingInterceptor::evaluate(&config(), true, "hello");
        assert!(decision.intercepted.is_none());
        assert_eq!(decision.block_reason, Some("already-greeted"));
    }

    #[test]
    fn test_long_input_blocked() {
        let decision =
            GreetingInterceptor::evaluate(&config(), false, "hi there my AC is not cooling");
        assert_eq!(decision.block_reason, Some("too-long"));
    }

    #[test]
    fn test_intent_keyword_blocks() {
        let decision = GreetingInterceptor::evaluate(&config(), false, "hi emergency here");
        assert_eq!(decision.block_reason, Some("intent-keyword"));
    }
}
