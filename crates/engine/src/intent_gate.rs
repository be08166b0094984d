//! Intent priority gate
//!
//! Detects service-down and emergency intent before card evaluation.
//! While intent is flagged, FAQ-style cards are penalized; in emergency
//! they are removed from the pool entirely.

use frontdesk_config::{IntentGateConfig, IntentKind, TriggerCard};
use regex::{Regex, RegexBuilder};

/// Flags raised against the current utterance
#[derive(Debug, Clone, Default)]
pub struct IntentFlags {
    pub service_down: bool,
    pub emergency: bool,
    /// Ids of the patterns that fired
    pub matched_patterns: Vec<String>,
}

impl IntentFlags {
    pub fn any(&self) -> bool {
        self.service_down || self.emergency
    }
}

struct CompiledPattern {
    id: String,
    regex: Regex,
    kind: IntentKind,
}

/// Compiled gate for one configuration
pub struct IntentGate {
    enabled: bool,
    patterns: Vec<CompiledPattern>,
    disqualified_categories: Vec<String>,
    penalty: i32,
}

impl IntentGate {
    /// Compile the gate. Patterns that fail to compile were already
    /// reported by the validator and are skipped here.
    pub fn new(config: &IntentGateConfig) -> Self {
        let patterns = config
            .patterns
            .iter()
            .filter_map(|p| {
                match RegexBuilder::new(&p.pattern).case_insensitive(true).build() {
                    Ok(regex) => Some(CompiledPattern {
                        id: p.id.clone(),
                        regex,
                        kind: p.kind,
                    }),
                    Err(e) => {
                        tracing::warn!(pattern = %p.id, error = %e, "Skipping uncompilable intent pattern");
                        None
                    }
                }
            })
            .collect();

        Self {
            enabled: config.enabled,
            patterns,
            disqualified_categories: config.disqualified_categories.clone(),
            penalty: config.penalty,
        }
    }

    /// Evaluate the utterance against all patterns
    pub fn evaluate(&self, text: &str) -> IntentFlags {
        let mut flags = IntentFlags::default();
        if !self.enabled {
            return flags;
        }
        for pattern in &self.patterns {
            if pattern.regex.is_match(text) {
                match pattern.kind {
                    IntentKind::ServiceDown => flags.service_down = true,
                    IntentKind::Emergency => flags.emergency = true,
                }
                flags.matched_patterns.push(pattern.id.clone());
            }
        }
        flags
    }

    /// Whether a card belongs to a pushed-down category
    pub fn disqualifies(&self, card: &TriggerCard) -> bool {
        let matches = |value: &str| {
            self.disqualified_categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(value))
        };
        card.category.as_deref().is_some_and(|c| matches(c))
            || matches(&card.id)
            || matches(&card.label)
    }

    pub fn penalty(&self) -> i32 {
        self.penalty
    }
}
