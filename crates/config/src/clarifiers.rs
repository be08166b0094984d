//! Clarifier entries: hint -> disambiguation question -> lock

use frontdesk_core::LockSpec;
use serde::{Deserialize, Serialize};

/// One disambiguation rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarifierEntry {
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Lower wins when several hints are active
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Soft hint that makes this entry applicable
    pub hint_trigger: String,
    /// Question spoken to the caller
    pub question: String,
    /// Lock written when the caller confirms
    #[serde(default)]
    pub locks_to: Option<LockSpec>,
}

fn default_enabled() -> bool {
    true
}

fn default_priority() -> i32 {
    100
}

/// Clarifier configuration with a per-call ask budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarifiersConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Questions asked per call before the branch goes quiet
    #[serde(default = "default_max_asks")]
    pub max_asks_per_call: u32,
    #[serde(default)]
    pub entries: Vec<ClarifierEntry>,
}

fn default_max_asks() -> u32 {
    2
}

impl Default for ClarifiersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_asks_per_call: default_max_asks(),
            entries: Vec::new(),
        }
    }
}

impl ClarifiersConfig {
    /// Highest-priority enabled entry whose hint is in the active set
    pub fn best_for_hints(&self, hints: &[String]) -> Option<&ClarifierEntry> {
        self.entries
            .iter()
            .filter(|e| e.enabled && hints.iter().any(|h| h == &e.hint_trigger))
            .min_by_key(|e| e.priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, priority: i32, hint: &str) -> ClarifierEntry {
        ClarifierEntry {
            id: id.to_string(),
            enabled: true,
            priority,
            hint_trigger: hint.to_string(),
            question: format!("Is that the {}?", id),
            locks_to: None,
        }
    }

    #[test]
    fn test_best_for_hints_picks_highest_priority() {
        let config = ClarifiersConfig {
            enabled: true,
            max_asks_per_call: 2,
            entries: vec![
                entry("breaker", 20, "maybe_breaker"),
                entry("thermostat", 10, "maybe_thermostat"),
            ],
        };

        let hints = vec![
            "maybe_breaker".to_string(),
            "maybe_thermostat".to_string(),
        ];
        let best = config.best_for_hints(&hints).unwrap();
        assert_eq!(best.id, "thermostat");

        assert!(config.best_for_hints(&["unrelated".to_string()]).is_none());
    }
}
