//! Clarifier engine: disambiguation questions over soft hints
//!
//! Ask branch: when no trigger matched but hints are active and the
//! per-call budget is not spent, ask the highest-priority applicable
//! question. Resolution branch: classify the caller's answer next turn
//! and write a lock (yes), drop the hint (no), or just move on.

use frontdesk_config::{ClarifierEntry, ClarifiersConfig};
use frontdesk_core::PendingClarifier;

use crate::pending::PendingClassifier;

/// How a pending clarifier resolved
#[derive(Debug, Clone)]
pub enum ClarifierResolution {
    /// Caller confirmed; the configured lock (if any) should be written
    Confirmed,
    /// Caller denied; the triggering hint should be removed
    Denied,
    /// Neither; clear the clarifier and continue the pipeline
    Unclear,
}

impl ClarifierResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClarifierResolution::Confirmed => "confirmed",
            ClarifierResolution::Denied => "denied",
            ClarifierResolution::Unclear => "unclear",
        }
    }
}

/// The clarifier engine; pure selection and classification
pub struct ClarifierEngine;

impl ClarifierEngine {
    /// Ask branch: the entry to ask, or `None` when nothing applies
    /// or the budget is exhausted
    pub fn pick<'a>(
        config: &'a ClarifiersConfig,
        hints: &[String],
        asks_so_far: u32,
    ) -> Option<&'a ClarifierEntry> {
        if !config.enabled || asks_so_far >= config.max_asks_per_call {
            return None;
        }
        config.best_for_hints(hints)
    }

    /// Resolution branch: classify the caller's answer
    pub fn resolve(
        classifier: &PendingClassifier<'_>,
        _pending: &PendingClarifier,
        normalized: &str,
    ) -> ClarifierResolution {
        match classifier.classify_yes_no(normalized) {
            Some(true) => ClarifierResolution::Confirmed,
            Some(false) => ClarifierResolution::Denied,
            None => ClarifierResolution::Unclear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_config::PendingWordsConfig;
    use frontdesk_core::LockSpec;

    fn config() -> ClarifiersConfig {
        ClarifiersConfig {
            enabled: true,
            max_asks_per_call: 1,
            entries: vec![ClarifierEntry {
                id: "thermostat".to_string(),
                enabled: true,
                priority: 10,
                hint_trigger: "maybe_thermostat".to_string(),
                question: "Is that the thermostat on the wall?".to_string(),
                locks_to: Some(LockSpec {
                    key: "component".to_string(),
                    value: "thermostat".to_string(),
                }),
            }],
        }
    }

    fn pending() -> PendingClarifier {
        PendingClarifier {
            id: "thermostat".to_string(),
            hint_trigger: "maybe_thermostat".to_string(),
            locks_to: Some(LockSpec {
                key: "component".to_string(),
                value: "thermostat".to_string(),
            }),
            turn: 1,
        }
    }

    #[test]
    fn test_pick_respects_budget() {
        let config = config();
        let hints = vec!["maybe_thermostat".to_string()];
        assert!(ClarifierEngine::pick(&config, &hints, 0).is_some());
        assert!(ClarifierEngine::pick(&config, &hints, 1).is_none());
    }

    #[test]
    fn test_pick_needs_applicable_hint() {
        let config = config();
        assert!(ClarifierEngine::pick(&config, &[], 0).is_none());
        assert!(ClarifierEngine::pick(&config, &["maybe_breaker".to_string()], 0).is_none());
    }

    #[test]
    fn test_resolution_buckets() {
        let words = PendingWordsConfig::default();
        let classifier = PendingClassifier::new(&words);
        let pending = pending();

        assert!(matches!(
            ClarifierEngine::resolve(&classifier, &pending, "yes"),
            ClarifierResolution::Confirmed
        ));
        assert!(matches!(
            ClarifierEngine::resolve(&classifier, &pending, "no it's the unit outside"),
            ClarifierResolution::Denied
        ));
        assert!(matches!(
            ClarifierEngine::resolve(&classifier, &pending, "the silver box"),
            ClarifierResolution::Unclear
        ));
    }
}
