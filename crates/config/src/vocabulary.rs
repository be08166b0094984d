//! Vocabulary entries and text-pipeline configuration
//!
//! Two entry kinds exist. A hard-normalize entry rewrites tokens in the
//! working text (ASR cleanup, brand spellings). A soft-hint entry never
//! touches the text; it only adds a hint label to the call state for the
//! matcher to use as a priority signal.

use serde::{Deserialize, Serialize};

/// What a vocabulary entry does when it matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyKind {
    /// Replace matched text with `to`
    HardNormalize,
    /// Add `to` as a hint label; text is untouched
    SoftHint,
}

/// How `from` is matched against the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Whole-word match
    #[default]
    Exact,
    /// Case-insensitive substring match
    Contains,
}

/// A single vocabulary rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyEntry {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Lower applies first; ties break by position in the list
    #[serde(default)]
    pub priority: i32,
    pub kind: VocabularyKind,
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Pattern to look for
    pub from: String,
    /// Replacement text (hard-normalize) or hint label (soft-hint)
    pub to: String,
}

fn default_enabled() -> bool {
    true
}

/// One equivalence class for matcher-side synonym expansion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymGroup {
    pub members: Vec<String>,
}

/// Filler stripping, synonym expansion, and quality-gate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// Phrases removed alongside the built-in filler set
    #[serde(default)]
    pub ignore_phrases: Vec<String>,
    /// Synonym equivalence classes; expansion is additive only
    #[serde(default)]
    pub synonyms: Vec<SynonymGroup>,
    /// Normalized text shorter than this trips the quality gate
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
}

fn default_min_chars() -> usize {
    2
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            ignore_phrases: Vec::new(),
            synonyms: Vec::new(),
            min_chars: default_min_chars(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_deserialization() {
        let yaml = r#"
- kind: hard_normalize
  match_mode: exact
  priority: 10
  from: "acee"
  to: "ac"
- kind: soft_hint
  match_mode: contains
  from: "thingy on the wall"
  to: "maybe_thermostat"
"#;
        let entries: Vec<VocabularyEntry> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].enabled);
        assert_eq!(entries[0].kind, VocabularyKind::HardNormalize);
        assert_eq!(entries[0].match_mode, MatchMode::Exact);
        assert_eq!(entries[1].kind, VocabularyKind::SoftHint);
        assert_eq!(entries[1].match_mode, MatchMode::Contains);
        assert_eq!(entries[1].to, "maybe_thermostat");
    }

    #[test]
    fn test_text_config_defaults() {
        let text: TextConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(text.min_chars, 2);
        assert!(text.ignore_phrases.is_empty());
    }
}
