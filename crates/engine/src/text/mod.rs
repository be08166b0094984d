//! Text preprocessing pipeline
//!
//! Filler strip -> vocabulary normalize -> synonym expansion -> quality
//! gate. Expansion is non-destructive: the matcher sees an additional
//! token bag while the normalized text stays authoritative for display
//! and slot capture.

mod fillers;
mod normalize;

pub use fillers::{strip_fillers, BUILT_IN_FILLERS};
pub use normalize::{apply_vocabulary, VocabularyOutcome};

use std::collections::HashMap;

use frontdesk_config::CompanyConfig;

/// Lowercased tokens: letters, digits, and internal apostrophes
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Quality verdict on the preprocessed utterance
#[derive(Debug, Clone)]
pub struct Quality {
    pub passed: bool,
    pub reason: Option<String>,
    pub confidence: f32,
}

/// Everything later stages need from preprocessing
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub raw_text: String,
    pub normalized_text: String,
    pub original_tokens: Vec<String>,
    /// Original tokens plus synonym-class members; matcher-only
    pub expanded_tokens: Vec<String>,
    /// Token -> members added for it
    pub expansion_map: HashMap<String, Vec<String>>,
    pub transformations: Vec<String>,
    /// Hint labels produced by soft-hint vocabulary this turn
    pub hints_added: Vec<String>,
    pub quality: Quality,
    pub should_reprompt: bool,
}

impl PipelineOutput {
    /// Expanded tokens joined for phrase matching
    pub fn expanded_text(&self) -> String {
        self.expanded_tokens.join(" ")
    }

    /// Whether a token was only introduced by expansion
    pub fn is_expansion_only(&self, token: &str) -> bool {
        !self.original_tokens.iter().any(|t| t == token)
            && self.expanded_tokens.iter().any(|t| t == token)
    }
}

/// The preprocessing pipeline
pub struct TextPipeline;

impl TextPipeline {
    /// Run all stages over one raw utterance
    pub fn run(raw_text: &str, config: &CompanyConfig) -> PipelineOutput {
        let (stripped, removed_fillers) = strip_fillers(raw_text, &config.text.ignore_phrases);

        let vocabulary = apply_vocabulary(&stripped, &config.vocabulary);
        let normalized_text = vocabulary.text;

        let original_tokens = tokenize(&normalized_text);
        let (expanded_tokens, expansion_map) =
            expand_synonyms(&original_tokens, config);

        let mut transformations: Vec<String> = removed_fillers
            .into_iter()
            .map(|f| format!("filler:{f}"))
            .collect();
        transformations.extend(vocabulary.transformations);

        let quality = assess_quality(raw_text, &normalized_text, config.text.min_chars);
        let should_reprompt = !quality.passed;

        PipelineOutput {
            raw_text: raw_text.to_string(),
            normalized_text,
            original_tokens,
            expanded_tokens,
            expansion_map,
            transformations,
            hints_added: vocabulary.hints,
            quality,
            should_reprompt,
        }
    }
}

/// Add synonym-class members alongside the original tokens
fn expand_synonyms(
    tokens: &[String],
    config: &CompanyConfig,
) -> (Vec<String>, HashMap<String, Vec<String>>) {
    let mut expanded: Vec<String> = tokens.to_vec();
    let mut map: HashMap<String, Vec<String>> = HashMap::new();

    for group in &config.text.synonyms {
        let members_lower: Vec<String> = group.members.iter().map(|m| m.to_lowercase()).collect();
        for token in tokens {
            if !members_lower.iter().any(|m| m == token) {
                continue;
            }
            for member in &members_lower {
                if member == token {
                    continue;
                }
                map.entry(token.clone()).or_default().push(member.clone());
                // Multi-word members contribute each of their words
                for word in tokenize(member) {
                    if !expanded.iter().any(|t| t == &word) {
                        expanded.push(word);
                    }
                }
            }
        }
    }

    (expanded, map)
}

fn assess_quality(raw_text: &str, normalized_text: &str, min_chars: usize) -> Quality {
    if normalized_text.chars().count() < min_chars {
        let reason = if raw_text.trim().is_empty() {
            "empty-input"
        } else {
            "too-short"
        };
        return Quality {
            passed: false,
            reason: Some(reason.to_string()),
            confidence: 0.2,
        };
    }
    // An utterance that normalization emptied of all words is noise
    if tokenize(normalized_text).is_empty() {
        return Quality {
            passed: false,
            reason: Some("no-words".to_string()),
            confidence: 0.3,
        };
    }
    Quality {
        passed: true,
        reason: None,
        confidence: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_config::{MatchMode, SynonymGroup, VocabularyEntry, VocabularyKind};

    fn config() -> CompanyConfig {
        let mut config = CompanyConfig::bare("acme");
        config.vocabulary.push(VocabularyEntry {
            enabled: true,
            priority: 0,
            kind: VocabularyKind::HardNormalize,
            match_mode: MatchMode::Exact,
            from: "acee".to_string(),
            to: "ac".to_string(),
        });
        config.vocabulary.push(VocabularyEntry {
            enabled: true,
            priority: 0,
            kind: VocabularyKind::SoftHint,
            match_mode: MatchMode::Contains,
            from: "thingy on the wall".to_string(),
            to: "maybe_thermostat".to_string(),
        });
        config.text.synonyms.push(SynonymGroup {
            members: vec!["broken".to_string(), "busted".to_string(), "dead".to_string()],
        });
        config
    }

    #[test]
    fn test_tokenize_keeps_apostrophes() {
        assert_eq!(
            tokenize("It isn't cooling, right?"),
            vec!["it", "isn't", "cooling", "right"]
        );
    }

    #[test]
    fn test_full_pipeline_normalizes_and_expands() {
        let output = TextPipeline::run("um my acee is busted", &config());
        assert_eq!(output.normalized_text, "my ac is busted");
        assert!(output.original_tokens.contains(&"ac".to_string()));
        // Synonym members arrive only in the expanded bag
        assert!(output.expanded_tokens.contains(&"broken".to_string()));
        assert!(!output.original_tokens.contains(&"broken".to_string()));
        assert!(output.is_expansion_only("broken"));
        assert!(output.quality.passed);
    }

    #[test]
    fn test_raw_text_unchanged() {
        let output = TextPipeline::run("um my acee is busted", &config());
        assert_eq!(output.raw_text, "um my acee is busted");
    }

    #[test]
    fn test_soft_hint_collected_without_rewrite() {
        let output = TextPipeline::run("the thingy on the wall is blank", &config());
        assert_eq!(output.hints_added, vec!["maybe_thermostat"]);
        assert!(output.normalized_text.contains("thingy on the wall"));
    }

    #[test]
    fn test_quality_gate_trips_on_noise() {
        let output = TextPipeline::run("um", &config());
        assert!(!output.quality.passed);
        assert!(output.should_reprompt);
    }
}
