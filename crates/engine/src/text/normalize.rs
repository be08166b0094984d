//! Vocabulary application: hard-normalize rewrites and soft hints

use frontdesk_config::{MatchMode, VocabularyEntry, VocabularyKind};
use regex::RegexBuilder;

/// Result of applying the vocabulary to one utterance
#[derive(Debug, Default)]
pub struct VocabularyOutcome {
    pub text: String,
    /// Applied transformations, e.g. `hard:acee->ac`
    pub transformations: Vec<String>,
    /// Hint labels added by soft-hint entries
    pub hints: Vec<String>,
}

/// Apply enabled vocabulary entries to `text`.
///
/// Hard-normalize entries run in ascending priority order with ties
/// broken by list position; replacements inside one entry run left to
/// right. Soft-hint entries never modify the text.
pub fn apply_vocabulary(text: &str, entries: &[VocabularyEntry]) -> VocabularyOutcome {
    let mut outcome = VocabularyOutcome {
        text: text.to_string(),
        ..Default::default()
    };

    let mut hard: Vec<(usize, &VocabularyEntry)> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.enabled && e.kind == VocabularyKind::HardNormalize)
        .collect();
    hard.sort_by_key(|(index, e)| (e.priority, *index));

    for (_, entry) in hard {
        if let Some(rewritten) = apply_hard(&outcome.text, entry) {
            outcome
                .transformations
                .push(format!("hard:{}->{}", entry.from, entry.to));
            outcome.text = rewritten;
        }
    }

    for entry in entries
        .iter()
        .filter(|e| e.enabled && e.kind == VocabularyKind::SoftHint)
    {
        if pattern_matches(&outcome.text, entry) {
            outcome.hints.push(entry.to.clone());
            outcome
                .transformations
                .push(format!("hint:{}->{}", entry.from, entry.to));
        }
    }

    outcome
}

fn apply_hard(text: &str, entry: &VocabularyEntry) -> Option<String> {
    let pattern = match entry.match_mode {
        MatchMode::Exact => format!(r"\b{}\b", regex::escape(&entry.from)),
        MatchMode::Contains => regex::escape(&entry.from),
    };
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()?;
    if !re.is_match(text) {
        return None;
    }
    let rewritten = re
        .replace_all(text, |caps: &regex::Captures<'_>| {
            match_case(&entry.to, &caps[0])
        })
        .to_string();
    Some(rewritten)
}

fn pattern_matches(text: &str, entry: &VocabularyEntry) -> bool {
    let pattern = match entry.match_mode {
        MatchMode::Exact => format!(r"\b{}\b", regex::escape(&entry.from)),
        MatchMode::Contains => regex::escape(&entry.from),
    };
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

/// Carry the matched text's initial capitalization onto the replacement
fn match_case(replacement: &str, matched: &str) -> String {
    let starts_upper = matched.chars().next().is_some_and(|c| c.is_uppercase());
    if !starts_upper {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: VocabularyKind, mode: MatchMode, priority: i32, from: &str, to: &str) -> VocabularyEntry {
        VocabularyEntry {
            enabled: true,
            priority,
            kind,
            match_mode: mode,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn test_exact_whole_word_replacement() {
        let entries = vec![entry(
            VocabularyKind::HardNormalize,
            MatchMode::Exact,
            0,
            "acee",
            "ac",
        )];
        let outcome = apply_vocabulary("my acee is not cooling", &entries);
        assert_eq!(outcome.text, "my ac is not cooling");
        assert_eq!(outcome.transformations, vec!["hard:acee->ac"]);
    }

    #[test]
    fn test_exact_does_not_hit_substrings() {
        let entries = vec![entry(
            VocabularyKind::HardNormalize,
            MatchMode::Exact,
            0,
            "ac",
            "air conditioner",
        )];
        let outcome = apply_vocabulary("the attic fan is fine", &entries);
        assert_eq!(outcome.text, "the attic fan is fine");
        assert!(outcome.transformations.is_empty());
    }

    #[test]
    fn test_contains_preserves_initial_capital() {
        let entries = vec![entry(
            VocabularyKind::HardNormalize,
            MatchMode::Contains,
            0,
            "furnance",
            "furnace",
        )];
        let outcome = apply_vocabulary("Furnance keeps clicking", &entries);
        assert_eq!(outcome.text, "Furnace keeps clicking");
    }

    #[test]
    fn test_priority_order_with_tie_break() {
        let entries = vec![
            entry(VocabularyKind::HardNormalize, MatchMode::Exact, 10, "unit", "system"),
            entry(VocabularyKind::HardNormalize, MatchMode::Exact, 5, "cooling unit", "ac"),
        ];
        // Lower priority applies first, so the phrase-level rule wins
        let outcome = apply_vocabulary("the cooling unit died", &entries);
        assert_eq!(outcome.text, "the ac died");
    }

    #[test]
    fn test_soft_hint_never_modifies_text() {
        let entries = vec![entry(
            VocabularyKind::SoftHint,
            MatchMode::Contains,
            0,
            "thingy on the wall",
            "maybe_thermostat",
        )];
        let outcome = apply_vocabulary("the thingy on the wall is blank", &entries);
        assert_eq!(outcome.text, "the thingy on the wall is blank");
        assert_eq!(outcome.hints, vec!["maybe_thermostat"]);
    }

    #[test]
    fn test_disabled_entries_skipped() {
        let mut disabled = entry(
            VocabularyKind::HardNormalize,
            MatchMode::Exact,
            0,
            "acee",
            "ac",
        );
        disabled.enabled = false;
        let outcome = apply_vocabulary("my acee is loud", &[disabled]);
        assert_eq!(outcome.text, "my acee is loud");
    }
}
