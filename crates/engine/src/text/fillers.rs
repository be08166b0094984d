//! Filler stripping, the first preprocessing stage

use regex::RegexBuilder;

/// Hesitation noise removed from every utterance before matching
pub const BUILT_IN_FILLERS: &[&str] = &[
    "uh",
    "um",
    "er",
    "ah",
    "hmm",
    "like",
    "you know",
    "i mean",
    "kind of",
    "sort of",
    "basically",
    "actually",
];

/// Remove built-in fillers and configured ignore phrases.
///
/// Returns the cleaned text and the list of phrases that were removed.
/// The original text is left to the caller; whitespace is collapsed.
pub fn strip_fillers(text: &str, ignore_phrases: &[String]) -> (String, Vec<String>) {
    let mut result = text.to_string();
    let mut removed = Vec::new();

    let configured: Vec<&str> = ignore_phrases.iter().map(|s| s.as_str()).collect();
    for phrase in BUILT_IN_FILLERS.iter().copied().chain(configured) {
        if phrase.is_empty() {
            continue;
        }
        let pattern = format!(r"\b{}\b", regex::escape(phrase));
        let Ok(re) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
            continue;
        };
        if re.is_match(&result) {
            result = re.replace_all(&result, " ").to_string();
            removed.push(phrase.to_string());
        }
    }

    let collapsed = result.split_whitespace().collect::<Vec<_>>().join(" ");
    (collapsed, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_builtin_fillers() {
        let (cleaned, removed) = strip_fillers("um so like my AC is uh broken", &[]);
        assert_eq!(cleaned, "so my AC is broken");
        assert!(removed.contains(&"um".to_string()));
        assert!(removed.contains(&"like".to_string()));
    }

    #[test]
    fn test_strips_configured_phrases() {
        let phrases = vec!["as i said".to_string()];
        let (cleaned, removed) = strip_fillers("as I said the heater quit", &phrases);
        assert_eq!(cleaned, "the heater quit");
        assert_eq!(removed, vec!["as i said".to_string()]);
    }

    #[test]
    fn test_no_partial_word_removal() {
        // "ah" must not eat the inside of "behalf"
        let (cleaned, _) = strip_fillers("calling on behalf of my mother", &[]);
        assert_eq!(cleaned, "calling on behalf of my mother");
    }
}
