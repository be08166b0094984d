//! Echo guard: blocks responses that parrot the caller
//!
//! Purely textual; compares token windows between the caller's
//! utterance and the proposed response.

use crate::text::tokenize;

/// The guard itself
pub struct EchoGuard;

impl EchoGuard {
    /// Find a verbatim overlap of at least `window_words` consecutive
    /// caller words inside the response. Returns the overlapping run.
    pub fn find_overlap(
        caller_text: &str,
        response: &str,
        window_words: usize,
    ) -> Option<String> {
        if window_words == 0 {
            return None;
        }
        let caller = tokenize(caller_text);
        let response_tokens = tokenize(response);
        if caller.len() < window_words || response_tokens.len() < window_words {
            return None;
        }

        for window in caller.windows(window_words) {
            if response_tokens
                .windows(window_words)
                .any(|candidate| candidate == window)
            {
                return Some(window.join(" "));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_detected() {
        let caller = "my heater makes a loud banging noise every time it starts up at night";
        let response =
            "I hear that your heater makes a loud banging noise every time it starts, let's fix it";
        let overlap = EchoGuard::find_overlap(caller, response, 8).unwrap();
        assert!(overlap.contains("banging noise"));
    }

    #[test]
    fn test_short_overlap_allowed() {
        let caller = "my AC is not cooling";
        let response = "Sounds like your AC is not cooling properly.";
        // Only a 4-word run is shared; the 8-word window never fires
        assert!(EchoGuard::find_overlap(caller, response, 8).is_none());
    }

    #[test]
    fn test_case_and_punctuation_ignored() {
        let caller = "The Thermostat On The Wall Is Completely Blank Today";
        let response = "the thermostat on the wall is completely blank, got it";
        assert!(EchoGuard::find_overlap(caller, response, 8).is_some());
    }

    #[test]
    fn test_short_inputs_never_block() {
        assert!(EchoGuard::find_overlap("yes", "Great.", 8).is_none());
    }
}
