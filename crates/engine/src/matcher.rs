//! Single-winner trigger card matcher
//!
//! Cards are ranked by effective priority (base + hint/lock boosts +
//! intent-gate penalty), then evaluated in order until the first keyword
//! or phrase hit. At most one card ever wins a turn.

use std::collections::HashMap;

use frontdesk_config::TriggerCard;

use crate::intent_gate::{IntentFlags, IntentGate};
use crate::text::{tokenize, PipelineOutput};

/// Boost per matched hint category; doubled when a lock matches
const HINT_BOOST: i32 = -5;

/// Cap on per-card evaluation records kept for audit
const MAX_RECORDS: usize = 10;

/// Single-word greetings that need the short-input guard
const GREETING_WORDS: &[&str] = &["hi", "hello", "hey", "howdy", "yo", "greetings"];

/// Token count above which a single-word greeting no longer counts
const GREETING_MAX_TOKENS: usize = 4;

/// How the winning card was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Keyword,
    Phrase,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Keyword => "keyword",
            MatchType::Phrase => "phrase",
        }
    }
}

/// The single winning card
#[derive(Debug, Clone)]
pub struct WinningMatch {
    pub card_id: String,
    pub match_type: MatchType,
    /// The keyword or phrase that hit
    pub matched_on: String,
    /// Hit was only found through synonym expansion
    pub via_expansion: bool,
    pub effective_priority: i32,
}

/// Per-card evaluation record, for audit
#[derive(Debug, Clone)]
pub struct CardRecord {
    pub card_id: String,
    pub effective_priority: i32,
    pub matched: bool,
    pub skipped_reason: Option<&'static str>,
    pub greeting_blocked: bool,
}

/// Matcher output
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub winner: Option<WinningMatch>,
    pub records: Vec<CardRecord>,
    /// Cards evaluated before the winner (or all, when none won)
    pub evaluated: usize,
}

/// The matcher itself; stateless, driven entirely by inputs
pub struct TriggerMatcher;

impl TriggerMatcher {
    /// Evaluate all cards against the preprocessed utterance.
    pub fn run(
        pipeline: &PipelineOutput,
        cards: &[TriggerCard],
        global_negatives: &[String],
        gate: &IntentGate,
        intent: &IntentFlags,
        hints: &[String],
        locks: &HashMap<String, String>,
    ) -> MatchResult {
        let mut records = Vec::new();
        let mut evaluated = 0usize;

        // Global negatives veto the whole pool
        let global_veto = global_negatives
            .iter()
            .any(|negative| words_all_present(negative, &pipeline.original_tokens));
        if global_veto {
            return MatchResult {
                winner: None,
                records,
                evaluated,
            };
        }

        // Rank by effective priority; stable sort keeps config order on ties
        let mut pool: Vec<(i32, &TriggerCard)> = cards
            .iter()
            .map(|card| (effective_priority(card, gate, intent, hints, locks), card))
            .collect();
        pool.sort_by_key(|(priority, _)| *priority);

        for (priority, card) in pool {
            evaluated += 1;

            if !card.enabled {
                push_record(&mut records, card, priority, false, Some("disabled"), false);
                continue;
            }

            // Emergency removes pushed-down cards from the pool entirely
            if intent.emergency && gate.disqualifies(card) {
                push_record(
                    &mut records,
                    card,
                    priority,
                    false,
                    Some("intent-disqualified"),
                    false,
                );
                continue;
            }

            if card
                .match_spec
                .negatives
                .iter()
                .any(|negative| words_all_present(negative, &pipeline.original_tokens))
            {
                push_record(&mut records, card, priority, false, Some("negative"), false);
                continue;
            }

            let mut greeting_blocked = false;

            // Keyword pass: every word of the keyword must be present
            let keyword_hit = card.match_spec.keywords.iter().find_map(|keyword| {
                let words = tokenize(keyword);
                if words.is_empty() {
                    return None;
                }
                let in_original = words
                    .iter()
                    .all(|w| pipeline.original_tokens.iter().any(|t| t == w));
                let in_expanded = words
                    .iter()
                    .all(|w| pipeline.expanded_tokens.iter().any(|t| t == w));
                if !in_original && !in_expanded {
                    return None;
                }
                // A bare greeting only counts on short inputs
                if words.len() == 1
                    && GREETING_WORDS.contains(&words[0].as_str())
                    && pipeline.original_tokens.len() > GREETING_MAX_TOKENS
                {
                    greeting_blocked = true;
                    return None;
                }
                Some((keyword.clone(), !in_original))
            });

            if let Some((matched_on, via_expansion)) = keyword_hit {
                push_record(&mut records, card, priority, true, None, false);
                return MatchResult {
                    winner: Some(WinningMatch {
                        card_id: card.id.clone(),
                        match_type: MatchType::Keyword,
                        matched_on,
                        via_expansion,
                        effective_priority: priority,
                    }),
                    records,
                    evaluated,
                };
            }

            // Phrase pass: contiguous substring of the normalized text
            // or of the joined expanded bag
            let normalized_lower = pipeline.normalized_text.to_lowercase();
            let expanded_text = pipeline.expanded_text();
            let phrase_hit = card.match_spec.phrases.iter().find_map(|phrase| {
                let phrase_lower = phrase.to_lowercase();
                if phrase_lower.is_empty() {
                    return None;
                }
                if normalized_lower.contains(&phrase_lower) {
                    Some((phrase.clone(), false))
                } else if expanded_text.contains(&phrase_lower) {
                    Some((phrase.clone(), true))
                } else {
                    None
                }
            });

            if let Some((matched_on, via_expansion)) = phrase_hit {
                push_record(&mut records, card, priority, true, None, false);
                return MatchResult {
                    winner: Some(WinningMatch {
                        card_id: card.id.clone(),
                        match_type: MatchType::Phrase,
                        matched_on,
                        via_expansion,
                        effective_priority: priority,
                    }),
                    records,
                    evaluated,
                };
            }

            push_record(&mut records, card, priority, false, None, greeting_blocked);
        }

        MatchResult {
            winner: None,
            records,
            evaluated,
        }
    }
}

/// Base priority + hint/lock boost + intent penalty. Lower wins.
fn effective_priority(
    card: &TriggerCard,
    gate: &IntentGate,
    intent: &IntentFlags,
    hints: &[String],
    locks: &HashMap<String, String>,
) -> i32 {
    let mut priority = card.priority;

    if let Some(category) = card.category.as_deref() {
        let category_lower = category.to_lowercase();
        let hint_hits = hints
            .iter()
            .filter(|h| h.to_lowercase().contains(&category_lower))
            .count() as i32;
        let lock_hit = locks
            .values()
            .any(|v| v.eq_ignore_ascii_case(category));

        let mut boost = HINT_BOOST * (hint_hits + i32::from(lock_hit));
        if lock_hit {
            boost *= 2;
        }
        priority += boost;
    }

    if intent.any() && !intent.emergency && gate.disqualifies(card) {
        priority += gate.penalty();
    }

    priority
}

fn push_record(
    records: &mut Vec<CardRecord>,
    card: &TriggerCard,
    effective_priority: i32,
    matched: bool,
    skipped_reason: Option<&'static str>,
    greeting_blocked: bool,
) {
    if records.len() >= MAX_RECORDS {
        return;
    }
    records.push(CardRecord {
        card_id: card.id.clone(),
        effective_priority,
        matched,
        skipped_reason,
        greeting_blocked,
    });
}

/// Word-based check: all words of `needle` appear in the token set
fn words_all_present(needle: &str, tokens: &[String]) -> bool {
    let words = tokenize(needle);
    !words.is_empty() && words.iter().all(|w| tokens.iter().any(|t| t == w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_config::{
        AnswerPayload, CompanyConfig, IntentGateConfig, MatchSpec, TriggerCard,
    };

    use crate::text::TextPipeline;

    fn card(id: &str, priority: i32, keywords: &[&str], phrases: &[&str]) -> TriggerCard {
        TriggerCard {
            id: id.to_string(),
            label: id.to_string(),
            enabled: true,
            priority,
            category: None,
            match_spec: MatchSpec {
                keywords: keywords.iter().map(|s| s.to_string()).collect(),
                phrases: phrases.iter().map(|s| s.to_string()).collect(),
                negatives: vec![],
            },
            answer: AnswerPayload::Static {
                text: Some(format!("answer for {id}")),
                audio_url: None,
            },
            follow_up: None,
        }
    }

    fn run(
        input: &str,
        cards: &[TriggerCard],
        hints: &[String],
        locks: &HashMap<String, String>,
    ) -> MatchResult {
        let config = CompanyConfig::bare("acme");
        let pipeline = TextPipeline::run(input, &config);
        let gate = IntentGate::new(&IntentGateConfig::default());
        let intent = gate.evaluate(&pipeline.normalized_text);
        TriggerMatcher::run(&pipeline, cards, &[], &gate, &intent, hints, locks)
    }

    #[test]
    fn test_keyword_match_word_order_free() {
        let cards = vec![card("ac_down", 10, &["not cooling"], &[])];
        let result = run("it's really not been cooling today", &cards, &[], &HashMap::new());
        let winner = result.winner.unwrap();
        assert_eq!(winner.card_id, "ac_down");
        assert_eq!(winner.match_type, MatchType::Keyword);
        assert!(!winner.via_expansion);
    }

    #[test]
    fn test_priority_orders_single_winner() {
        let cards = vec![
            card("generic", 50, &["ac"], &[]),
            card("specific", 10, &["ac", "cooling"], &[]),
        ];
        let result = run("the ac is not cooling", &cards, &[], &HashMap::new());
        assert_eq!(result.winner.unwrap().card_id, "specific");
        // Exactly one record is a match
        assert_eq!(result.records.iter().filter(|r| r.matched).count(), 1);
    }

    #[test]
    fn test_greeting_word_blocked_on_long_input() {
        let cards = vec![
            card("greet", 1, &["hi"], &[]),
            card("ac_down", 10, &["cooling"], &[]),
        ];
        let result = run("hi there my AC isn't cooling at all", &cards, &[], &HashMap::new());
        assert_eq!(result.winner.unwrap().card_id, "ac_down");
        assert!(result.records.iter().any(|r| r.greeting_blocked));
    }

    #[test]
    fn test_greeting_word_wins_on_short_input() {
        let cards = vec![card("greet", 1, &["hi"], &[])];
        let result = run("hi there", &cards, &[], &HashMap::new());
        assert_eq!(result.winner.unwrap().card_id, "greet");
    }

    #[test]
    fn test_card_negative_vetoes() {
        let mut vetoed = card("cooling", 10, &["cooling"], &[]);
        vetoed.match_spec.negatives = vec!["heater".to_string()];
        let result = run("the heater not the cooling one", &[vetoed], &[], &HashMap::new());
        assert!(result.winner.is_none());
        assert_eq!(result.records[0].skipped_reason, Some("negative"));
    }

    #[test]
    fn test_global_negative_vetoes_all() {
        let config = CompanyConfig::bare("acme");
        let pipeline = TextPipeline::run("cancel my appointment", &config);
        let gate = IntentGate::new(&IntentGateConfig::default());
        let intent = IntentFlags::default();
        let cards = vec![card("appt", 10, &["appointment"], &[])];
        let result = TriggerMatcher::run(
            &pipeline,
            &cards,
            &["cancel".to_string()],
            &gate,
            &intent,
            &[],
            &HashMap::new(),
        );
        assert!(result.winner.is_none());
    }

    #[test]
    fn test_phrase_requires_contiguity() {
        let cards = vec![card("warm_air", 10, &[], &["blowing warm air"])];
        let hit = run("it keeps blowing warm air", &cards, &[], &HashMap::new());
        assert_eq!(hit.winner.unwrap().match_type, MatchType::Phrase);

        let miss = run("warm day, air is fine, nothing blowing", &cards, &[], &HashMap::new());
        assert!(miss.winner.is_none());
    }

    #[test]
    fn test_hint_boost_changes_ranking() {
        let mut thermostat = card("thermostat_blank", 20, &["blank"], &[]);
        thermostat.category = Some("thermostat".to_string());
        let generic = card("display_issue", 15, &["blank"], &[]);

        // Without the hint, the generic card's base priority wins
        let result = run("the screen is blank", &[thermostat.clone(), generic.clone()], &[], &HashMap::new());
        assert_eq!(result.winner.unwrap().card_id, "display_issue");

        // A thermostat hint boosts the category card past it
        let hints = vec!["maybe_thermostat".to_string()];
        let result = run("the screen is blank", &[thermostat, generic], &hints, &HashMap::new());
        assert_eq!(result.winner.unwrap().card_id, "thermostat_blank");
    }

    #[test]
    fn test_lock_boost_doubles() {
        let mut thermostat = card("thermostat_blank", 30, &["blank"], &[]);
        thermostat.category = Some("thermostat".to_string());
        let generic = card("display_issue", 15, &["blank"], &[]);

        let mut locks = HashMap::new();
        locks.insert("component".to_string(), "thermostat".to_string());
        // Lock alone: -5 doubled = -10, takes 30 to 20 — still behind 15
        // with no hints, so add the hint as the clarifier flow would
        let hints = vec!["maybe_thermostat".to_string()];
        let result = run("the screen is blank", &[thermostat, generic], &hints, &locks);
        assert_eq!(result.winner.unwrap().card_id, "thermostat_blank");
    }

    #[test]
    fn test_expansion_marked_non_authoritative() {
        let mut config = CompanyConfig::bare("acme");
        config.text.synonyms.push(frontdesk_config::SynonymGroup {
            members: vec!["busted".to_string(), "broken".to_string()],
        });
        let pipeline = TextPipeline::run("the furnace is busted", &config);
        let gate = IntentGate::new(&IntentGateConfig::default());
        let intent = IntentFlags::default();
        let cards = vec![card("broken_equip", 10, &["broken"], &[])];
        let result = TriggerMatcher::run(
            &pipeline,
            &cards,
            &[],
            &gate,
            &intent,
            &[],
            &HashMap::new(),
        );
        let winner = result.winner.unwrap();
        assert!(winner.via_expansion);
    }

    #[test]
    fn test_records_capped() {
        let cards: Vec<TriggerCard> = (0..15)
            .map(|i| card(&format!("card_{i}"), 10 + i, &["zzz"], &[]))
            .collect();
        let result = run("nothing relevant here", &cards, &[], &HashMap::new());
        assert!(result.winner.is_none());
        assert_eq!(result.records.len(), 10);
        assert_eq!(result.evaluated, 15);
    }
}
