//! LLM assist subsystem
//!
//! A bounded, governed escape hatch for utterances the deterministic
//! path could not answer. The decision gate keeps it rare; validation
//! keeps it on-script; the handoff override keeps the conversation
//! UI-owned; per-call budgets keep it cheap.

pub mod complexity;
pub mod validate;

pub use complexity::ComplexityScore;
pub use validate::{first_sentence, split_sentences, validate, Validation};

use std::time::Duration;

use chrono::Utc;
use frontdesk_config::CompanyConfig;
use frontdesk_core::{
    AssistMode, CallState, CompletionRequest, Event, EventType, Lane, LlmClient,
    LlmHandoffPending, LlmUsageRecord, TurnInput,
};

use crate::bus::EventBus;
use crate::text::PipelineOutput;

/// Outcome of the decision gate
#[derive(Debug, Clone)]
pub struct AssistDecision {
    pub call: bool,
    pub mode: AssistMode,
    pub blocked_by: Option<&'static str>,
    pub reason: String,
    pub complexity: ComplexityScore,
}

/// Outcome of the assist path
#[derive(Debug)]
pub enum AssistResult {
    /// Validated text ready for the speak gate
    Spoken {
        text: String,
        source_path: String,
        handoff: Option<LlmHandoffPending>,
        usage: LlmUsageRecord,
    },
    /// Completion failed or was rejected; speak the emergency fallback
    Emergency {
        reason: String,
        usage: Option<LlmUsageRecord>,
    },
    /// Assist did not run at all
    Skipped { reason: String },
}

/// Completion result for an LLM-mode trigger card
#[derive(Debug)]
pub struct CardCompletion {
    pub text: Option<String>,
    pub usage: Option<LlmUsageRecord>,
}

/// The assist subsystem
pub struct LlmAssist;

impl LlmAssist {
    /// The multi-condition decision gate. The runner consults this only
    /// after every deterministic branch has declined the turn.
    pub fn decide(
        config: &CompanyConfig,
        state: &CallState,
        pipeline: &PipelineOutput,
    ) -> AssistDecision {
        let assist = &config.assist;
        let mode = assist.mode;
        let complexity =
            complexity::score(&pipeline.normalized_text, &assist.complex_keywords);

        let blocked = |blocked_by: &'static str, reason: String| AssistDecision {
            call: false,
            mode,
            blocked_by: Some(blocked_by),
            reason,
            complexity: complexity.clone(),
        };

        if !assist.enabled {
            return blocked("disabled", "assist disabled for company".to_string());
        }
        if state.lane != Lane::Discovery || state.booking_mode_locked {
            return blocked("lane", format!("lane {} is not eligible", state.lane.as_str()));
        }
        if state.pending_question.is_some()
            || state.pending_follow_up.is_some()
            || state.pending_clarifier.is_some()
            || state.llm_handoff_pending.is_some()
        {
            return blocked("pending-flow", "a pending flow owns the next turn".to_string());
        }

        match mode {
            AssistMode::Guided => {
                if state.llm_turns_this_call >= assist.guided.max_llm_fallback_turns_per_call {
                    return blocked(
                        "turn-cap",
                        format!(
                            "guided turns {} reached cap {}",
                            state.llm_turns_this_call,
                            assist.guided.max_llm_fallback_turns_per_call
                        ),
                    );
                }
            }
            AssistMode::AnswerReturn => {
                if state.llm_assist.cooldown_remaining > 0 {
                    return blocked(
                        "cooldown",
                        format!("{} turns of cooldown remain", state.llm_assist.cooldown_remaining),
                    );
                }
                if state.llm_assist.uses_this_call >= assist.answer_return.max_uses_per_call {
                    return blocked(
                        "use-cap",
                        format!(
                            "uses {} reached cap {}",
                            state.llm_assist.uses_this_call,
                            assist.answer_return.max_uses_per_call
                        ),
                    );
                }
            }
        }

        let keyword_hit = complexity.keyword_hit.clone();
        let triggered = complexity.score >= assist.complexity_threshold
            || state.no_match_count >= 2
            || keyword_hit.is_some();
        if !triggered {
            return blocked(
                "complexity",
                format!(
                    "score {:.2} below {:.2}, no-match count {}",
                    complexity.score, assist.complexity_threshold, state.no_match_count
                ),
            );
        }

        let reason = if let Some(keyword) = keyword_hit {
            format!("complex keyword '{keyword}'")
        } else if complexity.score >= assist.complexity_threshold {
            format!("complexity {:.2}", complexity.score)
        } else {
            format!("no-match count {}", state.no_match_count)
        };

        AssistDecision {
            call: true,
            mode,
            blocked_by: None,
            reason,
            complexity,
        }
    }

    /// Run the assist path: prompt, complete, validate, override.
    pub async fn run(
        llm: &dyn LlmClient,
        config: &CompanyConfig,
        input: &TurnInput,
        state: &CallState,
        pipeline: &PipelineOutput,
        bus: &mut EventBus,
    ) -> AssistResult {
        let assist = &config.assist;
        let mode = assist.mode;

        let (system_prompt, user_prompt) = build_prompts(config, state, pipeline);
        let request = CompletionRequest {
            model: assist.model.clone(),
            system_prompt,
            user_prompt,
            temperature: assist.temperature,
            max_tokens: assist.max_tokens,
            deadline: Duration::from_millis(assist.deadline_ms),
        };

        let started = std::time::Instant::now();
        let completion = tokio::time::timeout(
            Duration::from_millis(assist.deadline_ms),
            llm.complete(request),
        )
        .await;

        let response = match completion {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(call_id = %input.call_id, error = %e, "LLM completion failed");
                return Self::degrade(assist.use_emergency_fallback_on_error, format!("llm-error: {e}"));
            }
            Err(_) => {
                tracing::warn!(
                    call_id = %input.call_id,
                    deadline_ms = assist.deadline_ms,
                    "LLM completion timed out"
                );
                return Self::degrade(
                    assist.use_emergency_fallback_on_error,
                    "llm-timeout".to_string(),
                );
            }
        };

        let usage = LlmUsageRecord {
            call_id: input.call_id.clone(),
            company_id: input.company_id.clone(),
            turn_index: input.turn_index,
            mode: mode.as_str().to_string(),
            model: assist.model.clone(),
            tokens_in: response.tokens_in,
            tokens_out: response.tokens_out,
            latency_ms: started.elapsed().as_millis() as u64,
            accepted: false,
            timestamp: Utc::now(),
        };

        let validation = validate(
            mode,
            &response.text,
            &pipeline.raw_text,
            assist,
            assist.handoff.question(),
        );
        bus.emit(
            Event::new(EventType::LlmOutputValidation)
                .field("mode", mode.as_str())
                .field("accepted", validation.text.is_some())
                .field(
                    "adjustments",
                    serde_json::json!(validation.adjustments),
                ),
        );

        let Some(validated) = validation.text else {
            bus.emit(
                Event::new(EventType::LlmConstraintViolation)
                    .field("mode", mode.as_str())
                    .field("violations", serde_json::json!(validation.violations)),
            );
            return AssistResult::Emergency {
                reason: format!("validation: {}", validation.violations.join(",")),
                usage: Some(usage),
            };
        };

        match mode {
            AssistMode::Guided => {
                // Keep the model's empathy, never its question: the
                // second sentence is replaced by the UI-owned handoff.
                let empathy = first_sentence(&validated);
                let composite = format!("{} {}", empathy, assist.handoff.question());

                let recheck = validate(mode, &composite, &pipeline.raw_text, assist, assist.handoff.question());
                let Some(final_text) = recheck.text else {
                    bus.emit(
                        Event::new(EventType::LlmConstraintViolation)
                            .field("mode", mode.as_str())
                            .field("stage", "handoff-composite")
                            .field("violations", serde_json::json!(recheck.violations)),
                    );
                    return AssistResult::Emergency {
                        reason: "handoff composite failed validation".to_string(),
                        usage: Some(usage),
                    };
                };

                bus.emit(
                    Event::new(EventType::LlmHandoffOverride)
                        .field("variant", assist.handoff.question_path())
                        .field("empathy", empathy),
                );

                AssistResult::Spoken {
                    text: final_text,
                    source_path: assist.handoff.question_path().to_string(),
                    handoff: Some(LlmHandoffPending {
                        yes_response: assist.handoff.yes_response.clone(),
                        no_response: assist.handoff.no_response.clone(),
                        turn: input.turn_index,
                    }),
                    usage: LlmUsageRecord {
                        accepted: true,
                        ..usage
                    },
                }
            }
            AssistMode::AnswerReturn => AssistResult::Spoken {
                text: validated,
                source_path: "assist.answerReturn.systemPrompt".to_string(),
                handoff: None,
                usage: LlmUsageRecord {
                    accepted: true,
                    ..usage
                },
            },
        }
    }

    /// Complete an LLM-mode trigger card against its fact pack.
    /// Returns no text when the completion fails or is rejected; the
    /// caller falls back to the card's configured fallback.
    pub async fn complete_card(
        llm: &dyn LlmClient,
        config: &CompanyConfig,
        card_id: &str,
        fact_pack: &str,
        input: &TurnInput,
        pipeline: &PipelineOutput,
        bus: &mut EventBus,
    ) -> CardCompletion {
        let assist = &config.assist;
        let system_prompt = format!(
            "{}\n\nAnswer strictly from these facts:\n{}",
            assist.answer_return.system_prompt, fact_pack
        );
        let request = CompletionRequest {
            model: assist.model.clone(),
            system_prompt,
            user_prompt: pipeline.normalized_text.clone(),
            temperature: assist.temperature,
            max_tokens: assist.max_tokens,
            deadline: Duration::from_millis(assist.deadline_ms),
        };

        let started = std::time::Instant::now();
        let completion = tokio::time::timeout(
            Duration::from_millis(assist.deadline_ms),
            llm.complete(request),
        )
        .await;

        let response = match completion {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(card_id = %card_id, error = %e, "Card completion failed");
                return CardCompletion {
                    text: None,
                    usage: None,
                };
            }
            Err(_) => {
                tracing::warn!(card_id = %card_id, "Card completion timed out");
                return CardCompletion {
                    text: None,
                    usage: None,
                };
            }
        };

        let usage = LlmUsageRecord {
            call_id: input.call_id.clone(),
            company_id: input.company_id.clone(),
            turn_index: input.turn_index,
            mode: "trigger-card".to_string(),
            model: assist.model.clone(),
            tokens_in: response.tokens_in,
            tokens_out: response.tokens_out,
            latency_ms: started.elapsed().as_millis() as u64,
            accepted: false,
            timestamp: Utc::now(),
        };

        let validation = validate(
            AssistMode::AnswerReturn,
            &response.text,
            &pipeline.raw_text,
            assist,
            assist.handoff.question(),
        );
        bus.emit(
            Event::new(EventType::LlmOutputValidation)
                .field("mode", "trigger-card")
                .field("cardId", card_id)
                .field("accepted", validation.text.is_some()),
        );

        match validation.text {
            Some(text) => CardCompletion {
                text: Some(text),
                usage: Some(LlmUsageRecord {
                    accepted: true,
                    ..usage
                }),
            },
            None => {
                bus.emit(
                    Event::new(EventType::LlmConstraintViolation)
                        .field("mode", "trigger-card")
                        .field("cardId", card_id)
                        .field("violations", serde_json::json!(validation.violations)),
                );
                CardCompletion {
                    text: None,
                    usage: Some(usage),
                }
            }
        }
    }

    fn degrade(use_emergency: bool, reason: String) -> AssistResult {
        if use_emergency {
            AssistResult::Emergency {
                reason,
                usage: None,
            }
        } else {
            AssistResult::Skipped { reason }
        }
    }
}

/// Mode-aware prompt assembly
fn build_prompts(
    config: &CompanyConfig,
    state: &CallState,
    pipeline: &PipelineOutput,
) -> (String, String) {
    let assist = &config.assist;
    let system = match assist.mode {
        AssistMode::Guided => format!(
            "{}\n\n{}\n\n{}",
            assist.guided.system_prompt, assist.guided.format_prompt, assist.guided.safety_prompt
        ),
        AssistMode::AnswerReturn => assist.answer_return.system_prompt.clone(),
    };

    let user = match state.captured_reason() {
        Some(reason) => format!(
            "Caller said: {}\nKnown reason for the call: {}",
            pipeline.normalized_text, reason
        ),
        None => format!("Caller said: {}", pipeline.normalized_text),
    };

    (system, user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_core::SlotValue;

    fn config(enabled: bool, mode: AssistMode) -> CompanyConfig {
        let mut config = CompanyConfig::bare("acme");
        config.assist.enabled = enabled;
        config.assist.mode = mode;
        config
    }

    fn pipeline(text: &str) -> PipelineOutput {
        crate::text::TextPipeline::run(text, &CompanyConfig::bare("acme"))
    }

    #[test]
    fn test_gate_blocked_when_disabled() {
        let state = CallState::new("c1", "acme");
        let decision = LlmAssist::decide(
            &config(false, AssistMode::Guided),
            &state,
            &pipeline("why does my heater short cycle, and should I replace it?"),
        );
        assert!(!decision.call);
        assert_eq!(decision.blocked_by, Some("disabled"));
    }

    #[test]
    fn test_gate_opens_on_complex_keyword() {
        let state = CallState::new("c1", "acme");
        let decision = LlmAssist::decide(
            &config(true, AssistMode::Guided),
            &state,
            &pipeline("should I replace the whole unit or repair it"),
        );
        assert!(decision.call, "blocked by {:?}", decision.blocked_by);
    }

    #[test]
    fn test_gate_respects_guided_turn_cap() {
        let mut state = CallState::new("c1", "acme");
        state.llm_turns_this_call = 1;
        let decision = LlmAssist::decide(
            &config(true, AssistMode::Guided),
            &state,
            &pipeline("should I replace the whole unit or repair it"),
        );
        assert_eq!(decision.blocked_by, Some("turn-cap"));
    }

    #[test]
    fn test_gate_respects_cooldown_and_use_cap() {
        let mut state = CallState::new("c1", "acme");
        state.llm_assist.cooldown_remaining = 1;
        let config = config(true, AssistMode::AnswerReturn);
        let decision = LlmAssist::decide(
            &config,
            &state,
            &pipeline("should I replace the whole unit or repair it"),
        );
        assert_eq!(decision.blocked_by, Some("cooldown"));

        state.llm_assist.cooldown_remaining = 0;
        state.llm_assist.uses_this_call = 2;
        let decision = LlmAssist::decide(
            &config,
            &state,
            &pipeline("should I replace the whole unit or repair it"),
        );
        assert_eq!(decision.blocked_by, Some("use-cap"));
    }

    #[test]
    fn test_gate_opens_on_no_match_count() {
        let mut state = CallState::new("c1", "acme");
        state.no_match_count = 2;
        let decision = LlmAssist::decide(
            &config(true, AssistMode::Guided),
            &state,
            &pipeline("it keeps doing the thing"),
        );
        assert!(decision.call);
        assert!(decision.reason.contains("no-match"));
    }

    #[test]
    fn test_gate_blocked_during_pending_flow() {
        let mut state = CallState::new("c1", "acme");
        state.pending_question = Some(frontdesk_core::PendingQuestion {
            question: "Anything else?".to_string(),
            source: "fallback".to_string(),
            turn: 1,
        });
        let decision = LlmAssist::decide(
            &config(true, AssistMode::Guided),
            &state,
            &pipeline("should I replace the whole unit or repair it"),
        );
        assert_eq!(decision.blocked_by, Some("pending-flow"));
    }

    #[test]
    fn test_prompt_includes_captured_reason() {
        let mut state = CallState::new("c1", "acme");
        state.plain_slots.insert(
            "call_reason_detail".to_string(),
            SlotValue {
                value: "ac not cooling".to_string(),
                confidence: 0.9,
            },
        );
        let config = config(true, AssistMode::Guided);
        let (_, user) = build_prompts(&config, &state, &pipeline("it is still warm"));
        assert!(user.contains("ac not cooling"));
    }
}
