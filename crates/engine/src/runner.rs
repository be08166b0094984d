//! Per-turn orchestrator
//!
//! Executes the gates in fixed order and owns every state transition.
//! A turn never raises: any failure degrades to the emergency fallback
//! and the caller always hears something. Turns are serialized per call
//! and parallel across calls.

use std::sync::Arc;
use std::time::Duration;

use frontdesk_config::{AnswerPayload, CompanyConfig, ConfigStore};
use frontdesk_core::{
    AssistMode, CallState, Consent, Event, EventSink, EventType, FollowUpDirection, Lane,
    LlmClient, MatchSource, PendingClarifier, PendingFollowUp, PendingQuestion, ScenarioSelector,
    SessionMode, TurnInput, TurnOutcome, UsageLogger, VariableStore,
};

use crate::assist::{AssistResult, LlmAssist};
use crate::bus::EventBus;
use crate::clarifier::{ClarifierEngine, ClarifierResolution};
use crate::echo::EchoGuard;
use crate::greeting::GreetingInterceptor;
use crate::intent_gate::IntentGate;
use crate::matcher::TriggerMatcher;
use crate::pending::{FollowUpBucket, PendingBucket, PendingClassifier};
use crate::speak::{Candidate, SpeakGate};
use crate::store::CallRegistry;
use crate::text::TextPipeline;
use crate::variables::{substitute, TriggerVariableCache};

/// Default whole-turn deadline
const DEFAULT_TURN_DEADLINE: Duration = Duration::from_secs(8);

/// The orchestrator. One instance serves all companies and calls.
pub struct TurnRunner {
    config_store: Arc<dyn ConfigStore>,
    llm: Arc<dyn LlmClient>,
    event_sink: Arc<dyn EventSink>,
    usage_logger: Arc<dyn UsageLogger>,
    variable_store: Arc<dyn VariableStore>,
    scenario: Option<Arc<dyn ScenarioSelector>>,
    registry: CallRegistry,
    variables: TriggerVariableCache,
    turn_deadline: Duration,
}

/// Builder for [`TurnRunner`]
pub struct TurnRunnerBuilder {
    config_store: Arc<dyn ConfigStore>,
    llm: Arc<dyn LlmClient>,
    event_sink: Arc<dyn EventSink>,
    usage_logger: Arc<dyn UsageLogger>,
    variable_store: Arc<dyn VariableStore>,
    scenario: Option<Arc<dyn ScenarioSelector>>,
    turn_deadline: Duration,
}

impl TurnRunnerBuilder {
    pub fn new(
        config_store: Arc<dyn ConfigStore>,
        llm: Arc<dyn LlmClient>,
        event_sink: Arc<dyn EventSink>,
        usage_logger: Arc<dyn UsageLogger>,
        variable_store: Arc<dyn VariableStore>,
    ) -> Self {
        Self {
            config_store,
            llm,
            event_sink,
            usage_logger,
            variable_store,
            scenario: None,
            turn_deadline: DEFAULT_TURN_DEADLINE,
        }
    }

    pub fn with_scenario_selector(mut self, scenario: Arc<dyn ScenarioSelector>) -> Self {
        self.scenario = Some(scenario);
        self
    }

    pub fn with_turn_deadline(mut self, deadline: Duration) -> Self {
        self.turn_deadline = deadline;
        self
    }

    pub fn build(self) -> TurnRunner {
        TurnRunner {
            config_store: self.config_store,
            llm: self.llm,
            event_sink: self.event_sink,
            usage_logger: self.usage_logger,
            variable_store: self.variable_store,
            scenario: self.scenario,
            registry: CallRegistry::new(),
            variables: TriggerVariableCache::new(),
            turn_deadline: self.turn_deadline,
        }
    }
}

impl TurnRunner {
    /// Process one turn. Never fails: every error path produces a
    /// spoken outcome and an audit trail.
    pub async fn process_turn(&self, input: TurnInput) -> TurnOutcome {
        let slot = self.registry.checkout(&input.call_id, &input.company_id);
        // Held for the whole turn: turns for one call never interleave
        let mut guard = slot.lock().await;

        let config = match self.config_store.load(&input.company_id).await {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(
                    company_id = %input.company_id,
                    error = %e,
                    "Config load failed; speaking minimal acknowledgment"
                );
                let mut bus = EventBus::new("unavailable", input.turn_index);
                bus.emit(
                    Event::new(EventType::TurnGate)
                        .field("inputChars", input.raw_text.chars().count() as u64),
                );
                bus.emit(
                    Event::new(EventType::EngineError)
                        .field("stage", "config-load")
                        .field("error", e.to_string()),
                );

                // Even this degraded turn speaks with provenance
                let mut admitted =
                    SpeakGate::admit_without_config("config-load", "config-unavailable");
                for event in std::mem::take(&mut admitted.blocked) {
                    bus.emit(event);
                }
                bus.emit(admitted.provenance);
                bus.emit(
                    Event::new(EventType::ResponseReady)
                        .field("matchSource", admitted.match_source.as_str())
                        .field(
                            "responseChars",
                            admitted.text.as_deref().map_or(0, |t| t.chars().count()) as u64,
                        )
                        .field("hasAudio", false),
                );
                let events = bus.drain_to(self.event_sink.as_ref()).await;
                return TurnOutcome {
                    response_text: admitted.text,
                    audio_url: None,
                    match_source: admitted.match_source,
                    events,
                };
            }
        };

        let mut state = guard.clone();
        state.begin_turn(input.turn_index);

        let mut bus = EventBus::new(config.config_hash(), input.turn_index);
        bus.emit(
            Event::new(EventType::TurnGate)
                .field("lane", state.lane.as_str())
                .field("inputChars", input.raw_text.chars().count() as u64)
                .field("hasCallerName", state.caller_name().is_some())
                .field("hasCapturedReason", state.captured_reason().is_some()),
        );

        // Master gate
        if !config.features.discovery_enabled {
            bus.emit(Event::new(EventType::Disabled).field("reason", "discovery-disabled"));
            *guard = state;
            let events = bus.drain_to(self.event_sink.as_ref()).await;
            let mut outcome = TurnOutcome::silent();
            outcome.events = events;
            return outcome;
        }

        let candidate = match tokio::time::timeout(
            self.turn_deadline,
            self.run_pipeline(&config, &mut state, &mut bus, &input),
        )
        .await
        {
            Ok(candidate) => candidate,
            Err(_) => {
                tracing::warn!(
                    call_id = %input.call_id,
                    deadline_ms = self.turn_deadline.as_millis() as u64,
                    "Turn deadline exceeded"
                );
                bus.emit(Event::new(EventType::TurnTimeout));
                emergency_candidate(&config, "turn-timeout")
            }
        };

        // Speak gate, then echo guard, then exactly one provenance event
        let mut admitted = SpeakGate::admit(&config, candidate);
        for event in std::mem::take(&mut admitted.blocked) {
            bus.emit(event);
        }

        if let Some(text) = admitted.text.clone() {
            let window = config.guards.echo_window_words;
            if text != config.playbook.emergency_fallback {
                if let Some(overlap) = EchoGuard::find_overlap(&input.raw_text, &text, window) {
                    bus.emit(
                        Event::new(EventType::EchoBlocked)
                            .field("overlap", overlap)
                            .field("windowWords", window as u64),
                    );
                    admitted =
                        SpeakGate::admit(&config, emergency_candidate(&config, "echo-guard"));
                    for event in std::mem::take(&mut admitted.blocked) {
                        bus.emit(event);
                    }
                }
            }
        }

        let provenance = admitted.provenance;
        bus.emit(provenance);
        bus.emit(
            Event::new(EventType::ResponseReady)
                .field("matchSource", admitted.match_source.as_str())
                .field(
                    "responseChars",
                    admitted.text.as_deref().map_or(0, |t| t.chars().count()) as u64,
                )
                .field("hasAudio", admitted.audio_url.is_some()),
        );

        // Only the final copy is written back
        *guard = state;

        let events = bus.drain_to(self.event_sink.as_ref()).await;
        TurnOutcome {
            response_text: admitted.text,
            audio_url: admitted.audio_url,
            match_source: admitted.match_source,
            events,
        }
    }

    /// End a call and discard its state
    pub fn end_call(&self, call_id: &str) -> bool {
        self.registry.end_call(call_id)
    }

    pub fn active_calls(&self) -> usize {
        self.registry.active_calls()
    }

    /// Read-only snapshot of a call's state, for status surfaces
    pub async fn call_state(&self, call_id: &str) -> Option<CallState> {
        self.registry.snapshot(call_id).await
    }

    /// The fixed gate order. Always returns a candidate response.
    async fn run_pipeline(
        &self,
        config: &CompanyConfig,
        state: &mut CallState,
        bus: &mut EventBus,
        input: &TurnInput,
    ) -> Candidate {
        // Greeting interceptor, on the raw utterance
        let greeting =
            GreetingInterceptor::evaluate(&config.greetings, state.greeted, &input.raw_text);
        match &greeting.intercepted {
            Some(hit) => {
                bus.emit(
                    Event::new(EventType::GreetingEvaluated)
                        .field("matchedRule", hit.rule_id.clone()),
                );
                state.greeted = true;
                bus.emit(Event::new(EventType::PathSelected).field("path", "GREETING"));
                return Candidate {
                    text: hit.response_text.clone(),
                    audio_url: hit.audio_url.clone(),
                    source_id: format!("greeting:{}", hit.rule_id),
                    primary_path: format!("greetings.rules.{}", hit.rule_id),
                    fallback_path: None,
                    is_from_ui_config: true,
                    match_source: MatchSource::Greeting,
                };
            }
            None => {
                bus.emit(
                    Event::new(EventType::GreetingEvaluated)
                        .field("blockReason", greeting.block_reason.unwrap_or("unknown")),
                );
            }
        }

        // Text preprocessing
        let pipeline = TextPipeline::run(&input.raw_text, config);
        for hint in &pipeline.hints_added {
            state.add_hint(hint.clone());
        }
        bus.emit(
            Event::new(EventType::ScrabProcessed)
                .field("normalized", pipeline.normalized_text.clone())
                .field("transformations", serde_json::json!(pipeline.transformations))
                .field("hintsAdded", serde_json::json!(pipeline.hints_added))
                .field("qualityPassed", pipeline.quality.passed)
                .field("shouldReprompt", pipeline.should_reprompt),
        );

        let classifier = PendingClassifier::new(&config.playbook.pending);

        // Clarifier resolution from last turn; matching continues after
        if let Some(pending) = state.pending_clarifier.take() {
            let resolution =
                ClarifierEngine::resolve(&classifier, &pending, &pipeline.normalized_text);
            bus.emit(
                Event::new(EventType::ClarifierResolved)
                    .field("id", pending.id.clone())
                    .field("resolution", resolution.as_str()),
            );
            match resolution {
                ClarifierResolution::Confirmed => {
                    if let Some(lock) = &pending.locks_to {
                        state.set_lock(lock.key.clone(), lock.value.clone());
                    }
                    // The lock supersedes the hint that raised the question
                    state.remove_hint(&pending.hint_trigger);
                }
                ClarifierResolution::Denied => {
                    state.remove_hint(&pending.hint_trigger);
                }
                ClarifierResolution::Unclear => {}
            }
        }

        // Trigger-card follow-up pending (5 buckets)
        if let Some(pending) = state.pending_follow_up.take() {
            let bucket = classifier.classify_follow_up(&pipeline.normalized_text);
            bus.emit(
                Event::new(EventType::PendingQuestionResolved)
                    .field("namespace", "follow-up")
                    .field("bucket", bucket.as_str())
                    .field("cardId", pending.card_id.clone()),
            );
            match bucket {
                FollowUpBucket::Yes => {
                    return self.execute_follow_up_yes(config, state, bus, input, &pending);
                }
                FollowUpBucket::No => {
                    bus.emit(Event::new(EventType::PathSelected).field("path", "FOLLOWUP_NO"));
                    return Candidate::ui_text(
                        compose_ack(config, state, &config.playbook.follow_up.no.response),
                        format!("followup:{}", pending.card_id),
                        "discovery.playbook.followUp.no.response",
                        MatchSource::Discovery,
                    );
                }
                FollowUpBucket::Hesitant => {
                    let text = format!(
                        "{} {}",
                        config.playbook.follow_up.hesitant.response, pending.question
                    );
                    state.pending_follow_up = Some(PendingFollowUp {
                        turn: input.turn_index,
                        ..pending
                    });
                    bus.emit(
                        Event::new(EventType::PathSelected).field("path", "FOLLOWUP_HESITANT"),
                    );
                    return Candidate::ui_text(
                        text,
                        "followup:hesitant",
                        "discovery.playbook.followUp.hesitant.response",
                        MatchSource::Discovery,
                    );
                }
                FollowUpBucket::Reprompt => {
                    let text = format!(
                        "{} {}",
                        config.playbook.follow_up.reprompt.response, pending.question
                    );
                    state.pending_follow_up = Some(PendingFollowUp {
                        turn: input.turn_index,
                        ..pending
                    });
                    bus.emit(
                        Event::new(EventType::PathSelected).field("path", "FOLLOWUP_REPROMPT"),
                    );
                    return Candidate::ui_text(
                        text,
                        "followup:reprompt",
                        "discovery.playbook.followUp.reprompt.response",
                        MatchSource::Discovery,
                    );
                }
                FollowUpBucket::Complex => {
                    // Substantive answer: the pending flag is cleared and
                    // the utterance continues down the pipeline
                }
            }
        }

        // Generic pending question (4 buckets)
        if let Some(pending) = state.pending_question.take() {
            let bucket =
                classifier.classify_generic(&pipeline.normalized_text, &input.raw_text);
            bus.emit(
                Event::new(EventType::PendingQuestionResolved)
                    .field("namespace", "generic")
                    .field("bucket", bucket.as_str())
                    .field("source", pending.source.clone()),
            );
            match bucket {
                PendingBucket::Yes => {
                    bus.emit(Event::new(EventType::PathSelected).field("path", "PENDING_YES"));
                    return Candidate::ui_text(
                        config.playbook.pending.yes_response.clone(),
                        "pending:yes",
                        "discovery.playbook.pending.yesResponse",
                        MatchSource::Discovery,
                    );
                }
                PendingBucket::No => {
                    bus.emit(Event::new(EventType::PathSelected).field("path", "PENDING_NO"));
                    return Candidate::ui_text(
                        config.playbook.pending.no_response.clone(),
                        "pending:no",
                        "discovery.playbook.pending.noResponse",
                        MatchSource::Discovery,
                    );
                }
                PendingBucket::Reprompt => {
                    let text = format!(
                        "{} {}",
                        config.playbook.pending.reprompt_response, pending.question
                    );
                    state.pending_question = Some(PendingQuestion {
                        turn: input.turn_index,
                        ..pending
                    });
                    bus.emit(
                        Event::new(EventType::PathSelected).field("path", "PENDING_REPROMPT"),
                    );
                    return Candidate::ui_text(
                        text,
                        "pending:reprompt",
                        "discovery.playbook.pending.repromptResponse",
                        MatchSource::Discovery,
                    );
                }
                PendingBucket::Complex => {
                    // Fall through, and keep the fallback branch from
                    // re-asking its generic question this turn
                    state.pending_question_was_complex = true;
                }
            }
        }

        // Robot/human challenge
        let raw_lower = input.raw_text.to_lowercase();
        if config
            .behavior
            .robot_challenge
            .patterns
            .iter()
            .any(|p| raw_lower.contains(&p.to_lowercase()))
        {
            bus.emit(Event::new(EventType::PathSelected).field("path", "ROBOT_CHALLENGE"));
            return Candidate::ui_text(
                config.behavior.robot_challenge.line.clone(),
                "robot-challenge",
                "behavior.robotChallenge.line",
                MatchSource::Discovery,
            );
        }

        // LLM handoff confirmation from a previous guided turn
        if let Some(handoff) = state.llm_handoff_pending.take() {
            match classifier.classify_yes_no(&pipeline.normalized_text) {
                Some(true) => {
                    state.booking_intent_confirmed = true;
                    state.session_mode = SessionMode::Booking;
                    state.lane = Lane::Booking;
                    state.consent = Consent {
                        given: true,
                        turn: Some(input.turn_index),
                    };
                    bus.emit(
                        Event::new(EventType::PathSelected).field("path", "LLM_HANDOFF_YES"),
                    );
                    return Candidate::ui_text(
                        handoff.yes_response,
                        "llm-handoff:yes",
                        "assist.handoff.yesResponse",
                        MatchSource::BookingHandoff,
                    );
                }
                Some(false) => {
                    bus.emit(
                        Event::new(EventType::PathSelected).field("path", "LLM_HANDOFF_NO"),
                    );
                    return Candidate::ui_text(
                        handoff.no_response,
                        "llm-handoff:no",
                        "assist.handoff.noResponse",
                        MatchSource::Discovery,
                    );
                }
                None => {
                    // Unclear: cleared, pipeline continues
                }
            }
        }

        // Low-quality input with nothing pending: ask again rather than
        // matching on noise
        if pipeline.should_reprompt {
            bus.emit(Event::new(EventType::PathSelected).field("path", "FALLBACK_LOW_QUALITY"));
            return Candidate::ui_text(
                config.playbook.no_match_answer.clone(),
                "quality-gate",
                "discovery.playbook.fallback.noMatchAnswer",
                MatchSource::Discovery,
            );
        }

        // Trigger matcher with intent gate, hints, and locks
        let gate = IntentGate::new(&config.intent_gate);
        let intent = gate.evaluate(&pipeline.normalized_text);
        bus.emit(
            Event::new(EventType::IntentGateEvaluated)
                .field("serviceDown", intent.service_down)
                .field("emergency", intent.emergency)
                .field("patterns", serde_json::json!(intent.matched_patterns)),
        );

        let result = TriggerMatcher::run(
            &pipeline,
            &config.triggers,
            &config.global_negatives,
            &gate,
            &intent,
            &state.hints,
            &state.locks,
        );
        bus.emit(
            Event::new(EventType::TriggerCardsEvaluated)
                .field(
                    "winner",
                    result
                        .winner
                        .as_ref()
                        .map(|w| w.card_id.clone())
                        .unwrap_or_default(),
                )
                .field(
                    "matchType",
                    result
                        .winner
                        .as_ref()
                        .map(|w| w.match_type.as_str())
                        .unwrap_or(""),
                )
                .field(
                    "matchedOn",
                    result
                        .winner
                        .as_ref()
                        .map(|w| w.matched_on.clone())
                        .unwrap_or_default(),
                )
                .field(
                    "viaExpansion",
                    result.winner.as_ref().is_some_and(|w| w.via_expansion),
                )
                .field("evaluated", result.evaluated as u64)
                .field(
                    "records",
                    serde_json::json!(result
                        .records
                        .iter()
                        .map(|r| {
                            serde_json::json!({
                                "cardId": r.card_id,
                                "effectivePriority": r.effective_priority,
                                "matched": r.matched,
                                "skipped": r.skipped_reason,
                                "greetingBlocked": r.greeting_blocked,
                            })
                        })
                        .collect::<Vec<_>>()),
                ),
        );

        if let Some(winner) = &result.winner {
            state.no_match_count = 0;
            return self
                .execute_trigger_match(config, state, bus, input, &pipeline, &winner.card_id)
                .await;
        }
        state.no_match_count += 1;

        // Clarifier ask: hints without a match
        if let Some(entry) =
            ClarifierEngine::pick(&config.clarifiers, &state.hints, state.clarifier_asks)
        {
            state.pending_clarifier = Some(PendingClarifier {
                id: entry.id.clone(),
                hint_trigger: entry.hint_trigger.clone(),
                locks_to: entry.locks_to.clone(),
                turn: input.turn_index,
            });
            state.clarifier_asks += 1;
            bus.emit(
                Event::new(EventType::ClarifierAsked)
                    .field("id", entry.id.clone())
                    .field("hintTrigger", entry.hint_trigger.clone()),
            );
            bus.emit(Event::new(EventType::PathSelected).field("path", "CLARIFIER_ASK"));
            return Candidate::ui_text(
                entry.question.clone(),
                format!("clarifier:{}", entry.id),
                format!("clarifiers.{}.question", entry.id),
                MatchSource::Discovery,
            );
        }

        // Optional external scenario fallback
        if config.features.use_scenario_fallback {
            if let Some(candidate) = self.try_scenario(config, bus, input, &pipeline).await {
                return candidate;
            }
        }

        // LLM assist
        let decision = LlmAssist::decide(config, state, &pipeline);
        bus.emit(
            Event::new(EventType::LlmDecision)
                .field("call", decision.call)
                .field("mode", decision.mode.as_str())
                .field("blockedBy", decision.blocked_by.unwrap_or(""))
                .field("reason", decision.reason.clone())
                .field("complexity", decision.complexity.score as f64)
                .field("llmTurnsThisCall", state.llm_turns_this_call as u64)
                .field("usesThisCall", state.llm_assist.uses_this_call as u64)
                .field(
                    "cooldownRemaining",
                    state.llm_assist.cooldown_remaining as u64,
                ),
        );
        if decision.call {
            let result = LlmAssist::run(
                self.llm.as_ref(),
                config,
                input,
                state,
                &pipeline,
                bus,
            )
            .await;

            // Every attempted invocation counts against the budgets
            match decision.mode {
                AssistMode::Guided => state.llm_turns_this_call += 1,
                AssistMode::AnswerReturn => {
                    state.llm_assist.uses_this_call += 1;
                    state.llm_assist.cooldown_remaining =
                        config.assist.answer_return.cooldown_turns;
                }
            }
            state.llm_assist.last_mode_used = Some(decision.mode);

            match result {
                AssistResult::Spoken {
                    text,
                    source_path,
                    handoff,
                    usage,
                } => {
                    self.log_usage(usage).await;
                    state.llm_handoff_pending = handoff;
                    bus.emit(Event::new(EventType::PathSelected).field(
                        "path",
                        match decision.mode {
                            AssistMode::Guided => "LLM_ASSIST_GUIDED",
                            AssistMode::AnswerReturn => "LLM_ASSIST_ANSWER_RETURN",
                        },
                    ));
                    return Candidate {
                        text: Some(text),
                        audio_url: None,
                        source_id: format!("llm-assist:{}", decision.mode.as_str()),
                        primary_path: source_path,
                        fallback_path: None,
                        is_from_ui_config: false,
                        match_source: MatchSource::Discovery,
                    };
                }
                AssistResult::Emergency { reason, usage } => {
                    if let Some(usage) = usage {
                        self.log_usage(usage).await;
                    }
                    bus.emit(
                        Event::new(EventType::PathSelected)
                            .field("path", "LLM_ASSIST_EMERGENCY")
                            .field("reason", reason),
                    );
                    return emergency_candidate(config, "llm-assist");
                }
                AssistResult::Skipped { reason } => {
                    tracing::debug!(reason = %reason, "Assist skipped after attempt");
                }
            }
        }

        // Deterministic fallbacks
        if let Some(reason) = state.captured_reason().map(|r| r.to_string()) {
            let empathy = config.playbook.human_tone_empathy.replace("{reason}", &reason);
            let question = config.assist.handoff.question().to_string();
            state.pending_question = Some(PendingQuestion {
                question: question.clone(),
                source: "fallback".to_string(),
                turn: input.turn_index,
            });
            bus.emit(
                Event::new(EventType::PathSelected).field("path", "FALLBACK_KNOWN_REASON"),
            );
            return Candidate::ui_text(
                format!("{empathy} {question}"),
                "fallback:known-reason",
                "discovery.playbook.humanTone.empathy",
                MatchSource::Discovery,
            );
        }

        if state.pending_question_was_complex {
            // The caller just gave a substantive answer to our question;
            // re-asking the generic prompt would talk past them
            bus.emit(
                Event::new(EventType::PathSelected).field("path", "FALLBACK_COMPLEX_FALLTHROUGH"),
            );
            return emergency_candidate(config, "complex-fallthrough");
        }

        bus.emit(Event::new(EventType::PathSelected).field("path", "FALLBACK_NO_MATCH"));
        Candidate::ui_text(
            config.playbook.no_match_answer.clone(),
            "fallback:no-match",
            "discovery.playbook.fallback.noMatchAnswer",
            MatchSource::Discovery,
        )
    }

    /// Compose and return the winning card's response
    async fn execute_trigger_match(
        &self,
        config: &CompanyConfig,
        state: &mut CallState,
        bus: &mut EventBus,
        input: &TurnInput,
        pipeline: &crate::text::PipelineOutput,
        card_id: &str,
    ) -> Candidate {
        let Some(card) = config.card(card_id) else {
            // The matcher only returns ids from the card list
            tracing::error!(card_id = %card_id, "Winner card vanished from config");
            return emergency_candidate(config, "trigger-match");
        };

        // A match is the best evidence of why the caller rang
        if state.captured_reason().is_none() {
            let label = if card.label.is_empty() { &card.id } else { &card.label };
            state.set_slot("call_reason_detail", label.clone(), 0.9);
        }

        bus.emit(
            Event::new(EventType::PathSelected)
                .field("path", "TRIGGER_MATCH")
                .field("cardId", card.id.clone()),
        );

        // Audio answers play verbatim; no composition
        if let Some(audio_url) = card.answer.audio_url() {
            return Candidate {
                text: None,
                audio_url: Some(audio_url.to_string()),
                source_id: format!("trigger:{}", card.id),
                primary_path: format!("triggers.cards.{}.answer", card.id),
                fallback_path: None,
                is_from_ui_config: true,
                match_source: MatchSource::Discovery,
            };
        }

        let (answer_text, from_ui) = match &card.answer {
            AnswerPayload::Static { text, .. } => {
                (text.clone().unwrap_or_default(), true)
            }
            AnswerPayload::Llm {
                fact_pack,
                fallback_text,
            } => {
                let completion = LlmAssist::complete_card(
                    self.llm.as_ref(),
                    config,
                    &card.id,
                    fact_pack,
                    input,
                    pipeline,
                    bus,
                )
                .await;
                if let Some(usage) = completion.usage {
                    self.log_usage(usage).await;
                }
                match completion.text {
                    Some(text) => (text, false),
                    None => (fallback_text.clone().unwrap_or_default(), true),
                }
            }
        };

        let mut response = format!("{} {}", compose_ack_word(config, state), answer_text);
        if let Some(follow_up) = &card.follow_up {
            response.push(' ');
            response.push_str(&follow_up.question);
            state.pending_follow_up = Some(PendingFollowUp {
                question: follow_up.question.clone(),
                card_id: card.id.clone(),
                direction: follow_up.next_action,
                turn: input.turn_index,
            });
        }

        let variables = self
            .variables
            .get(
                self.variable_store.as_ref(),
                &input.company_id,
                config.version,
            )
            .await;
        let response = substitute(&response, &variables);

        Candidate {
            text: Some(response),
            audio_url: None,
            source_id: format!("trigger:{}", card.id),
            primary_path: format!("triggers.cards.{}.answer", card.id),
            fallback_path: Some(format!("triggers.cards.{}.answer.fallbackText", card.id)),
            is_from_ui_config: from_ui,
            match_source: MatchSource::Discovery,
        }
    }

    /// Execute a confirmed follow-up in its configured direction
    fn execute_follow_up_yes(
        &self,
        config: &CompanyConfig,
        state: &mut CallState,
        bus: &mut EventBus,
        input: &TurnInput,
        pending: &PendingFollowUp,
    ) -> Candidate {
        let path_label = format!("FOLLOWUP_YES_{}", pending.direction.as_str());
        bus.emit(Event::new(EventType::PathSelected).field("path", path_label));

        let match_source = match pending.direction {
            FollowUpDirection::HandoffBooking => {
                state.session_mode = SessionMode::Booking;
                state.lane = Lane::Booking;
                state.booking_intent_confirmed = true;
                state.consent = Consent {
                    given: true,
                    turn: Some(input.turn_index),
                };
                MatchSource::BookingHandoff
            }
            FollowUpDirection::Escalate => {
                state.lane = Lane::Escalate;
                MatchSource::Discovery
            }
            FollowUpDirection::ContinueDiscovery => MatchSource::Discovery,
        };

        Candidate::ui_text(
            compose_ack(config, state, &config.playbook.follow_up.yes.response),
            format!("followup:{}", pending.card_id),
            "discovery.playbook.followUp.yes.response",
            match_source,
        )
    }

    /// Consult the external scenario selector; any failure just skips
    /// the branch
    async fn try_scenario(
        &self,
        config: &CompanyConfig,
        bus: &mut EventBus,
        input: &TurnInput,
        pipeline: &crate::text::PipelineOutput,
    ) -> Option<Candidate> {
        let selector = self.scenario.as_ref()?;
        let pick = match selector
            .select(&input.company_id, &pipeline.normalized_text)
            .await
        {
            Ok(pick) => pick?,
            Err(e) => {
                bus.emit(
                    Event::new(EventType::EngineError)
                        .field("stage", "scenario-fallback")
                        .field("error", e.to_string()),
                );
                return None;
            }
        };

        if pick.confidence < config.features.scenario_confidence_min
            || !config
                .features
                .scenario_allowed_types
                .iter()
                .any(|t| t == &pick.scenario_type)
        {
            return None;
        }

        bus.emit(
            Event::new(EventType::PathSelected)
                .field("path", "SCENARIO_FALLBACK")
                .field("scenarioType", pick.scenario_type.clone())
                .field("confidence", pick.confidence as f64),
        );
        Some(Candidate {
            text: Some(pick.response),
            audio_url: None,
            source_id: format!("scenario:{}", pick.scenario_type),
            // Anchored on the governed fallback path; the source id
            // records where the text actually came from
            primary_path: "discovery.playbook.fallback.noMatchAnswer".to_string(),
            fallback_path: None,
            is_from_ui_config: false,
            match_source: MatchSource::Discovery,
        })
    }

    async fn log_usage(&self, usage: frontdesk_core::LlmUsageRecord) {
        if let Err(e) = self.usage_logger.log(usage).await {
            tracing::warn!(error = %e, "Usage logger failed; record dropped");
        }
    }
}

/// The emergency fallback as a candidate; the speak gate re-resolves it
fn emergency_candidate(config: &CompanyConfig, source_id: &str) -> Candidate {
    Candidate::ui_text(
        config.playbook.emergency_fallback.clone(),
        source_id.to_string(),
        CompanyConfig::EMERGENCY_FALLBACK_PATH,
        MatchSource::Discovery,
    )
}

/// Ack word, personalized with the caller's name at most once per turn
/// when the name slot is confident enough
fn compose_ack_word(config: &CompanyConfig, state: &mut CallState) -> String {
    let ack = config.behavior.ack_word.clone();
    if !config.behavior.use_caller_name || state.used_name_this_turn {
        return ack;
    }
    let Some(name) = state.caller_name() else {
        return ack;
    };
    if name.confidence < config.behavior.name_confidence_min {
        return ack;
    }
    let name = name.value.clone();
    state.used_name_this_turn = true;
    format!("{}, {}.", ack.trim_end_matches('.'), name)
}

/// Ack word + a UI response line
fn compose_ack(config: &CompanyConfig, state: &mut CallState, response: &str) -> String {
    format!("{} {}", compose_ack_word(config, state), response)
}
