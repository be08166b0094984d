//! Per-call conversation state
//!
//! One `CallState` value exists per active call. It is loaded at the start
//! of a turn, mutated on a local copy by the runner, and written back once
//! when the turn completes. Nothing here is shared between calls.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Coarse conversation lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    #[default]
    Discovery,
    Booking,
    Escalate,
}

impl Lane {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::Discovery => "discovery",
            Lane::Booking => "booking",
            Lane::Escalate => "escalate",
        }
    }
}

/// Session mode, flipped to `Booking` on a confirmed handoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    #[default]
    Discovery,
    Booking,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Discovery => "discovery",
            SessionMode::Booking => "booking",
        }
    }
}

/// LLM assist operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssistMode {
    /// Empathy sentence plus a UI-owned handoff question
    #[default]
    Guided,
    /// Free-standing answer, never ends in a question
    AnswerReturn,
}

impl AssistMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssistMode::Guided => "guided",
            AssistMode::AnswerReturn => "answer_return",
        }
    }
}

/// Direction executed when a trigger-card follow-up resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FollowUpDirection {
    #[default]
    ContinueDiscovery,
    HandoffBooking,
    Escalate,
}

impl FollowUpDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowUpDirection::ContinueDiscovery => "CONTINUE_DISCOVERY",
            FollowUpDirection::HandoffBooking => "HANDOFF_BOOKING",
            FollowUpDirection::Escalate => "ESCALATE",
        }
    }
}

/// An extracted fact with per-slot confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotValue {
    pub value: String,
    pub confidence: f32,
}

/// A generic agent-initiated question awaiting a caller response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingQuestion {
    /// The question as spoken
    pub question: String,
    /// Which subsystem asked it
    pub source: String,
    /// Turn index at which it was asked
    pub turn: u32,
}

/// A trigger-card follow-up awaiting a caller response
///
/// Kept in a separate namespace from [`PendingQuestion`]: follow-ups use
/// the 5-bucket classifier and carry a configured direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingFollowUp {
    pub question: String,
    /// Id of the card that asked it
    pub card_id: String,
    pub direction: FollowUpDirection,
    pub turn: u32,
}

/// A lock a clarifier sets when the caller confirms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockSpec {
    /// Lock key, e.g. `component`
    pub key: String,
    /// Lock value, e.g. `thermostat`
    pub value: String,
}

/// A disambiguation question awaiting a caller yes/no
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingClarifier {
    pub id: String,
    /// The soft hint that caused the question
    pub hint_trigger: String,
    /// Lock written on a yes
    pub locks_to: Option<LockSpec>,
    pub turn: u32,
}

/// An LLM-assist handoff question awaiting a caller yes/no
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmHandoffPending {
    pub yes_response: String,
    pub no_response: String,
    pub turn: u32,
}

/// Per-call LLM assist bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmAssistState {
    /// Answer-return invocations so far this call
    pub uses_this_call: u32,
    /// Turns left before answer-return may fire again
    pub cooldown_remaining: u32,
    pub last_mode_used: Option<AssistMode>,
}

/// Booking consent captured on a confirmed handoff
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Consent {
    pub given: bool,
    /// Turn at which consent was given
    pub turn: Option<u32>,
}

/// Mutable per-call state, carried across turns within one call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallState {
    pub call_id: String,
    pub company_id: String,
    pub lane: Lane,
    pub session_mode: SessionMode,
    pub booking_mode_locked: bool,
    /// One-shot latch for the greeting interceptor
    pub greeted: bool,
    pub pending_question: Option<PendingQuestion>,
    pub pending_follow_up: Option<PendingFollowUp>,
    pub pending_clarifier: Option<PendingClarifier>,
    /// One-turn sticky flag: a complex answer to a pending question
    /// suppresses the generic reprompt in the fallback branch.
    pub pending_question_was_complex: bool,
    /// Soft hints accumulated by vocabulary, in arrival order
    pub hints: Vec<String>,
    /// Caller-confirmed anchors, e.g. `component -> thermostat`
    pub locks: HashMap<String, String>,
    /// Extracted facts (`name`, `call_reason_detail`, ...)
    pub plain_slots: HashMap<String, SlotValue>,
    pub llm_assist: LlmAssistState,
    /// Guided-mode LLM turns consumed this call
    pub llm_turns_this_call: u32,
    /// Consecutive turns with no deterministic match
    pub no_match_count: u32,
    /// Clarifier questions asked this call
    pub clarifier_asks: u32,
    /// Latch so the ack personalizes with the caller name at most once per turn
    pub used_name_this_turn: bool,
    pub llm_handoff_pending: Option<LlmHandoffPending>,
    pub booking_intent_confirmed: bool,
    pub consent: Consent,
    /// Turn index most recently processed
    pub last_turn_index: u32,
}

impl CallState {
    /// Create state for the first turn of a call
    pub fn new(call_id: impl Into<String>, company_id: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            company_id: company_id.into(),
            lane: Lane::Discovery,
            session_mode: SessionMode::Discovery,
            booking_mode_locked: false,
            greeted: false,
            pending_question: None,
            pending_follow_up: None,
            pending_clarifier: None,
            pending_question_was_complex: false,
            hints: Vec::new(),
            locks: HashMap::new(),
            plain_slots: HashMap::new(),
            llm_assist: LlmAssistState::default(),
            llm_turns_this_call: 0,
            no_match_count: 0,
            clarifier_asks: 0,
            used_name_this_turn: false,
            llm_handoff_pending: None,
            booking_intent_confirmed: false,
            consent: Consent::default(),
            last_turn_index: 0,
        }
    }

    /// Reset per-turn latches and expire stale pending flows.
    ///
    /// A pending question is answered on the turn after it was asked; one
    /// that survives past that is stale and cleared here so it cannot
    /// hijack an unrelated utterance.
    pub fn begin_turn(&mut self, turn_index: u32) {
        self.used_name_this_turn = false;
        self.pending_question_was_complex = false;

        if self.llm_assist.cooldown_remaining > 0 {
            self.llm_assist.cooldown_remaining -= 1;
        }

        if let Some(ref p) = self.pending_question {
            if turn_index > p.turn + 1 {
                tracing::debug!(call_id = %self.call_id, asked_at = p.turn, "Clearing stale pending question");
                self.pending_question = None;
            }
        }
        if let Some(ref p) = self.pending_follow_up {
            if turn_index > p.turn + 1 {
                tracing::debug!(call_id = %self.call_id, asked_at = p.turn, "Clearing stale pending follow-up");
                self.pending_follow_up = None;
            }
        }
        if let Some(ref p) = self.pending_clarifier {
            if turn_index > p.turn + 1 {
                tracing::debug!(call_id = %self.call_id, asked_at = p.turn, "Clearing stale pending clarifier");
                self.pending_clarifier = None;
            }
        }
        if let Some(ref p) = self.llm_handoff_pending {
            if turn_index > p.turn + 1 {
                self.llm_handoff_pending = None;
            }
        }

        self.last_turn_index = turn_index;
    }

    /// Add a soft hint, preserving arrival order, no duplicates
    pub fn add_hint(&mut self, hint: impl Into<String>) {
        let hint = hint.into();
        if !self.hints.iter().any(|h| h == &hint) {
            self.hints.push(hint);
        }
    }

    /// Remove a hint (clarifier resolution on a no)
    pub fn remove_hint(&mut self, hint: &str) {
        self.hints.retain(|h| h != hint);
    }

    /// Set a caller-confirmed lock
    pub fn set_lock(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.locks.insert(key.into(), value.into());
    }

    /// Record an extracted fact
    pub fn set_slot(&mut self, name: impl Into<String>, value: impl Into<String>, confidence: f32) {
        self.plain_slots.insert(
            name.into(),
            SlotValue {
                value: value.into(),
                confidence,
            },
        );
    }

    /// Caller name slot, if captured
    pub fn caller_name(&self) -> Option<&SlotValue> {
        self.plain_slots.get("name")
    }

    /// Sanitized short label of the caller's stated problem, if captured
    pub fn captured_reason(&self) -> Option<&str> {
        self.plain_slots
            .get("call_reason_detail")
            .map(|s| s.value.as_str())
    }
}
