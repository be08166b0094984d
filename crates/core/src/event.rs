//! Typed audit events
//!
//! Every decision the pipeline takes is recorded as an event. Events are
//! buffered in arrival order during a turn and drained to the external
//! sink exactly once at turn end. Identifiers are stable: downstream
//! dashboards and log queries key on them.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Stable event identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// Mandatory turn entry event
    TurnGate,
    GreetingEvaluated,
    /// Text pipeline result (filler strip, normalize, expansion, quality)
    ScrabProcessed,
    TriggerCardsEvaluated,
    IntentGateEvaluated,
    PendingQuestionResolved,
    ClarifierAsked,
    ClarifierResolved,
    LlmDecision,
    LlmOutputValidation,
    LlmConstraintViolation,
    LlmHandoffOverride,
    SpeakProvenance,
    SpokenTextUnmappedBlocked,
    EchoBlocked,
    PathSelected,
    /// Mandatory turn exit event when a response was produced
    ResponseReady,
    /// Mandatory turn exit event when the master gate is off
    Disabled,
    TurnTimeout,
    EngineError,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::TurnGate => "turn-gate",
            EventType::GreetingEvaluated => "greeting-evaluated",
            EventType::ScrabProcessed => "scrab-processed",
            EventType::TriggerCardsEvaluated => "trigger-cards-evaluated",
            EventType::IntentGateEvaluated => "intent-gate-evaluated",
            EventType::PendingQuestionResolved => "pending-question-resolved",
            EventType::ClarifierAsked => "clarifier-asked",
            EventType::ClarifierResolved => "clarifier-resolved",
            EventType::LlmDecision => "llm-decision",
            EventType::LlmOutputValidation => "llm-output-validation",
            EventType::LlmConstraintViolation => "llm-constraint-violation",
            EventType::LlmHandoffOverride => "llm-handoff-override",
            EventType::SpeakProvenance => "speak-provenance",
            EventType::SpokenTextUnmappedBlocked => "spoken-text-unmapped-blocked",
            EventType::EchoBlocked => "echo-blocked",
            EventType::PathSelected => "path-selected",
            EventType::ResponseReady => "response-ready",
            EventType::Disabled => "disabled",
            EventType::TurnTimeout => "turn-timeout",
            EventType::EngineError => "engine-error",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event severity, CRITICAL reserved for provenance failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    #[default]
    Info,
    Warning,
    Critical,
}

/// A single audit event, append-only within a turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub payload: Map<String, Value>,
    pub timestamp_ms: i64,
    pub turn_index: u32,
    /// Stable hash of the configuration active for this turn
    pub config_hash: String,
    #[serde(default)]
    pub severity: EventSeverity,
}

impl Event {
    /// Create an event; config hash and turn index are stamped by the bus
    pub fn new(event_type: EventType) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            payload: Map::new(),
            timestamp_ms: Utc::now().timestamp_millis(),
            turn_index: 0,
            config_hash: String::new(),
            severity: EventSeverity::Info,
        }
    }

    pub fn with_severity(mut self, severity: EventSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Attach a payload field
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }
}
