//! Core types for the dialog orchestrator
//!
//! This crate provides foundational types used across all other crates:
//! - Per-call state carried between turns (`CallState`)
//! - Turn input/outcome types
//! - The typed audit event stream
//! - Trait seams for external collaborators (LLM, sinks, variables, scenarios)
//! - Error types

pub mod call;
pub mod error;
pub mod event;
pub mod traits;
pub mod turn;

pub use call::{
    AssistMode, CallState, Consent, FollowUpDirection, Lane, LlmAssistState, LlmHandoffPending,
    LockSpec, PendingClarifier, PendingFollowUp, PendingQuestion, SessionMode, SlotValue,
};
pub use error::{Error, Result};
pub use event::{Event, EventSeverity, EventType};
pub use turn::{MatchSource, TurnInput, TurnOutcome};

pub use traits::{
    CompletionRequest, CompletionResponse, EventSink, LlmClient, LlmUsageRecord, ScenarioPick,
    ScenarioSelector, UsageLogger, VariableStore,
};
