//! The per-turn dialog engine
//!
//! For each caller utterance the engine deterministically selects exactly
//! one spoken response and moves the call state forward. Gates run in a
//! fixed order; every spoken byte resolves to a configuration path; the
//! LLM assist path is bounded and governed. No error leaves a turn — the
//! caller always hears something.

pub mod assist;
pub mod bus;
pub mod clarifier;
pub mod echo;
pub mod greeting;
pub mod intent_gate;
pub mod matcher;
pub mod pending;
pub mod runner;
pub mod speak;
pub mod store;
pub mod text;
pub mod variables;

pub use bus::EventBus;
pub use clarifier::{ClarifierEngine, ClarifierResolution};
pub use echo::EchoGuard;
pub use greeting::{GreetingDecision, GreetingInterceptor};
pub use intent_gate::{IntentFlags, IntentGate};
pub use matcher::{CardRecord, MatchResult, MatchType, TriggerMatcher, WinningMatch};
pub use pending::{FollowUpBucket, PendingBucket, PendingClassifier};
pub use runner::{TurnRunner, TurnRunnerBuilder};
pub use speak::{Candidate, SpeakGate};
pub use store::CallRegistry;
pub use text::{PipelineOutput, TextPipeline};
pub use variables::TriggerVariableCache;
