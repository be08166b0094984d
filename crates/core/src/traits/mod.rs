//! Trait seams for external collaborators
//!
//! The engine consumes these interfaces; concrete implementations live in
//! the `llm` and `server` crates (and in tests). Each component receives
//! exactly the seam it needs, passed down explicitly.

mod llm;
mod scenario;
mod sink;
mod variables;

pub use llm::{CompletionRequest, CompletionResponse, LlmClient};
pub use scenario::{ScenarioPick, ScenarioSelector};
pub use sink::{EventSink, LlmUsageRecord, UsageLogger};
pub use variables::VariableStore;
