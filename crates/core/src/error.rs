//! Error types shared across the orchestrator crates

use thiserror::Error;

/// Top-level error for the orchestrator.
///
/// Component crates define their own error enums and convert into this
/// type at the crate boundary. No variant of this error ever escapes a
/// turn; the runner degrades to the emergency fallback instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Call state error: {0}")]
    State(String),

    #[error("Event sink error: {0}")]
    Sink(String),

    #[error("Scenario engine error: {0}")]
    Scenario(String),

    #[error("Deadline exceeded: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
