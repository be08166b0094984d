//! LLM client implementations
//!
//! The engine consumes the [`frontdesk_core::LlmClient`] seam; this
//! crate provides an HTTP chat-completions backend for production and a
//! scripted backend for tests.

pub mod http;
pub mod scripted;

pub use http::{HttpLlmClient, HttpLlmConfig};
pub use scripted::ScriptedLlmClient;

use thiserror::Error;

/// LLM backend errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for frontdesk_core::Error {
    fn from(err: LlmError) -> Self {
        frontdesk_core::Error::Llm(err.to_string())
    }
}
