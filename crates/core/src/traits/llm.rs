//! LLM completion seam

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// A single constrained completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Hard deadline for the whole call; on expiry the request fails
    pub deadline: Duration,
}

/// Completion result with usage accounting
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
    pub latency_ms: u64,
}

/// Completion backend
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Backend name for logs and usage records
    fn name(&self) -> &str;
}
