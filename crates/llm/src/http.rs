//! HTTP chat-completions backend
//!
//! Speaks the OpenAI-compatible chat API. Transient 5xx failures are
//! retried with doubling backoff inside the caller's deadline; 4xx
//! failures are not retried.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use frontdesk_core::{CompletionRequest, CompletionResponse, LlmClient, Result};

use crate::LlmError;

/// Backend configuration
#[derive(Debug, Clone)]
pub struct HttpLlmConfig {
    /// API base, e.g. `https://api.openai.com/v1`
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Retry attempts for 5xx responses
    pub max_retries: u32,
    /// First backoff; doubles each retry
    pub initial_backoff: Duration,
}

impl Default for HttpLlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            max_retries: 2,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

/// The backend
pub struct HttpLlmClient {
    client: Client,
    config: HttpLlmConfig,
}

impl HttpLlmClient {
    pub fn new(config: HttpLlmConfig) -> std::result::Result<Self, LlmError> {
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    async fn execute(
        &self,
        body: &ChatRequest,
        deadline: Duration,
    ) -> std::result::Result<ChatResponse, LlmError> {
        let mut request = self.client.post(self.api_url()).timeout(deadline).json(body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            if status.is_server_error() {
                return Err(LlmError::Network(format!("server error {status}: {error}")));
            }
            return Err(LlmError::Api(format!("{status}: {error}")));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = ChatRequest {
            model: request.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user_prompt.clone(),
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let started = Instant::now();
        let mut backoff = self.config.initial_backoff;
        let mut attempt = 0u32;

        let response = loop {
            let remaining = request
                .deadline
                .checked_sub(started.elapsed())
                .ok_or(LlmError::Timeout)?;

            match self.execute(&body, remaining).await {
                Ok(response) => break response,
                Err(e @ (LlmError::Network(_) | LlmError::Timeout))
                    if attempt < self.config.max_retries =>
                {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        error = %e,
                        backoff_ms = backoff.as_millis() as u64,
                        "Retrying LLM request"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => return Err(e.into()),
            }
        };

        let text = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("no choices".to_string()))?;

        Ok(CompletionResponse {
            text,
            tokens_in: response.usage.as_ref().map_or(0, |u| u.prompt_tokens),
            tokens_out: response.usage.as_ref().map_or(0, |u| u.completion_tokens),
            latency_ms: started.elapsed().as_millis() as u64,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let client = HttpLlmClient::new(HttpLlmConfig {
            endpoint: "https://api.openai.com/v1/".to_string(),
            ..HttpLlmConfig::default()
        })
        .unwrap();
        assert_eq!(client.api_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Hello there."}}],
            "usage": {"prompt_tokens": 42, "completion_tokens": 7}
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "Hello there.");
        assert_eq!(response.usage.unwrap().completion_tokens, 7);
    }
}
