//! Scripted backend for tests
//!
//! Returns queued responses in order, then repeats the last one.
//! Records every request it receives.

use async_trait::async_trait;
use parking_lot::Mutex;

use frontdesk_core::{CompletionRequest, CompletionResponse, Error, LlmClient, Result};

/// Deterministic test backend
pub struct ScriptedLlmClient {
    responses: Mutex<Vec<std::result::Result<String, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlmClient {
    /// A client that answers with the given texts, in order
    pub fn with_responses(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A client that always fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(vec![Err(message.into())]),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// The last request's user prompt, for assertions
    pub fn last_user_prompt(&self) -> Option<String> {
        self.requests.lock().last().map(|r| r.user_prompt.clone())
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().push(request);

        let mut responses = self.responses.lock();
        let next = if responses.len() > 1 {
            responses.remove(0)
        } else {
            responses
                .first()
                .cloned()
                .unwrap_or_else(|| Err("script exhausted".to_string()))
        };

        match next {
            Ok(text) => Ok(CompletionResponse {
                tokens_in: 50,
                tokens_out: text.split_whitespace().count() as u32,
                latency_ms: 5,
                text,
            }),
            Err(message) => Err(Error::Llm(message)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "test".to_string(),
            system_prompt: "system".to_string(),
            user_prompt: "user".to_string(),
            temperature: 0.3,
            max_tokens: 100,
            deadline: Duration::from_secs(4),
        }
    }

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let client = ScriptedLlmClient::with_responses(["first", "second"]);
        assert_eq!(client.complete(request()).await.unwrap().text, "first");
        assert_eq!(client.complete(request()).await.unwrap().text, "second");
        // Last response repeats
        assert_eq!(client.complete(request()).await.unwrap().text, "second");
        assert_eq!(client.request_count(), 3);
    }

    #[tokio::test]
    async fn test_failing_client() {
        let client = ScriptedLlmClient::failing("down");
        assert!(client.complete(request()).await.is_err());
    }
}
