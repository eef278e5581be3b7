//! LLM backend trait and the mock used in tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{LlmError, Result};
use crate::types::{CompletionRequest, CompletionResponse, ContentBlock, StopReason, Usage};

// ─────────────────────────────────────────────────────────────────────────────
// Shared Retry Logic
// ─────────────────────────────────────────────────────────────────────────────

/// Execute an async operation with exponential backoff retry.
///
/// Retries only on transient errors (network failures, rate limits).
/// Non-retryable errors are returned immediately. A provider-supplied
/// retry-after delay takes precedence over the computed backoff.
pub async fn with_retry<F, Fut, T>(
    max_retries: u32,
    initial_backoff: Duration,
    backend_name: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut backoff = initial_backoff;
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_retryable() || attempt >= max_retries => return Err(e),
            Err(e) => {
                let delay = e.retry_after().unwrap_or(backoff);
                attempt += 1;
                tracing::warn!(
                    backend = backend_name,
                    attempt,
                    max_retries,
                    backoff_ms = delay.as_millis() as u64,
                    error = %e,
                    "Request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                backoff *= 2;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LLM Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A chat-completions provider.
///
/// Narration only needs single-shot completions. Structured answers go
/// through tool calls carried on the response.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Run one completion round trip.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short provider name used in logs.
    fn name(&self) -> &str;
}

/// A backend that can be shared across threads.
pub type SharedBackend = Arc<dyn LlmBackend>;

// ─────────────────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum MockReply {
    Response(CompletionResponse),
    Error(String),
}

/// A mock backend for testing purposes.
///
/// Replies are returned in the order they were queued. Once the queue is
/// exhausted every request fails with a backend error.
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    replies: Mutex<VecDeque<MockReply>>,
    request_log: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MockBackend {
    /// Create a new mock backend with the given responses.
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            name: "mock".to_string(),
            replies: Mutex::new(responses.into_iter().map(MockReply::Response).collect()),
            request_log: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Wait this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Create a mock backend with a single text response.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::default().then_text(text)
    }

    /// Create a mock backend answering each request with the next text.
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .fold(Self::default(), |mock, text| mock.then_text(text))
    }

    /// Queue a plain text response.
    pub fn then_text(self, text: impl Into<String>) -> Self {
        let response = CompletionResponse::new(
            format!("mock_msg_{}", self.replies.lock().len() + 1),
            "mock-model",
            vec![ContentBlock::text(text)],
            StopReason::EndTurn,
            Usage::new(10, 20),
        );
        self.replies.lock().push_back(MockReply::Response(response));
        self
    }

    /// Queue a response that calls the named tool with the given input.
    pub fn then_tool_call(self, tool_name: impl Into<String>, input: serde_json::Value) -> Self {
        let index = self.replies.lock().len() + 1;
        let response = CompletionResponse::new(
            format!("mock_msg_{}", index),
            "mock-model",
            vec![ContentBlock::tool_call(
                format!("mock_call_{}", index),
                tool_name,
                input,
            )],
            StopReason::ToolCall,
            Usage::new(10, 5),
        );
        self.replies.lock().push_back(MockReply::Response(response));
        self
    }

    /// Queue a backend failure.
    pub fn then_error(self, message: impl Into<String>) -> Self {
        self.replies.lock().push_back(MockReply::Error(message.into()));
        self
    }

    /// Get all requests that were made to this backend.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.request_log.lock().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.request_log.lock().len()
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.request_log.lock().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.replies.lock().pop_front() {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Error(message)) => Err(LlmError::Backend(message)),
            None => Err(LlmError::Backend(
                "MockBackend: no more responses available".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
