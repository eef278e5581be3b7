//! Backend for OpenAI-compatible chat-completions endpoints.
//!
//! OpenAI, Groq, Ollama, and most self-hosted servers accept the same
//! `/chat/completions` request, so one client covers all of them.

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::backend::{LlmBackend, with_retry};
use crate::error::{LlmError, Result, parse_retry_after_header};
use crate::types::{
    CompletionRequest, CompletionResponse, ContentBlock, Role, StopReason, ToolChoice, Usage,
};

/// OpenAI's public endpoint.
pub const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";

const GROQ_BASE: &str = "https://api.groq.com/openai/v1";
const OLLAMA_BASE: &str = "http://localhost:11434/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_RETRIES: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Sent as a bearer token. Local servers usually need none.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Replaces the model named on each request when set.
    pub model: Option<String>,
    pub timeout: Duration,
    /// Retries for network failures and rate limits.
    pub max_retries: u32,
    pub retry_backoff: Duration,
    /// Provider name used in logs.
    pub name: String,
}

impl OpenAiConfig {
    fn with_endpoint(name: &str, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.to_string(),
            model: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_RETRIES,
            retry_backoff: DEFAULT_BACKOFF,
            name: name.to_string(),
        }
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::with_endpoint("openai", DEFAULT_OPENAI_BASE, Some(api_key.into()))
    }

    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::with_endpoint("groq", GROQ_BASE, Some(api_key.into()))
    }

    /// Local Ollama server. Inference on a laptop is slow, so the timeout is
    /// generous.
    pub fn ollama() -> Self {
        Self::with_endpoint("ollama", OLLAMA_BASE, None).with_timeout(Duration::from_secs(600))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend
// ─────────────────────────────────────────────────────────────────────────────

/// Talks to an OpenAI-compatible endpoint over HTTP.
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key {
            Some(ref key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn chat_request(&self, request: &CompletionRequest) -> ChatRequest {
        let system = request.system.iter().map(|text| ChatMessage {
            role: "system",
            content: text.clone(),
        });
        let turns = request.messages.iter().map(|m| ChatMessage {
            role: match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: m.content.clone(),
        });

        let tools: Vec<ChatTool> = request
            .tools
            .iter()
            .map(|tool| ChatTool {
                kind: "function",
                function: ChatFunction {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.input_schema.clone(),
                },
            })
            .collect();

        // Providers reject tool_choice on a request without tools
        let tool_choice = if tools.is_empty() {
            None
        } else {
            request.tool_choice.as_ref().map(tool_choice_value)
        };

        ChatRequest {
            model: self
                .config
                .model
                .clone()
                .unwrap_or_else(|| request.model.clone()),
            messages: system.chain(turns).collect(),
            max_tokens: request.max_tokens,
            tools,
            tool_choice,
        }
    }

    async fn read_response(response: Response) -> Result<CompletionResponse> {
        let status = response.status();
        if status.is_success() {
            let body: ChatResponse = serde_json::from_str(&response.text().await?)?;
            return body.try_into();
        }

        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after_header);
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));

        Err(match status.as_u16() {
            401 | 403 => LlmError::Auth(message),
            429 => LlmError::RateLimit {
                message,
                retry_after,
            },
            500..=599 => LlmError::Network(format!("Server error: {}", message)),
            _ => LlmError::Backend(message),
        })
    }
}

fn tool_choice_value(choice: &ToolChoice) -> serde_json::Value {
    match choice {
        ToolChoice::Auto => serde_json::json!("auto"),
        ToolChoice::Required => serde_json::json!("required"),
        ToolChoice::Tool { name } => serde_json::json!({
            "type": "function",
            "function": { "name": name }
        }),
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.chat_request(&request);
        tracing::debug!(
            backend = %self.config.name,
            model = %body.model,
            tools = body.tools.len(),
            max_tokens = body.max_tokens,
            "Sending chat completion"
        );

        with_retry(
            self.config.max_retries,
            self.config.retry_backoff,
            &self.config.name,
            || async {
                let response = self
                    .authorize(self.client.post(self.completions_url()))
                    .json(&body)
                    .send()
                    .await?;
                Self::read_response(response).await
            },
        )
        .await
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ChatTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ChatFunction,
}

#[derive(Debug, Serialize)]
struct ChatFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    id: String,
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ChatToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ChatToolCall {
    id: String,
    function: ChatFunctionCall,
}

/// Arguments arrive as a JSON document encoded in a string.
#[derive(Debug, Deserialize)]
struct ChatFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl TryFrom<ChatResponse> for CompletionResponse {
    type Error = LlmError;

    fn try_from(response: ChatResponse) -> Result<Self> {
        let Some(choice) = response.choices.into_iter().next() else {
            return Err(LlmError::UnexpectedResponse(
                "response has no choices".to_string(),
            ));
        };

        let mut content = Vec::new();
        if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
            content.push(ContentBlock::text(text));
        }
        for call in choice.message.tool_calls.unwrap_or_default() {
            let input = serde_json::from_str(&call.function.arguments).map_err(|e| {
                LlmError::UnexpectedResponse(format!(
                    "tool call '{}' has malformed arguments: {}",
                    call.function.name, e
                ))
            })?;
            content.push(ContentBlock::tool_call(call.id, call.function.name, input));
        }

        let stop_reason = match choice.finish_reason.as_deref() {
            Some("tool_calls") => StopReason::ToolCall,
            Some("length") => StopReason::MaxTokens,
            _ => StopReason::EndTurn,
        };
        let usage = response
            .usage
            .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse::new(
            response.id,
            response.model,
            content,
            stop_reason,
            usage,
        ))
    }
}
