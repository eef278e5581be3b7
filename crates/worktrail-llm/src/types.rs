//! Provider-neutral request and response shapes.
//!
//! Narration is always a single user turn under a system prompt, so the
//! request model is deliberately flat. Structured answers (a workflow name,
//! a chosen file) come back as tool calls on the response.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

/// One completion round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Tools the model may call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens,
            system: None,
            tools: Vec::new(),
            tool_choice: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    /// Every message body joined by newlines.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────────────────────────────────────

/// A function the model can call, described by a JSON Schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Whether and which tool the model has to call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model may answer in text instead.
    Auto,
    /// The model has to call some tool.
    Required,
    /// The model has to call this tool.
    Tool { name: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

/// A piece of the model's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolCall {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn tool_call(id: impl Into<String>, name: impl Into<String>, input: serde_json::Value) -> Self {
        ContentBlock::ToolCall {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// The model's answer to a [`CompletionRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub model: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<StopReason>,
    pub usage: Usage,
}

impl CompletionResponse {
    pub fn new(
        id: impl Into<String>,
        model: impl Into<String>,
        content: Vec<ContentBlock>,
        stop_reason: StopReason,
        usage: Usage,
    ) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            content,
            stop_reason: Some(stop_reason),
            usage,
        }
    }

    /// All text blocks, concatenated.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::ToolCall { .. } => None,
            })
            .collect()
    }

    /// Arguments of the first call to `tool_name`, if the model made one.
    pub fn tool_input(&self, tool_name: &str) -> Option<&serde_json::Value> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::ToolCall { name, input, .. } if name == tool_name => Some(input),
            _ => None,
        })
    }

    pub fn has_tool_call(&self) -> bool {
        self.content
            .iter()
            .any(|block| matches!(block, ContentBlock::ToolCall { .. }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolCall,
    MaxTokens,
}

/// Token counts reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("gpt-4o-mini", vec![Message::user("Hi")], 256)
            .with_system("Be terse")
            .with_tool_choice(ToolChoice::Tool {
                name: "name_workflow".to_string(),
            });

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.max_tokens, 256);
        assert_eq!(request.system.as_deref(), Some("Be terse"));
        assert!(request.tools.is_empty());
        assert!(matches!(request.tool_choice, Some(ToolChoice::Tool { .. })));
    }

    #[test]
    fn test_transcript() {
        let request = CompletionRequest::new(
            "m",
            vec![Message::user("first"), Message::assistant("second")],
            10,
        );
        assert_eq!(request.transcript(), "first\nsecond");
        assert_eq!(request.messages[1].role, Role::Assistant);
    }

    #[test]
    fn test_text_skips_tool_calls() {
        let response = CompletionResponse::new(
            "msg_1",
            "model",
            vec![
                ContentBlock::text("Choosing "),
                ContentBlock::tool_call("call_1", "choose_file", serde_json::json!({"filePath": "a.md"})),
                ContentBlock::text("now."),
            ],
            StopReason::ToolCall,
            Usage::new(5, 5),
        );

        assert_eq!(response.text(), "Choosing now.");
        assert!(response.has_tool_call());
    }

    #[test]
    fn test_tool_input_by_name() {
        let response = CompletionResponse::new(
            "msg_1",
            "model",
            vec![ContentBlock::tool_call(
                "call_1",
                "choose_file",
                serde_json::json!({"filePath": "a.md"}),
            )],
            StopReason::ToolCall,
            Usage::default(),
        );

        assert_eq!(
            response.tool_input("choose_file").and_then(|v| v["filePath"].as_str()),
            Some("a.md")
        );
        assert!(response.tool_input("name_workflow").is_none());
    }

    #[test]
    fn test_plain_text_has_no_tool_call() {
        let response = CompletionResponse::new(
            "msg_2",
            "model",
            vec![ContentBlock::text("no tools here")],
            StopReason::EndTurn,
            Usage::default(),
        );
        assert!(!response.has_tool_call());
        assert!(response.tool_input("choose_file").is_none());
    }

    #[test]
    fn test_tool_choice_serializes_tagged() {
        let json = serde_json::to_value(ToolChoice::Tool {
            name: "x".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "tool");
        assert_eq!(json["name"], "x");
    }
}
