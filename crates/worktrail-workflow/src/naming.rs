//! Naming finished workflow documents.

use chrono::{DateTime, TimeZone};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use worktrail_llm::{
    CompletionRequest, LlmBackend, LlmError, Message, ToolChoice, ToolDefinition,
};

use crate::Result;
use crate::cancel::complete_or_cancel;
use crate::prompts::NAMING_SYSTEM_PROMPT;

/// Tool the model calls to report the chosen name.
pub const NAME_TOOL: &str = "name_workflow";

fn name_tool() -> ToolDefinition {
    ToolDefinition::new(
        NAME_TOOL,
        "Report the file name for the workflow document",
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Short descriptive file name, without extension"
                }
            },
            "required": ["name"]
        }),
    )
}

/// Ask the model to name a workflow from its summary.
///
/// The name comes back through a forced tool call. A response without the
/// tool call, or with a blank name, is an error; callers decide on a
/// fallback. Cancelling `cancel` abandons the request.
pub async fn name_workflow(
    backend: &dyn LlmBackend,
    model: &str,
    max_tokens: u32,
    summary: &str,
    cancel: &CancellationToken,
) -> Result<String> {
    let request = CompletionRequest::new(
        model,
        vec![Message::user(format!(
            "Workflow summary:\n\n{}\n\nName this workflow.",
            summary.trim()
        ))],
        max_tokens,
    )
    .with_system(NAMING_SYSTEM_PROMPT)
    .with_tools(vec![name_tool()])
    .with_tool_choice(ToolChoice::Tool {
        name: NAME_TOOL.to_string(),
    });

    let response = complete_or_cancel(backend, request, cancel).await?;
    let name = response
        .tool_input(NAME_TOOL)
        .and_then(|input| input.get("name"))
        .and_then(|name| name.as_str())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            LlmError::UnexpectedResponse(format!("{} tool call missing a name", NAME_TOOL))
        })?;

    debug!(name, "Model named workflow");
    Ok(name.to_string())
}

/// Timestamp-based name used when the model cannot name a workflow.
pub fn fallback_name<Tz>(now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("workflow-{}", now.format("%Y-%m-%d-%H%M%S"))
}
