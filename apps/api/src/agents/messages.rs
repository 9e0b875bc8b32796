// Pipeline message types
//
// Every node in the workflow speaks in terms of `Message`. Whatever a model
// backend returns is folded into one of these variants before it touches the
// pipeline state.

use serde::{Deserialize, Serialize};

/// A structured request from an agent to run an external action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Backend-assigned identifier, echoed back by the matching tool result
    pub id: String,
    /// Action name as presented to the model
    pub name: String,
    /// Arguments as produced by the model (a JSON object)
    pub args: serde_json::Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }
}

/// A single entry in the pipeline transcript
///
/// # Variants
/// - `Human` - instruction text (the initial task, or a placeholder turn)
/// - `Ai` - agent-authored response, possibly carrying pending tool calls
/// - `Tool` - result of exactly one prior tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    Human {
        content: String,
    },
    Ai {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Tool {
        tool_call_id: String,
        name: String,
        content: String,
    },
}

impl Message {
    pub fn human(content: impl Into<String>) -> Self {
        Message::Human {
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Message::Ai {
            content: content.into(),
            tool_calls: Vec::new(),
            name: None,
        }
    }

    pub fn ai_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Ai {
            content: content.into(),
            tool_calls,
            name: None,
        }
    }

    pub fn tool(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Message::Tool {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            content: content.into(),
        }
    }

    /// Text content regardless of role
    pub fn content(&self) -> &str {
        match self {
            Message::Human { content } | Message::Ai { content, .. } | Message::Tool { content, .. } => {
                content
            }
        }
    }

    /// Pending tool calls; always empty for non-agent messages
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Ai { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self, Message::Ai { .. })
    }

    /// Producer name, only set on agent-authored messages
    pub fn name(&self) -> Option<&str> {
        match self {
            Message::Ai { name, .. } => name.as_deref(),
            Message::Tool { name, .. } => Some(name),
            Message::Human { .. } => None,
        }
    }
}
