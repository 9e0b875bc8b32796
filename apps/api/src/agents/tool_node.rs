// Tool node: executes the pending tool calls of the latest agent message
//
// Failures are reported back to the model as tool results instead of
// aborting the run. Tool calls are not retried.

use std::sync::Arc;

use super::messages::{Message, ToolCall};
use super::routing::last_agent_message;
use super::state::{PipelineState, StateDelta};
use crate::tools::{Action, Toolset};

pub struct ToolNode {
    name: String,
    toolset: Arc<Toolset>,
    actions: Vec<Action>,
}

impl ToolNode {
    pub fn new(name: impl Into<String>, toolset: Arc<Toolset>, actions: &[Action]) -> Self {
        Self {
            name: name.into(),
            toolset,
            actions: actions.to_vec(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run every pending call in order, one result message per call
    pub async fn invoke(&self, state: &PipelineState) -> StateDelta {
        let calls = last_agent_message(state.messages())
            .map(|m| m.tool_calls().to_vec())
            .unwrap_or_default();

        let mut results = Vec::with_capacity(calls.len());
        for call in &calls {
            results.push(self.run_call(call).await);
        }

        StateDelta::from_tools(results)
    }

    async fn run_call(&self, call: &ToolCall) -> Message {
        let allowed = Action::from_name(&call.name).filter(|a| self.actions.contains(a));

        let content = match allowed {
            None => {
                let names: Vec<&str> = self.actions.iter().map(Action::name).collect();
                tracing::warn!(node = %self.name, tool = %call.name, "Model requested unavailable tool");
                format!(
                    "Error: {} is not a valid tool, try one of [{}].",
                    call.name,
                    names.join(", ")
                )
            }
            Some(action) => match self.toolset.execute(action, call.args.clone()).await {
                Ok(value) => render_output(value),
                Err(e) => {
                    tracing::warn!(node = %self.name, tool = %call.name, "Tool execution failed: {}", e);
                    format!("Error: {}\n Please fix your mistakes.", e)
                }
            },
        };

        Message::tool(call.id.clone(), call.name.clone(), content)
    }
}

fn render_output(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::actions::{REPO_ANALYZER_ACTIONS, TICKET_COMMENT_ACTIONS};
    use crate::tools::{ActionExecutor, ActionRequest, ToolError};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct StubExecutor;

    #[async_trait]
    impl ActionExecutor for StubExecutor {
        async fn execute(&self, request: ActionRequest) -> Result<Value, ToolError> {
            match request.action {
                Action::FileListFiles => Ok(json!("agent.py\nmain.py")),
                Action::FileOpenFile => Ok(json!({"lines": 100})),
                other => Err(ToolError::Api {
                    action: other.name().to_string(),
                    message: "backend unavailable".to_string(),
                }),
            }
        }
    }

    fn state_with_calls(calls: Vec<ToolCall>) -> PipelineState {
        let mut state = PipelineState::new("task");
        state.apply(StateDelta::from_agent(
            Message::ai_with_tool_calls("", calls),
            "Repo-Analyzer-Agent",
        ));
        state
    }

    fn node(actions: &[Action]) -> ToolNode {
        ToolNode::new(
            "repo_analyzer_tools_node",
            Arc::new(Toolset::new(Arc::new(StubExecutor))),
            actions,
        )
    }

    #[tokio::test]
    async fn answers_every_call_in_order() {
        let state = state_with_calls(vec![
            ToolCall::new("c1", "FILETOOL_LIST_FILES", json!({"thought": "look around"})),
            ToolCall::new("c2", "FILETOOL_OPEN_FILE", json!({"file_path": "agent.py"})),
        ]);

        let delta = node(REPO_ANALYZER_ACTIONS).invoke(&state).await;

        assert!(delta.sender.is_none());
        assert_eq!(delta.messages.len(), 2);
        assert_eq!(
            delta.messages[0],
            Message::tool("c1", "FILETOOL_LIST_FILES", "agent.py\nmain.py")
        );
        assert_eq!(delta.messages[1].content(), "{\"lines\":100}");
    }

    #[tokio::test]
    async fn failures_become_error_results() {
        let state = state_with_calls(vec![ToolCall::new(
            "c1",
            "CODE_ANALYSIS_TOOL_GET_CLASS_INFO",
            json!({"class_name": "X"}),
        )]);

        let delta = node(REPO_ANALYZER_ACTIONS).invoke(&state).await;

        assert!(delta.messages[0].content().starts_with("Error:"));
        assert!(delta.messages[0].content().contains("backend unavailable"));
    }

    #[tokio::test]
    async fn rejects_tools_outside_the_phase() {
        let state = state_with_calls(vec![ToolCall::new("c1", "FILETOOL_LIST_FILES", json!({}))]);

        let delta = node(TICKET_COMMENT_ACTIONS).invoke(&state).await;

        let content = delta.messages[0].content();
        assert!(content.contains("is not a valid tool"));
        assert!(content.contains("LINEAR_CREATE_LINEAR_COMMENT"));
    }
}
