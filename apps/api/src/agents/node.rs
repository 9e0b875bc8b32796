// Agent node: wraps an agent so it can run inside the workflow graph
//
// A node never fails. Exhausted retries degrade to a fixed apology message
// so a flaky backend cannot crash the pipeline.

use std::borrow::Cow;
use std::sync::Arc;

use super::agent::ChatAgent;
use super::messages::Message;
use super::retry::RetryPolicy;
use super::state::{PipelineState, StateDelta};

pub const APOLOGY_MESSAGE: &str = "I apologize, but I encountered an error and couldn't complete \
                                   the task. Please try again or rephrase your request.";

pub const PLACEHOLDER_MESSAGE: &str = "Placeholder message";

pub struct AgentNode {
    name: String,
    agent: Arc<dyn ChatAgent>,
    retry: RetryPolicy,
    requires_alternation: bool,
}

impl AgentNode {
    /// `requires_alternation` comes from the configured backend; see
    /// `ModelBackend::requires_alternation`.
    pub fn new(name: impl Into<String>, agent: Arc<dyn ChatAgent>, requires_alternation: bool) -> Self {
        Self {
            name: name.into(),
            agent,
            retry: RetryPolicy::default(),
            requires_alternation,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the agent once and return exactly one new message
    pub async fn invoke(&self, state: &PipelineState) -> StateDelta {
        let view = self.model_view(state);
        let agent = &self.agent;
        let messages: &[Message] = &view;

        let message = match self.retry.invoke(move || agent.invoke(messages)).await {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(
                    agent = %self.name,
                    attempts = self.retry.max_attempts,
                    "Failed to invoke agent after retries: {}",
                    e
                );
                Message::ai(APOLOGY_MESSAGE)
            }
        };

        StateDelta::from_agent(self.normalize(message), self.name.clone())
    }

    /// Transcript as the model sees it
    ///
    /// Some backends reject two consecutive assistant turns; for those a
    /// placeholder human turn is appended. The pipeline state itself is
    /// left untouched.
    fn model_view<'a>(&self, state: &'a PipelineState) -> Cow<'a, [Message]> {
        let ends_with_ai = state.last().map(Message::is_ai).unwrap_or(false);
        if self.requires_alternation && ends_with_ai {
            let mut messages = state.messages().to_vec();
            messages.push(Message::human(PLACEHOLDER_MESSAGE));
            Cow::Owned(messages)
        } else {
            Cow::Borrowed(state.messages())
        }
    }

    /// Canonicalise the agent's output into a message owned by this node
    fn normalize(&self, message: Message) -> Message {
        match message {
            Message::Tool { .. } => message,
            Message::Ai {
                content,
                tool_calls,
                ..
            } => Message::Ai {
                content,
                tool_calls,
                name: Some(self.name.clone()),
            },
            Message::Human { content } => Message::Ai {
                content,
                tool_calls: Vec::new(),
                name: Some(self.name.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::errors::{AgentError, AgentResult};
    use crate::agents::messages::ToolCall;
    use crate::llm::LlmError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Fails a fixed number of times, then replies
    struct FlakyAgent {
        failures: usize,
        calls: AtomicUsize,
        reply: Message,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl FlakyAgent {
        fn new(failures: usize, reply: Message) -> Self {
            Self {
                failures,
                calls: AtomicUsize::new(0),
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatAgent for FlakyAgent {
        async fn invoke(&self, messages: &[Message]) -> AgentResult<Message> {
            self.seen.lock().unwrap().push(messages.to_vec());
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(AgentError::Llm(LlmError::RateLimited {
                    provider: "flaky".to_string(),
                    retry_after: Some(n as u64),
                }))
            } else {
                Ok(self.reply.clone())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_from_transient_failures() {
        for failures in 0..=2 {
            let agent = Arc::new(FlakyAgent::new(failures, Message::ai("found it")));
            let node = AgentNode::new("Repo-Analyzer-Agent", agent.clone(), false);

            let delta = node.invoke(&PipelineState::new("task")).await;

            assert_eq!(agent.calls.load(Ordering::SeqCst), failures + 1);
            assert_eq!(delta.messages.len(), 1);
            assert_eq!(delta.messages[0].content(), "found it");
            assert_eq!(delta.sender.as_deref(), Some("Repo-Analyzer-Agent"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_yield_apology() {
        let agent = Arc::new(FlakyAgent::new(usize::MAX, Message::ai("never")));
        let node = AgentNode::new("Comment-On-Ticket-Agent", agent.clone(), false);

        let delta = node.invoke(&PipelineState::new("task")).await;

        assert_eq!(agent.calls.load(Ordering::SeqCst), 3);
        assert_eq!(delta.messages.len(), 1);
        assert_eq!(delta.messages[0].content(), APOLOGY_MESSAGE);
        assert_eq!(delta.messages[0].name(), Some("Comment-On-Ticket-Agent"));
        assert_eq!(delta.sender.as_deref(), Some("Comment-On-Ticket-Agent"));
    }

    #[tokio::test]
    async fn placeholder_inserted_only_when_backend_requires_it() {
        let mut state = PipelineState::new("task");
        state.apply(StateDelta::from_agent(Message::ai("ANALYSIS COMPLETED"), "Repo-Analyzer-Agent"));

        let agent = Arc::new(FlakyAgent::new(0, Message::ai("ok")));
        AgentNode::new("Comment-On-Ticket-Agent", agent.clone(), true)
            .invoke(&state)
            .await;
        let seen = agent.seen.lock().unwrap()[0].clone();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2], Message::human(PLACEHOLDER_MESSAGE));
        assert_eq!(state.len(), 2);

        let agent = Arc::new(FlakyAgent::new(0, Message::ai("ok")));
        AgentNode::new("Comment-On-Ticket-Agent", agent.clone(), false)
            .invoke(&state)
            .await;
        assert_eq!(agent.seen.lock().unwrap()[0].len(), 2);
    }

    #[tokio::test]
    async fn no_placeholder_after_tool_result() {
        let mut state = PipelineState::new("task");
        state.apply(StateDelta::from_tools(vec![Message::tool("1", "FILETOOL_LIST_FILES", "a.py")]));

        let agent = Arc::new(FlakyAgent::new(0, Message::ai("ok")));
        AgentNode::new("Repo-Analyzer-Agent", agent.clone(), true)
            .invoke(&state)
            .await;

        assert_eq!(agent.seen.lock().unwrap()[0].len(), 2);
    }

    #[tokio::test]
    async fn normalization_renames_and_keeps_tool_calls() {
        let mut reply = Message::ai_with_tool_calls(
            "opening",
            vec![ToolCall::new("c1", "FILETOOL_OPEN_FILE", json!({"file_path": "a.py"}))],
        );
        if let Message::Ai { name, .. } = &mut reply {
            *name = Some("someone-else".to_string());
        }

        let node = AgentNode::new(
            "Repo-Analyzer-Agent",
            Arc::new(FlakyAgent::new(0, reply)),
            false,
        );
        let delta = node.invoke(&PipelineState::new("task")).await;

        let msg = &delta.messages[0];
        assert_eq!(msg.name(), Some("Repo-Analyzer-Agent"));
        assert_eq!(msg.tool_calls().len(), 1);
    }

    #[tokio::test]
    async fn tool_results_pass_through_unchanged() {
        let reply = Message::tool("c1", "FILETOOL_LIST_FILES", "a.py");
        let node = AgentNode::new(
            "Repo-Analyzer-Agent",
            Arc::new(FlakyAgent::new(0, reply.clone())),
            false,
        );

        let delta = node.invoke(&PipelineState::new("task")).await;

        assert_eq!(delta.messages[0], reply);
    }

    #[tokio::test]
    async fn human_replies_become_agent_messages() {
        let node = AgentNode::new(
            "Repo-Analyzer-Agent",
            Arc::new(FlakyAgent::new(0, Message::human("odd"))),
            false,
        );

        let delta = node.invoke(&PipelineState::new("task")).await;

        assert!(delta.messages[0].is_ai());
        assert_eq!(delta.messages[0].content(), "odd");
    }
}
