// Pipeline state threaded through the workflow graph
//
// The transcript is append-only: nodes return a `StateDelta` and only
// `PipelineState::apply` grows the message list.

use super::messages::Message;

/// Accumulated transcript for a single enrichment run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineState {
    messages: Vec<Message>,
    sender: Option<String>,
}

/// Output of a single node execution
#[derive(Debug, Clone, PartialEq)]
pub struct StateDelta {
    pub messages: Vec<Message>,
    /// Set by agent nodes; tool nodes leave ownership with the calling agent
    pub sender: Option<String>,
}

impl StateDelta {
    /// Delta produced by an agent node: one message and its producer
    pub fn from_agent(message: Message, sender: impl Into<String>) -> Self {
        Self {
            messages: vec![message],
            sender: Some(sender.into()),
        }
    }

    /// Delta produced by a tool node
    pub fn from_tools(messages: Vec<Message>) -> Self {
        Self {
            messages,
            sender: None,
        }
    }
}

impl PipelineState {
    /// Start a run from a single human instruction
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::human(instruction)],
            sender: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Name of the agent that currently owns the state
    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a node's output
    pub fn apply(&mut self, delta: StateDelta) {
        self.messages.extend(delta.messages);
        if let Some(sender) = delta.sender {
            self.sender = Some(sender);
        }
    }
}
