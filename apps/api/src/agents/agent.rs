// Prompt + tools + model, bound into a callable agent

use std::sync::Arc;

use async_trait::async_trait;

use super::errors::AgentResult;
use super::messages::Message;
use crate::llm::{CompletionRequest, LlmProvider, ToolDefinition};

/// Anything that turns a transcript into the next message
///
/// Implementations are stateless between calls; all context arrives in
/// `messages`.
#[async_trait]
pub trait ChatAgent: Send + Sync {
    async fn invoke(&self, messages: &[Message]) -> AgentResult<Message>;
}

/// Agent backed by an LLM provider with a fixed system prompt and tool set
pub struct LlmAgent {
    system_prompt: String,
    tools: Vec<ToolDefinition>,
    llm: Arc<dyn LlmProvider>,
}

impl LlmAgent {
    pub fn new(
        system_prompt: impl Into<String>,
        tools: Vec<ToolDefinition>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            tools,
            llm,
        }
    }
}

#[async_trait]
impl ChatAgent for LlmAgent {
    async fn invoke(&self, messages: &[Message]) -> AgentResult<Message> {
        let request = CompletionRequest {
            system: Some(self.system_prompt.clone()),
            messages: messages.to_vec(),
            tools: self.tools.clone(),
        };

        let response = self.llm.complete(request).await?;
        Ok(response.into_message())
    }
}
