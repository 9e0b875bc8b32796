//! LLM integration for the enrichment agents.
//!
//! Provides a unified interface over the Anthropic and OpenAI chat APIs,
//! both with tool calling.

mod anthropic;
mod openai;
mod provider;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, ToolDefinition,
};

use std::sync::Arc;

use crate::config::{LlmConfig, ModelBackend};

/// Create an LLM provider for the configured backend.
pub fn create_llm_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match config.backend {
        ModelBackend::Claude => {
            let anthropic = config
                .anthropic
                .as_ref()
                .ok_or_else(|| LlmError::MissingApiKey("anthropic".to_string()))?;
            Ok(Arc::new(AnthropicProvider::new(anthropic.clone())))
        }
        ModelBackend::OpenAi => {
            let openai = config
                .openai
                .as_ref()
                .ok_or_else(|| LlmError::MissingApiKey("openai".to_string()))?;
            Ok(Arc::new(OpenAiProvider::new(openai.clone())))
        }
    }
}
