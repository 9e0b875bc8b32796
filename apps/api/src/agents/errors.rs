use thiserror::Error;

use crate::llm::LlmError;
use crate::tools::ToolError;

/// Errors that can occur in the agent pipeline
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Recursion limit of {limit} steps reached without hitting END")]
    RecursionLimitExceeded { limit: usize },

    #[error("Tool node cannot route back to unknown sender: {0}")]
    UnknownSender(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
