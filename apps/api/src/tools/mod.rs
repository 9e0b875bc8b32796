//! External actions available to the agents.
//!
//! The agents never talk to a collaborator directly: tool calls are resolved
//! to an [`Action`], passed through the request processors, and handed to an
//! [`ActionExecutor`].

pub mod actions;
pub mod composio;
pub mod processors;
pub mod toolset;

pub use actions::{Action, App};
pub use composio::ComposioClient;
pub use toolset::{RepositorySetup, Toolset};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("action {action} failed: {message}")]
    Api { action: String, message: String },

    #[error("invalid arguments for {action}: {reason}")]
    InvalidArguments { action: String, reason: String },
}

/// A fully processed request, ready for execution
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub action: Action,
    pub params: serde_json::Value,
    /// Per-app metadata attached by the toolset (e.g. the index path)
    pub metadata: Option<serde_json::Value>,
}

/// Backend that actually performs actions
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, request: ActionRequest) -> Result<serde_json::Value, ToolError>;
}
