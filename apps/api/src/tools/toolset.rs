// Toolset shared by the agents of a single run
//
// Wraps an executor with the schema/request processors and with app
// metadata, mirroring how each app expects to be called.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::actions::{Action, App};
use super::processors::{add_thought_to_schema, pop_thought_from_request};
use super::{ActionExecutor, ActionRequest, ToolError};
use crate::domain::ticket::RepoTarget;
use crate::llm::ToolDefinition;

pub struct Toolset {
    executor: Arc<dyn ActionExecutor>,
    code_index_path: Option<PathBuf>,
}

impl Toolset {
    pub fn new(executor: Arc<dyn ActionExecutor>) -> Self {
        Self {
            executor,
            code_index_path: None,
        }
    }

    /// Directory the code-analysis app indexes and queries
    pub fn with_code_index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.code_index_path = Some(path.into());
        self
    }

    /// Tool definitions for the model, each carrying the `thought` field
    pub fn definitions(&self, actions: &[Action]) -> Vec<ToolDefinition> {
        actions
            .iter()
            .map(|action| ToolDefinition {
                name: action.name().to_string(),
                description: action.description().to_string(),
                parameters: add_thought_to_schema(action.parameters()),
            })
            .collect()
    }

    fn metadata_for(&self, action: Action) -> Option<Value> {
        match (action.app(), &self.code_index_path) {
            (App::CodeAnalysis, Some(path)) => {
                Some(json!({"dir_to_index_path": path.to_string_lossy()}))
            }
            _ => None,
        }
    }

    /// Execute an action after stripping the `thought` argument
    pub async fn execute(&self, action: Action, mut params: Value) -> Result<Value, ToolError> {
        if params.is_null() {
            params = json!({});
        }
        if !params.is_object() {
            return Err(ToolError::InvalidArguments {
                action: action.name().to_string(),
                reason: "arguments must be a JSON object".to_string(),
            });
        }

        if let Some(thought) = pop_thought_from_request(&mut params) {
            tracing::debug!(action = %action, thought = %thought, "Executing action");
        } else {
            tracing::debug!(action = %action, "Executing action");
        }

        self.executor
            .execute(ActionRequest {
                action,
                params,
                metadata: self.metadata_for(action),
            })
            .await
    }
}

/// Operations that prepare a repository before a run
#[async_trait]
pub trait RepositorySetup: Send + Sync {
    async fn change_working_directory(&self, path: &Path) -> Result<(), ToolError>;

    async fn clone_repository(&self, repo: &RepoTarget) -> Result<(), ToolError>;

    async fn create_code_map(&self) -> Result<(), ToolError>;
}

#[async_trait]
impl RepositorySetup for Toolset {
    async fn change_working_directory(&self, path: &Path) -> Result<(), ToolError> {
        self.execute(
            Action::FileChangeWorkingDirectory,
            json!({"path": path.to_string_lossy()}),
        )
        .await
        .map(|_| ())
    }

    async fn clone_repository(&self, repo: &RepoTarget) -> Result<(), ToolError> {
        self.execute(Action::FileGitClone, json!({"repo_name": repo.to_string()}))
            .await
            .map(|_| ())
    }

    async fn create_code_map(&self) -> Result<(), ToolError> {
        self.execute(Action::CodeAnalysisCreateCodeMap, json!({}))
            .await
            .map(|_| ())
    }
}
