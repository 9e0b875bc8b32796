// Pipeline runner: repository setup followed by the agent workflow

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::agents::prompts::library;
use crate::agents::{build_workflow, AgentResult, PipelineState, WorkflowConfig};
use crate::config::{Config, ModelBackend};
use crate::domain::ticket::{RepoTarget, Ticket};
use crate::llm::LlmProvider;
use crate::tools::{ActionExecutor, RepositorySetup, ToolError, Toolset};

/// Outcome of a completed enrichment run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub ticket_id: String,
    pub repo: RepoTarget,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: usize,
    pub messages: usize,
}

/// Runs the enrichment pipeline for an accepted ticket
#[async_trait]
pub trait PipelineRunner: Send + Sync {
    async fn run_agent(&self, ticket: &Ticket, repo: &RepoTarget) -> AgentResult<RunReport>;
}

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub workspace_root: PathBuf,
    pub backend: ModelBackend,
    pub recursion_limit: usize,
}

impl RunnerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            workspace_root: config.workspace_root.clone(),
            backend: config.llm.backend,
            recursion_limit: config.recursion_limit,
        }
    }

    /// Local checkout path for a target repository
    pub fn repo_path(&self, repo: &RepoTarget) -> PathBuf {
        self.workspace_root.join(&repo.name)
    }
}

/// Production runner wiring the LLM provider and action executor together
///
/// The executor is one workspace with a single working directory, so runs
/// hold `workspace` from repository setup until the workflow ends.
pub struct EnrichmentRunner {
    llm: Arc<dyn LlmProvider>,
    executor: Arc<dyn ActionExecutor>,
    settings: RunnerSettings,
    workspace: Mutex<()>,
}

impl EnrichmentRunner {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        executor: Arc<dyn ActionExecutor>,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            llm,
            executor,
            settings,
            workspace: Mutex::new(()),
        }
    }
}

#[async_trait]
impl PipelineRunner for EnrichmentRunner {
    async fn run_agent(&self, ticket: &Ticket, repo: &RepoTarget) -> AgentResult<RunReport> {
        let repo_path = self.settings.repo_path(repo);
        let toolset = Arc::new(Toolset::new(self.executor.clone()).with_code_index_path(&repo_path));

        let workflow = build_workflow(
            &WorkflowConfig {
                backend: self.settings.backend,
                recursion_limit: self.settings.recursion_limit,
            },
            self.llm.clone(),
            toolset.clone(),
        );

        if self.workspace.try_lock().is_err() {
            tracing::info!(repo = %repo, "Workspace busy, waiting for the current run");
        }
        let _workspace = self.workspace.lock().await;

        let started_at = Utc::now();
        prepare_repository(toolset.as_ref(), repo, &repo_path).await?;

        let summary = workflow
            .run(PipelineState::new(initial_instruction(ticket, repo)))
            .await?;

        Ok(RunReport {
            ticket_id: ticket.id().to_string(),
            repo: repo.clone(),
            started_at,
            finished_at: Utc::now(),
            steps: summary.steps,
            messages: summary.state.len(),
        })
    }
}

/// Clone the repository and build its code index
///
/// Order matters: the clone lands in the parent directory, and the index is
/// built from inside the checkout.
pub async fn prepare_repository(
    setup: &dyn RepositorySetup,
    repo: &RepoTarget,
    repo_path: &Path,
) -> Result<(), ToolError> {
    let parent = repo_path.parent().unwrap_or(repo_path);

    tracing::info!(repo = %repo, path = %repo_path.display(), "Preparing repository");
    setup.change_working_directory(parent).await?;
    setup.clone_repository(repo).await?;
    setup.change_working_directory(repo_path).await?;
    setup.create_code_map().await?;
    tracing::info!(repo = %repo, "Code index ready");

    Ok(())
}

/// Human instruction that opens the transcript
pub fn initial_instruction(ticket: &Ticket, repo: &RepoTarget) -> String {
    let variables: HashMap<String, String> = [
        ("owner", repo.owner.as_str()),
        ("repo", repo.name.as_str()),
        ("id", ticket.id()),
        ("title", ticket.title()),
        ("description", ticket.description()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    library::initial_instruction().render(&variables)
}
