//! End-to-end pipeline tests
//!
//! Drives `EnrichmentRunner` with a scripted LLM provider and a recording
//! action executor, covering:
//! - Repository setup ordering
//! - The opening instruction
//! - Both agent phases through to the posted comment
//! - Concurrent runs sharing one workspace

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use ticket_enricher::agents::{AgentError, Message, ToolCall};
use ticket_enricher::config::ModelBackend;
use ticket_enricher::domain::ticket::{RepoTarget, Ticket};
use ticket_enricher::llm::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider,
};
use ticket_enricher::tools::{ActionExecutor, ActionRequest, ToolError};
use ticket_enricher::trigger::{EnrichmentRunner, PipelineRunner, RunnerSettings};

/// Answers from one script per agent, chosen by the tools offered
#[derive(Default)]
struct ScriptedProvider {
    analyzer_turns: Mutex<usize>,
    commenter_turns: Mutex<usize>,
    requests: Mutex<Vec<CompletionRequest>>,
}

fn reply(content: &str, tool_calls: Vec<ToolCall>) -> CompletionResponse {
    let finish_reason = if tool_calls.is_empty() {
        FinishReason::Stop
    } else {
        FinishReason::ToolUse
    };
    CompletionResponse {
        content: content.to_string(),
        tool_calls,
        input_tokens: 10,
        output_tokens: 5,
        finish_reason,
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let is_commenter = request
            .tools
            .iter()
            .any(|t| t.name == "LINEAR_CREATE_LINEAR_COMMENT");
        self.requests.lock().unwrap().push(request);

        if is_commenter {
            let mut turns = self.commenter_turns.lock().unwrap();
            *turns += 1;
            return Ok(match *turns {
                1 => reply(
                    "",
                    vec![ToolCall::new(
                        "c1",
                        "LINEAR_CREATE_LINEAR_COMMENT",
                        json!({
                            "issue_id": "T-1",
                            "body": "Start with `composio/tools/toolset.py`.",
                            "thought": "post the summary"
                        }),
                    )],
                ),
                _ => reply("REVIEW COMPLETED", vec![]),
            });
        }

        let mut turns = self.analyzer_turns.lock().unwrap();
        *turns += 1;
        Ok(match *turns {
            1 => reply(
                "Looking around first.",
                vec![ToolCall::new(
                    "a1",
                    "CODE_ANALYSIS_TOOL_GET_RELEVANT_CODE",
                    json!({"question": "toolset", "thought": "find the toolset"}),
                )],
            ),
            _ => reply("ANALYSIS COMPLETED\n- composio/tools/toolset.py", vec![]),
        })
    }
}

#[derive(Default)]
struct RecordingExecutor {
    requests: Mutex<Vec<(String, Value, Option<Value>)>>,
    fail_on: Option<&'static str>,
}

#[async_trait]
impl ActionExecutor for RecordingExecutor {
    async fn execute(&self, request: ActionRequest) -> Result<Value, ToolError> {
        let name = request.action.name().to_string();
        self.requests
            .lock()
            .unwrap()
            .push((name.clone(), request.params, request.metadata));

        if self.fail_on == Some(name.as_str()) {
            return Err(ToolError::Api {
                action: name,
                message: "repository not found".to_string(),
            });
        }
        Ok(json!({"success": true}))
    }
}

fn settings() -> RunnerSettings {
    RunnerSettings {
        workspace_root: PathBuf::from("/home/user"),
        backend: ModelBackend::Claude,
        recursion_limit: 50,
    }
}

fn ticket() -> Ticket {
    Ticket::new("T-1", "Bug X", "desc", Some(7), "Python SDK").unwrap()
}

fn repo() -> RepoTarget {
    RepoTarget::new("ComposioHQ", "composio")
}

#[tokio::test]
async fn test_full_enrichment_run() {
    let provider = Arc::new(ScriptedProvider::default());
    let executor = Arc::new(RecordingExecutor::default());
    let runner = EnrichmentRunner::new(provider.clone(), executor.clone(), settings());

    let report = runner.run_agent(&ticket(), &repo()).await.unwrap();

    // analyzer, tools, analyzer, commenter, tools, commenter
    assert_eq!(report.steps, 6);
    // instruction + 2 analyzer + 1 tool + 2 commenter + 1 tool
    assert_eq!(report.messages, 7);
    assert_eq!(report.ticket_id, "T-1");
    assert!(report.finished_at >= report.started_at);

    let requests = executor.requests.lock().unwrap();
    let names: Vec<&str> = requests.iter().map(|(n, _, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "FILETOOL_CHANGE_WORKING_DIRECTORY",
            "FILETOOL_GIT_CLONE",
            "FILETOOL_CHANGE_WORKING_DIRECTORY",
            "CODE_ANALYSIS_TOOL_CREATE_CODE_MAP",
            "CODE_ANALYSIS_TOOL_GET_RELEVANT_CODE",
            "LINEAR_CREATE_LINEAR_COMMENT",
        ]
    );

    assert_eq!(requests[0].1, json!({"path": "/home/user"}));
    assert_eq!(requests[1].1, json!({"repo_name": "ComposioHQ/composio"}));
    assert_eq!(requests[2].1, json!({"path": "/home/user/composio"}));

    // Thought never reaches the executor; code analysis carries the index path
    assert_eq!(requests[4].1, json!({"question": "toolset"}));
    assert_eq!(
        requests[4].2,
        Some(json!({"dir_to_index_path": "/home/user/composio"}))
    );
    assert_eq!(requests[5].1["issue_id"], "T-1");
    assert!(requests[5].1.get("thought").is_none());
}

#[tokio::test]
async fn test_instruction_reaches_first_agent() {
    let provider = Arc::new(ScriptedProvider::default());
    let executor = Arc::new(RecordingExecutor::default());
    let runner = EnrichmentRunner::new(provider.clone(), executor, settings());

    runner.run_agent(&ticket(), &repo()).await.unwrap();

    let requests = provider.requests.lock().unwrap();
    let first = &requests[0];
    assert_eq!(first.messages.len(), 1);
    let instruction = first.messages[0].content();
    assert!(instruction.contains("ComposioHQ/composio"));
    assert!(instruction.contains("id `T-1`, title `Bug X` and description `desc`"));
    assert!(first.system.as_deref().unwrap_or_default().contains("ANALYSIS COMPLETED"));

    // The commenter sees the whole analysis transcript
    let commenter_first = requests
        .iter()
        .find(|r| r.tools.iter().any(|t| t.name == "LINEAR_CREATE_LINEAR_COMMENT"))
        .unwrap();
    assert!(commenter_first
        .messages
        .iter()
        .any(|m| m.content().contains("composio/tools/toolset.py")));
}

#[tokio::test]
async fn test_setup_failure_aborts_before_agents() {
    let provider = Arc::new(ScriptedProvider::default());
    let executor = Arc::new(RecordingExecutor {
        fail_on: Some("FILETOOL_GIT_CLONE"),
        ..Default::default()
    });
    let runner = EnrichmentRunner::new(provider.clone(), executor.clone(), settings());

    let err = runner.run_agent(&ticket(), &repo()).await.unwrap_err();

    assert!(matches!(err, AgentError::Tool(_)));
    assert!(provider.requests.lock().unwrap().is_empty());
    assert_eq!(executor.requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_recursion_limit_stops_run() {
    let provider = Arc::new(ScriptedProvider::default());
    let executor = Arc::new(RecordingExecutor::default());
    let runner = EnrichmentRunner::new(
        provider,
        executor,
        RunnerSettings {
            recursion_limit: 3,
            ..settings()
        },
    );

    let err = runner.run_agent(&ticket(), &repo()).await.unwrap_err();

    assert!(matches!(err, AgentError::RecursionLimitExceeded { limit: 3 }));
}

/// Decides each reply from the transcript alone, so any number of runs can share it
struct TranscriptProvider;

#[async_trait]
impl LlmProvider for TranscriptProvider {
    fn model_name(&self) -> &str {
        "transcript"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tokio::task::yield_now().await;

        let answered = |tool: &str| {
            request
                .messages
                .iter()
                .any(|m| matches!(m, Message::Tool { name, .. } if name == tool))
        };
        let is_commenter = request
            .tools
            .iter()
            .any(|t| t.name == "LINEAR_CREATE_LINEAR_COMMENT");

        Ok(match (is_commenter, is_commenter && answered("LINEAR_CREATE_LINEAR_COMMENT")) {
            (true, true) => reply("REVIEW COMPLETED", vec![]),
            (true, false) => reply(
                "",
                vec![ToolCall::new(
                    "c1",
                    "LINEAR_CREATE_LINEAR_COMMENT",
                    json!({"issue_id": "T", "body": "see listing", "thought": "post"}),
                )],
            ),
            (false, _) if answered("FILETOOL_LIST_FILES") => reply("ANALYSIS COMPLETED", vec![]),
            (false, _) => reply(
                "",
                vec![ToolCall::new(
                    "a1",
                    "FILETOOL_LIST_FILES",
                    json!({"thought": "look around"}),
                )],
            ),
        })
    }
}

/// One working directory shared by every caller, like a remote workspace
#[derive(Default)]
struct WorkspaceExecutor {
    cwd: Mutex<String>,
    listed_from: Mutex<Vec<String>>,
}

#[async_trait]
impl ActionExecutor for WorkspaceExecutor {
    async fn execute(&self, request: ActionRequest) -> Result<Value, ToolError> {
        tokio::task::yield_now().await;

        match request.action.name() {
            "FILETOOL_CHANGE_WORKING_DIRECTORY" => {
                *self.cwd.lock().unwrap() = request.params["path"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
            }
            "FILETOOL_LIST_FILES" => {
                let cwd = self.cwd.lock().unwrap().clone();
                self.listed_from.lock().unwrap().push(cwd);
            }
            _ => {}
        }
        Ok(json!({"success": true}))
    }
}

#[tokio::test]
async fn test_concurrent_runs_each_see_their_own_checkout() {
    let executor = Arc::new(WorkspaceExecutor::default());
    let runner = EnrichmentRunner::new(Arc::new(TranscriptProvider), executor.clone(), settings());

    let python = ticket();
    let js = Ticket::new("T-2", "Bug Y", "desc", Some(8), "JS SDK").unwrap();
    let js_repo = RepoTarget::new("ComposioHQ", "composio-js");
    let python_repo = repo();

    let (first, second) = tokio::join!(
        runner.run_agent(&python, &python_repo),
        runner.run_agent(&js, &js_repo)
    );
    first.unwrap();
    second.unwrap();

    let mut listed_from = executor.listed_from.lock().unwrap().clone();
    listed_from.sort();
    assert_eq!(
        listed_from,
        vec!["/home/user/composio", "/home/user/composio-js"]
    );
}
