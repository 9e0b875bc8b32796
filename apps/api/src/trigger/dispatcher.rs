// Dispatches accepted tickets to the pipeline runner

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use super::filter::{EventFilter, ProjectRegistry, SkipReason};
use super::runner::PipelineRunner;
use crate::domain::ticket::{RepoTarget, Ticket, TriggerEvent};

/// Result of screening a trigger event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Accepted { ticket: Ticket, repo: RepoTarget },
    Skipped(SkipReason),
}

impl DispatchOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DispatchOutcome::Accepted { .. })
    }
}

pub struct TicketDispatcher {
    filter: EventFilter,
    runner: Arc<dyn PipelineRunner>,
}

impl TicketDispatcher {
    pub fn new(projects: ProjectRegistry, runner: Arc<dyn PipelineRunner>) -> Self {
        Self {
            filter: EventFilter::new(projects),
            runner,
        }
    }

    /// Decide whether an event starts a run. Skips are logged once, with the issue number.
    pub fn screen(&self, event: &TriggerEvent) -> DispatchOutcome {
        match self.filter.evaluate(event) {
            Ok((ticket, repo)) => {
                tracing::info!(
                    ticket_id = %ticket.id(),
                    issue = ?ticket.number(),
                    repo = %repo,
                    "Accepted ticket"
                );
                DispatchOutcome::Accepted { ticket, repo }
            }
            Err(reason) => {
                tracing::warn!("Skipping event: {}", reason);
                DispatchOutcome::Skipped(reason)
            }
        }
    }

    /// Run the pipeline for one ticket. Failures are logged, never returned.
    pub async fn execute(&self, ticket: Ticket, repo: RepoTarget) {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("enrichment_run", %run_id, ticket_id = %ticket.id());

        async {
            match self.runner.run_agent(&ticket, &repo).await {
                Ok(report) => tracing::info!(
                    steps = report.steps,
                    messages = report.messages,
                    elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
                    "Enrichment run finished"
                ),
                Err(e) => tracing::error!("Enrichment run failed: {:?}", e),
            }
        }
        .instrument(span)
        .await
    }

    /// Screen an event and, if accepted, run it to completion
    pub async fn handle(&self, event: &TriggerEvent) -> DispatchOutcome {
        let outcome = self.screen(event);
        if let DispatchOutcome::Accepted { ticket, repo } = &outcome {
            self.execute(ticket.clone(), repo.clone()).await;
        }
        outcome
    }

    /// Run a ticket in the background
    pub fn spawn(self: &Arc<Self>, ticket: Ticket, repo: RepoTarget) {
        let dispatcher = Arc::clone(self);
        let ticket_id = ticket.id().to_string();

        let run = tokio::spawn(async move { dispatcher.execute(ticket, repo).await });
        tokio::spawn(async move {
            if let Err(e) = run.await {
                tracing::error!(ticket_id = %ticket_id, "Enrichment task aborted: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentError, AgentResult};
    use crate::trigger::RunReport;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRunner {
        runs: Mutex<Vec<(String, RepoTarget)>>,
        fail: bool,
    }

    #[async_trait]
    impl PipelineRunner for RecordingRunner {
        async fn run_agent(&self, ticket: &Ticket, repo: &RepoTarget) -> AgentResult<RunReport> {
            self.runs
                .lock()
                .unwrap()
                .push((ticket.id().to_string(), repo.clone()));
            if self.fail {
                return Err(AgentError::RecursionLimitExceeded { limit: 3 });
            }
            let now = Utc::now();
            Ok(RunReport {
                ticket_id: ticket.id().to_string(),
                repo: repo.clone(),
                started_at: now,
                finished_at: now,
                steps: 7,
                messages: 8,
            })
        }
    }

    fn event(action: &str, project: &str) -> TriggerEvent {
        TriggerEvent::from_json(json!({
            "action": action,
            "data": {
                "id": "T-1",
                "title": "Bug X",
                "description": "desc",
                "number": 7,
                "project": {"name": project}
            }
        }))
        .unwrap()
    }

    fn dispatcher(runner: Arc<RecordingRunner>) -> TicketDispatcher {
        TicketDispatcher::new(ProjectRegistry::default(), runner)
    }

    #[tokio::test]
    async fn accepted_ticket_runs_against_mapped_repo() {
        let runner = Arc::new(RecordingRunner::default());
        let dispatcher = dispatcher(runner.clone());

        let outcome = dispatcher.handle(&event("create", "Python SDK")).await;

        assert!(outcome.is_accepted());
        assert_eq!(
            *runner.runs.lock().unwrap(),
            vec![("T-1".to_string(), RepoTarget::new("ComposioHQ", "composio"))]
        );
    }

    #[tokio::test]
    async fn skipped_events_never_reach_runner() {
        let runner = Arc::new(RecordingRunner::default());
        let dispatcher = dispatcher(runner.clone());

        let unknown = dispatcher.handle(&event("create", "Unknown Project")).await;
        let update = dispatcher.handle(&event("update", "Python SDK")).await;

        assert!(matches!(
            unknown,
            DispatchOutcome::Skipped(SkipReason::UnknownProject { .. })
        ));
        assert!(matches!(
            update,
            DispatchOutcome::Skipped(SkipReason::NotCreate { .. })
        ));
        assert!(runner.runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn runner_failure_is_swallowed() {
        let runner = Arc::new(RecordingRunner {
            fail: true,
            ..Default::default()
        });
        let dispatcher = dispatcher(runner.clone());

        let outcome = dispatcher.handle(&event("create", "Python SDK")).await;

        assert!(outcome.is_accepted());
        assert_eq!(runner.runs.lock().unwrap().len(), 1);
    }
}
