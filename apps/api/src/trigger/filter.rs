use std::collections::BTreeMap;

use crate::domain::ticket::{IssueAction, RepoTarget, Ticket, TriggerEvent};

/// Allow-list mapping tracker project names to repositories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRegistry {
    projects: BTreeMap<String, RepoTarget>,
}

impl Default for ProjectRegistry {
    fn default() -> Self {
        let mut projects = BTreeMap::new();
        projects.insert(
            "Python SDK".to_string(),
            RepoTarget::new("ComposioHQ", "composio"),
        );
        Self { projects }
    }
}

impl ProjectRegistry {
    pub fn empty() -> Self {
        Self {
            projects: BTreeMap::new(),
        }
    }

    pub fn with_project(mut self, project: impl Into<String>, repo: RepoTarget) -> Self {
        self.projects.insert(project.into(), repo);
        self
    }

    /// Parse `Project Name=owner/name;Other=owner/name`
    pub fn parse(value: &str) -> Result<Self, String> {
        let mut registry = Self::empty();

        for entry in value.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (project, repo) = entry
                .split_once('=')
                .ok_or_else(|| format!("expected 'Project=owner/name', got '{}'", entry))?;
            let project = project.trim();
            if project.is_empty() {
                return Err(format!("empty project name in '{}'", entry));
            }
            registry = registry.with_project(project, repo.parse()?);
        }

        if registry.projects.is_empty() {
            return Err("no projects configured".to_string());
        }
        Ok(registry)
    }

    /// Exact, case-sensitive lookup
    pub fn resolve(&self, project: &str) -> Option<&RepoTarget> {
        self.projects.get(project)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Why an event did not start a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    OtherTrigger { trigger_name: String },
    NotCreate { action: IssueAction, number: Option<i64> },
    MissingProject { number: Option<i64> },
    UnknownProject { project: String, number: Option<i64> },
    InvalidTicket { reason: String, number: Option<i64> },
}

fn issue_label(number: Option<i64>) -> String {
    number.map_or_else(|| "issue <unknown>".to_string(), |n| format!("issue {}", n))
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::OtherTrigger { trigger_name } => {
                write!(f, "trigger {} is not handled", trigger_name)
            }
            SkipReason::NotCreate { action, number } => write!(
                f,
                "{} has action '{}', only 'create' is handled",
                issue_label(*number),
                action
            ),
            SkipReason::MissingProject { number } => {
                write!(f, "{} has no project", issue_label(*number))
            }
            SkipReason::UnknownProject { project, number } => write!(
                f,
                "{} is in project '{}', which is not allow-listed",
                issue_label(*number),
                project
            ),
            SkipReason::InvalidTicket { reason, number } => {
                write!(f, "{} is invalid: {}", issue_label(*number), reason)
            }
        }
    }
}

/// Pure screening of trigger events
#[derive(Debug, Clone)]
pub struct EventFilter {
    projects: ProjectRegistry,
}

impl EventFilter {
    pub fn new(projects: ProjectRegistry) -> Self {
        Self { projects }
    }

    /// Accept an event as a ticket plus target repository, or say why not
    pub fn evaluate(&self, event: &TriggerEvent) -> Result<(Ticket, RepoTarget), SkipReason> {
        if !event.is_issue_created() {
            return Err(SkipReason::OtherTrigger {
                trigger_name: event.trigger_name.clone().unwrap_or_default(),
            });
        }

        let payload = &event.payload;
        let number = payload.number();

        let action = payload.action();
        if action != IssueAction::Create {
            return Err(SkipReason::NotCreate { action, number });
        }

        let project = payload
            .project_name()
            .ok_or(SkipReason::MissingProject { number })?;

        let repo = self
            .projects
            .resolve(project)
            .cloned()
            .ok_or_else(|| SkipReason::UnknownProject {
                project: project.to_string(),
                number,
            })?;

        let data = &payload.data;
        let ticket = Ticket::new(
            data.id.clone().unwrap_or_default(),
            data.title.clone().unwrap_or_default(),
            data.description.clone().unwrap_or_default(),
            number,
            project,
        )
        .map_err(|reason| SkipReason::InvalidTicket { reason, number })?;

        Ok((ticket, repo))
    }
}
