use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Repository an enrichment run clones and analyses
///
/// # Example
/// ```
/// use ticket_enricher::domain::ticket::RepoTarget;
///
/// let repo: RepoTarget = "ComposioHQ/composio".parse().expect("valid repo");
/// assert_eq!(repo.owner, "ComposioHQ");
/// assert_eq!(repo.to_string(), "ComposioHQ/composio");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoTarget {
    pub owner: String,
    pub name: String,
}

impl RepoTarget {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (owner, name) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| format!("expected owner/name, got '{}'", s))?;

        let (owner, name) = (owner.trim(), name.trim());
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(format!("expected owner/name, got '{}'", s));
        }

        Ok(Self::new(owner, name))
    }
}

impl std::fmt::Display for RepoTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Action field of an issue trigger event
///
/// Only `Create` starts a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueAction {
    Create,
    Update,
    Remove,
    Other(String),
}

impl From<&str> for IssueAction {
    fn from(value: &str) -> Self {
        match value {
            "create" => IssueAction::Create,
            "update" => IssueAction::Update,
            "remove" => IssueAction::Remove,
            other => IssueAction::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for IssueAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueAction::Create => write!(f, "create"),
            IssueAction::Update => write!(f, "update"),
            IssueAction::Remove => write!(f, "remove"),
            IssueAction::Other(other) => write!(f, "{}", other),
        }
    }
}
