use serde::{Deserialize, Serialize};

use super::value_objects::IssueAction;

/// Issue trigger payload as delivered by the tracker
///
/// Every field under `data` is optional on the wire; filtering decides what
/// a missing value means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueEvent {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub data: IssueData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub project: Option<ProjectRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(default)]
    pub name: Option<String>,
}

impl IssueEvent {
    pub fn action(&self) -> IssueAction {
        IssueAction::from(self.action.as_str())
    }

    pub fn project_name(&self) -> Option<&str> {
        self.data
            .project
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .filter(|name| !name.is_empty())
    }

    pub fn number(&self) -> Option<i64> {
        self.data.number
    }
}

/// Trigger delivery: either a named envelope or the bare issue payload
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEvent {
    pub trigger_name: Option<String>,
    pub payload: IssueEvent,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default, alias = "triggerName")]
    trigger_name: Option<String>,
    payload: IssueEvent,
}

impl TriggerEvent {
    pub const ISSUE_CREATED: &'static str = "LINEAR_ISSUE_CREATED_TRIGGER";

    /// Parse a webhook body, accepting both envelope and bare payloads
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        if value.get("payload").is_some() {
            let envelope: Envelope = serde_json::from_value(value)?;
            return Ok(Self {
                trigger_name: envelope.trigger_name,
                payload: envelope.payload,
            });
        }

        Ok(Self {
            trigger_name: None,
            payload: serde_json::from_value(value)?,
        })
    }

    /// Bare payloads are assumed to come from the issue-created trigger
    pub fn is_issue_created(&self) -> bool {
        self.trigger_name
            .as_deref()
            .map_or(true, |name| name == Self::ISSUE_CREATED)
    }
}

/// Ticket being enriched
///
/// Built only from events that passed filtering; immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    id: String,
    title: String,
    description: String,
    number: Option<i64>,
    project: String,
}

impl Ticket {
    /// Creates a ticket
    ///
    /// # Returns
    /// * `Err(String)` - if the id is empty
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        number: Option<i64>,
        project: impl Into<String>,
    ) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Ticket id cannot be empty".to_string());
        }

        Ok(Self {
            id,
            title: title.into(),
            description: description.into(),
            number,
            project: project.into(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn number(&self) -> Option<i64> {
        self.number
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}
