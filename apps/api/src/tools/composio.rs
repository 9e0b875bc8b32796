//! HTTP executor for Composio-hosted actions.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ActionExecutor, ActionRequest, ToolError};
use crate::config::ComposioConfig;

/// Executes actions through the Composio action API.
pub struct ComposioClient {
    http: Client,
    api_key: String,
    base_url: String,
    entity_id: String,
}

impl ComposioClient {
    pub fn new(config: &ComposioConfig) -> Self {
        Self {
            http: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            entity_id: "default".to_string(),
        }
    }

    fn action_url(&self, request: &ActionRequest) -> String {
        format!(
            "{}/api/v2/actions/{}/execute",
            self.base_url,
            request.action.name()
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteBody<'a> {
    entity_id: &'a str,
    input: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<Value>,
    #[serde(alias = "successfull", default = "default_success")]
    successful: bool,
}

fn default_success() -> bool {
    true
}

/// Error payloads arrive either as a string or as an object with a message
fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

fn interpret(action: &str, response: ExecuteResponse) -> Result<Value, ToolError> {
    if !response.successful || response.error.is_some() {
        return Err(ToolError::Api {
            action: action.to_string(),
            message: response
                .error
                .as_ref()
                .map(error_message)
                .unwrap_or_else(|| "action reported failure".to_string()),
        });
    }
    Ok(response.data)
}

#[async_trait]
impl ActionExecutor for ComposioClient {
    async fn execute(&self, request: ActionRequest) -> Result<Value, ToolError> {
        let action = request.action.name();
        let body = ExecuteBody {
            entity_id: &self.entity_id,
            input: &request.params,
            metadata: request.metadata.as_ref(),
        };

        let response = self
            .http
            .post(self.action_url(&request))
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(ToolError::Api {
                action: action.to_string(),
                message: format!("status {}: {}", status.as_u16(), text),
            });
        }

        let parsed: ExecuteResponse = response.json().await?;
        interpret(action, parsed)
    }
}
