use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::api::errors::ApiError;
use crate::api::middleware::WebhookSecret;
use crate::api::AppState;
use crate::domain::ticket::TriggerEvent;
use crate::trigger::DispatchOutcome;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookStatus {
    Accepted,
    Skipped,
}

/// Response to a delivered trigger event
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: WebhookStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Receive a tracker trigger event
///
/// POST /webhooks/linear
///
/// Always answers 202 for well-formed events; the run itself happens in the
/// background.
pub async fn linear_webhook(
    State(state): State<AppState>,
    _secret: WebhookSecret,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookResponse>), ApiError> {
    let value: serde_json::Value = serde_json::from_slice(&body)?;
    let event = TriggerEvent::from_json(value)?;

    let response = match state.dispatcher.screen(&event) {
        DispatchOutcome::Accepted { ticket, repo } => {
            state.dispatcher.spawn(ticket, repo);
            WebhookResponse {
                status: WebhookStatus::Accepted,
                reason: None,
            }
        }
        DispatchOutcome::Skipped(reason) => WebhookResponse {
            status: WebhookStatus::Skipped,
            reason: Some(reason.to_string()),
        },
    };

    Ok((StatusCode::ACCEPTED, Json(response)))
}
