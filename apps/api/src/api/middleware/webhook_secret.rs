use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::api::errors::ApiError;
use crate::api::AppState;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Shared-secret check for webhook routes
///
/// Passes every request when no secret is configured.
///
/// Usage:
/// ```rust,ignore
/// async fn webhook(_secret: WebhookSecret, body: Bytes) -> StatusCode {
///     StatusCode::ACCEPTED
/// }
/// ```
pub struct WebhookSecret;

#[async_trait]
impl FromRequestParts<AppState> for WebhookSecret {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.webhook_secret.as_deref() else {
            return Ok(WebhookSecret);
        };

        let provided = parts
            .headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing webhook secret"))?;

        if provided != expected {
            return Err(ApiError::unauthorized("Invalid webhook secret"));
        }

        Ok(WebhookSecret)
    }
}
