// HTTP adapter: receives tracker webhooks and hands them to the dispatcher

pub mod errors;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::trigger::TicketDispatcher;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<TicketDispatcher>,
    pub webhook_secret: Option<String>,
}

impl AppState {
    pub fn new(dispatcher: Arc<TicketDispatcher>, webhook_secret: Option<String>) -> Self {
        Self {
            dispatcher,
            webhook_secret,
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/webhooks/linear", post(handlers::webhooks::linear_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
