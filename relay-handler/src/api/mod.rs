//! API Module
//!
//! HTTP surface of the handler. The delivery mechanism posts each event to
//! `/events`; any non-2xx answer tells it the event was not handled.

pub mod error;
pub mod events;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::service::StatusRelay;

/// Create the API router
pub fn create_router(relay: Arc<StatusRelay>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Event delivery
        .route("/events", post(events::handle_event))
        // Add state and middleware
        .with_state(relay)
        .layer(TraceLayer::new_for_http())
}
