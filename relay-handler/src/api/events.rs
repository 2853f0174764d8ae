//! Event API Handler
//!
//! Entry point for pipeline action notifications.

use axum::{Json, body::Bytes, extract::State};
use relay_core::RelayError;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::service::{HandlerFailure, HandlerState, StatusRelay};

/// POST /events
/// Handle one pipeline action notification
///
/// The body is read raw so that unparsable payloads, with or without a JSON
/// content type, fail as malformed events like any other bad notification.
pub async fn handle_event(
    State(relay): State<Arc<StatusRelay>>,
    body: Bytes,
) -> ApiResult<Json<serde_json::Value>> {
    let event: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(kind = "MalformedEvent", "Rejected event body: {}", e);
        ApiError(HandlerFailure {
            state: HandlerState::Received,
            error: RelayError::malformed(format!("event body is not valid JSON: {}", e)),
        })
    })?;

    let delivery = relay.handle(&event).await?;

    Ok(Json(serde_json::json!({
        "outcome": "DONE",
        "revisionId": delivery.revision_id,
        "key": delivery.report.key,
        "state": delivery.report.state,
    })))
}
