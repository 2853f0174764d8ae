//! API Error Handling
//!
//! Conversion of failed invocations into HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use relay_core::ErrorKind;

use crate::service::HandlerFailure;

/// API error type
#[derive(Debug)]
pub struct ApiError(pub HandlerFailure);

impl ApiError {
    /// Status code the delivery mechanism sees for a failure
    pub fn status(&self) -> StatusCode {
        match self.0.error.kind() {
            ErrorKind::MalformedEvent => StatusCode::BAD_REQUEST,
            ErrorKind::UnmappedState => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let HandlerFailure { state, error } = self.0;

        let body = serde_json::json!({
            "outcome": "FAILED",
            "state": state,
            "kind": error.kind(),
            "error": error.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<HandlerFailure> for ApiError {
    fn from(failure: HandlerFailure) -> Self {
        ApiError(failure)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
