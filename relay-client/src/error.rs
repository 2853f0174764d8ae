//! Error types for the build-status client

use relay_core::RelayError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when reporting a build status
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a status code the client does not retry on its own
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Transient failures persisted through every attempt
    #[error("Delivery failed after {attempts} attempt(s): {last}")]
    DeliveryFailed {
        attempts: u32,
        /// The failure seen on the final attempt
        last: Box<ClientError>,
    },

    /// The commit is unknown to the server
    #[error("Revision not found: {0}")]
    RevisionNotFound(String),

    /// Base URL cannot carry a path, so nothing was sent
    #[error("Invalid server address: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if the failure may go away on its own (network error or 5xx)
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) => true,
            Self::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<ClientError> for RelayError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::DeliveryFailed { attempts, last } => RelayError::ReportDelivery {
                attempts,
                message: last.to_string(),
            },
            ClientError::RequestFailed(e) => RelayError::ReportDelivery {
                attempts: 1,
                message: e.to_string(),
            },
            ClientError::ApiError { status, message } if status >= 500 => {
                RelayError::ReportDelivery {
                    attempts: 1,
                    message: format!("status {}: {}", status, message),
                }
            }
            ClientError::ApiError { status, message } => {
                RelayError::ReportRejected { status, message }
            }
            ClientError::RevisionNotFound(revision) => RelayError::RevisionUnknown { revision },
            // Local misconfiguration: status 0 marks that no server answered
            ClientError::InvalidUrl(message) => RelayError::ReportRejected {
                status: 0,
                message: format!("report not sent, invalid server address: {}", message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::ErrorKind;

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::api_error(503, "unavailable").is_transient());
        assert!(ClientError::api_error(500, "boom").is_transient());
        assert!(!ClientError::api_error(401, "unauthorized").is_transient());
        assert!(!ClientError::RevisionNotFound("abc".to_string()).is_transient());
    }

    #[test]
    fn test_conversion_to_relay_error() {
        let rejected: RelayError = ClientError::api_error(401, "unauthorized").into();
        assert_eq!(rejected.kind(), ErrorKind::ReportRejected);

        let unknown: RelayError = ClientError::RevisionNotFound("abc123".to_string()).into();
        assert_eq!(
            unknown,
            RelayError::RevisionUnknown {
                revision: "abc123".to_string()
            }
        );

        let delivery: RelayError = ClientError::DeliveryFailed {
            attempts: 3,
            last: Box::new(ClientError::api_error(502, "bad gateway")),
        }
        .into();
        assert!(matches!(
            delivery,
            RelayError::ReportDelivery { attempts: 3, .. }
        ));
    }

    #[test]
    fn test_invalid_url_is_not_a_server_rejection() {
        let err: RelayError = ClientError::InvalidUrl("mailto:ops@example.com".to_string()).into();
        match err {
            RelayError::ReportRejected { status, message } => {
                assert_eq!(status, 0);
                assert!(message.starts_with("report not sent, invalid server address"));
                assert!(message.contains("mailto:ops@example.com"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
