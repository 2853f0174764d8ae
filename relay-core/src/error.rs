//! Error types shared across the relay
//!
//! Every error is terminal for the event being handled. The [`ErrorKind`] tag
//! is what operators see on a failed invocation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::event::ActionState;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors that can terminate the handling of one event
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// The incoming notification could not be interpreted
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Execution detail could not be fetched
    #[error("Failed to resolve execution {execution_id}: {message}")]
    Resolution {
        execution_id: String,
        message: String,
    },

    /// The execution has no source revision for the event's action
    #[error("No source revision for action '{action}' in execution {execution_id}")]
    RevisionNotFound {
        execution_id: String,
        action: String,
    },

    /// The execution lists the event's action more than once
    #[error("Action '{action}' has {count} source revisions in execution {execution_id}")]
    AmbiguousRevision {
        execution_id: String,
        action: String,
        count: usize,
    },

    /// The action state has no build-status counterpart
    #[error("Action state {0} cannot be reported as a build status")]
    UnmappedState(ActionState),

    /// The access token could not be fetched
    #[error("Failed to fetch credential '{name}': {message}")]
    Credential { name: String, message: String },

    /// The report could not be delivered after retrying transient failures
    #[error("Build status delivery failed after {attempts} attempt(s): {message}")]
    ReportDelivery { attempts: u32, message: String },

    /// The server refused the report (bad credential or payload)
    #[error("Build status rejected (status {status}): {message}")]
    ReportRejected { status: u16, message: String },

    /// The server does not know the commit
    #[error("Revision {revision} is unknown to the server")]
    RevisionUnknown { revision: String },

    /// The invocation deadline elapsed during an outbound call
    #[error("Timed out while {operation}")]
    Timeout { operation: String },
}

/// Classification tag attached to a failed invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    MalformedEvent,
    Resolution,
    RevisionNotFound,
    AmbiguousRevision,
    UnmappedState,
    Credential,
    ReportDelivery,
    ReportRejected,
    RevisionUnknown,
    Timeout,
}

impl RelayError {
    /// Get the classification tag for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedEvent(_) => ErrorKind::MalformedEvent,
            Self::Resolution { .. } => ErrorKind::Resolution,
            Self::RevisionNotFound { .. } => ErrorKind::RevisionNotFound,
            Self::AmbiguousRevision { .. } => ErrorKind::AmbiguousRevision,
            Self::UnmappedState(_) => ErrorKind::UnmappedState,
            Self::Credential { .. } => ErrorKind::Credential,
            Self::ReportDelivery { .. } => ErrorKind::ReportDelivery,
            Self::ReportRejected { .. } => ErrorKind::ReportRejected,
            Self::RevisionUnknown { .. } => ErrorKind::RevisionUnknown,
            Self::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// Create a malformed event error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEvent(message.into())
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
