//! Credential domain type

use chrono::{DateTime, Utc};
use std::fmt;

/// Access token for the build-status API
///
/// Lives for the lifetime of the process that fetched it; never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub fetched_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            fetched_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("fetched_at", &self.fetched_at)
            .finish()
    }
}
