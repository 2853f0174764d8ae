//! Execution detail types

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// Source revision an action of an execution was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRevision {
    pub action_name: String,
    pub revision_id: String,
    pub revision_url: Option<String>,
    pub revision_summary: Option<String>,
}

/// Execution detail as returned by the pipeline service
///
/// Fetched fresh for every event; revisions keep the order the service
/// reported them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDetail {
    pub execution_id: String,
    pub source_revisions: Vec<SourceRevision>,
}

impl ExecutionDetail {
    /// Select the revision for the given action
    ///
    /// Exactly one entry must match: none is [`RelayError::RevisionNotFound`],
    /// more than one is [`RelayError::AmbiguousRevision`].
    pub fn revision_for(&self, action_name: &str) -> Result<&SourceRevision> {
        let mut matches = self
            .source_revisions
            .iter()
            .filter(|r| r.action_name == action_name);

        let first = matches.next().ok_or_else(|| RelayError::RevisionNotFound {
            execution_id: self.execution_id.clone(),
            action: action_name.to_string(),
        })?;

        let extra = matches.count();
        if extra > 0 {
            return Err(RelayError::AmbiguousRevision {
                execution_id: self.execution_id.clone(),
                action: action_name.to_string(),
                count: extra + 1,
            });
        }

        Ok(first)
    }
}
