//! Build status types
//!
//! The vocabulary of the Bitbucket Server build-status API and the mapping
//! from pipeline action states into it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::event::{ActionState, PipelineActionEvent};
use crate::domain::execution::SourceRevision;
use crate::error::{RelayError, Result};

const CONSOLE_BASE_URL: &str = "https://console.aws.amazon.com/codesuite/codepipeline/pipelines";

/// Build state understood by the build-status API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildState {
    InProgress,
    Successful,
    Failed,
    Stopped,
}

impl BuildState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "INPROGRESS",
            Self::Successful => "SUCCESSFUL",
            Self::Failed => "FAILED",
            Self::Stopped => "STOPPED",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Self::InProgress => "is in progress",
            Self::Successful => "succeeded",
            Self::Failed => "failed",
            Self::Stopped => "was stopped",
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a pipeline action state to a build state
///
/// Only terminal states are reportable. Anything else means the event rule
/// let through a state it should have filtered out.
pub fn map_state(state: ActionState) -> Result<BuildState> {
    match state {
        ActionState::Succeeded => Ok(BuildState::Successful),
        ActionState::Failed => Ok(BuildState::Failed),
        ActionState::Canceled => Ok(BuildState::Stopped),
        other => Err(RelayError::UnmappedState(other)),
    }
}

/// Stable key of the build line for a pipeline action
///
/// Independent of the execution, so reports for later runs overwrite the
/// earlier entry instead of adding new ones.
pub fn report_key(pipeline_name: &str, action_name: &str) -> String {
    format!("{}:{}", pipeline_name, action_name)
}

/// Console link to a pipeline execution
pub fn execution_url(pipeline_name: &str, execution_id: &str, region: Option<&str>) -> String {
    let url = format!(
        "{}/{}/executions/{}/timeline",
        CONSOLE_BASE_URL, pipeline_name, execution_id
    );
    match region {
        Some(region) => format!("{}?region={}", url, region),
        None => url,
    }
}

/// Body of a build-status report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatusReport {
    pub state: BuildState,
    pub key: String,
    pub name: String,
    pub url: String,
    pub description: String,
}

impl BuildStatusReport {
    /// Build the report for an event and its resolved revision
    ///
    /// Every field is derived from the event and revision alone, so the same
    /// event always produces the same body.
    pub fn new(event: &PipelineActionEvent, state: BuildState, revision: &SourceRevision) -> Self {
        let mut description = format!(
            "{} {} in stage {}",
            event.action_name,
            state.verb(),
            event.stage_name
        );
        if let Some(summary) = revision
            .revision_summary
            .as_deref()
            .and_then(|s| s.lines().next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            description.push_str(": ");
            description.push_str(summary);
        }

        Self {
            state,
            key: report_key(&event.pipeline_name, &event.action_name),
            name: format!(
                "{} › {} › {}",
                event.pipeline_name, event.stage_name, event.action_name
            ),
            url: execution_url(
                &event.pipeline_name,
                &event.execution_id,
                event.region.as_deref(),
            ),
            description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(execution_id: &str) -> PipelineActionEvent {
        PipelineActionEvent {
            pipeline_name: "svc".to_string(),
            execution_id: execution_id.to_string(),
            stage_name: "Build".to_string(),
            action_name: "Build".to_string(),
            state: ActionState::Succeeded,
            timestamp: None,
            region: Some("eu-west-1".to_string()),
        }
    }

    fn revision() -> SourceRevision {
        SourceRevision {
            action_name: "Build".to_string(),
            revision_id: "abc123".to_string(),
            revision_url: None,
            revision_summary: Some("Fix flaky test\n\nLonger body".to_string()),
        }
    }

    #[test]
    fn test_map_terminal_states() {
        assert_eq!(map_state(ActionState::Succeeded), Ok(BuildState::Successful));
        assert_eq!(map_state(ActionState::Failed), Ok(BuildState::Failed));
        assert_eq!(map_state(ActionState::Canceled), Ok(BuildState::Stopped));
    }

    #[test]
    fn test_map_started_is_unmapped() {
        assert_eq!(
            map_state(ActionState::Started),
            Err(RelayError::UnmappedState(ActionState::Started))
        );
    }

    #[test]
    fn test_build_state_wire_format() {
        let json = serde_json::to_string(&BuildState::InProgress).unwrap();
        assert_eq!(json, "\"INPROGRESS\"");
        let json = serde_json::to_string(&BuildState::Successful).unwrap();
        assert_eq!(json, "\"SUCCESSFUL\"");
    }

    #[test]
    fn test_key_ignores_execution() {
        let first = BuildStatusReport::new(&event("e1"), BuildState::Successful, &revision());
        let mut later = event("e2");
        later.timestamp = Some(chrono::Utc::now());
        let second = BuildStatusReport::new(&later, BuildState::Failed, &revision());
        assert_eq!(first.key, "svc:Build");
        assert_eq!(first.key, second.key);
    }

    #[test]
    fn test_report_fields() {
        let report = BuildStatusReport::new(&event("e1"), BuildState::Successful, &revision());
        assert_eq!(report.state, BuildState::Successful);
        assert_eq!(report.name, "svc › Build › Build");
        assert_eq!(
            report.url,
            "https://console.aws.amazon.com/codesuite/codepipeline/pipelines/svc/executions/e1/timeline?region=eu-west-1"
        );
        assert_eq!(report.description, "Build succeeded in stage Build: Fix flaky test");
    }

    #[test]
    fn test_report_is_deterministic() {
        let a = BuildStatusReport::new(&event("e1"), BuildState::Stopped, &revision());
        let b = BuildStatusReport::new(&event("e1"), BuildState::Stopped, &revision());
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_url_without_region() {
        assert_eq!(
            execution_url("svc", "e1", None),
            "https://console.aws.amazon.com/codesuite/codepipeline/pipelines/svc/executions/e1/timeline"
        );
    }

    #[test]
    fn test_body_field_names() {
        let report = BuildStatusReport::new(&event("e1"), BuildState::Failed, &revision());
        let value = serde_json::to_value(&report).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["description", "key", "name", "state", "url"]);
        assert_eq!(value["state"], "FAILED");
    }
}
