//! Pipeline action event types
//!
//! Parsing of the EventBridge notification CodePipeline emits whenever an
//! action changes state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{RelayError, Result};

/// Detail type of the notifications the relay handles
pub const ACTION_STATE_CHANGE: &str = "CodePipeline Action Execution State Change";

/// Event source of CodePipeline notifications
pub const CODEPIPELINE_SOURCE: &str = "aws.codepipeline";

/// State of a pipeline action execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionState {
    Started,
    Succeeded,
    Failed,
    Canceled,
}

impl ActionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionState {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "STARTED" => Ok(Self::Started),
            "SUCCEEDED" => Ok(Self::Succeeded),
            "FAILED" => Ok(Self::Failed),
            "CANCELED" => Ok(Self::Canceled),
            other => Err(RelayError::malformed(format!(
                "unknown action state '{}'",
                other
            ))),
        }
    }
}

/// A single action state change, extracted from the notification envelope
///
/// Immutable once parsed; one event is handled per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineActionEvent {
    pub pipeline_name: String,
    pub execution_id: String,
    pub stage_name: String,
    pub action_name: String,
    pub state: ActionState,
    pub timestamp: Option<DateTime<Utc>>,
    pub region: Option<String>,
}

impl PipelineActionEvent {
    /// Parse an event from the raw notification JSON
    ///
    /// Accepts both the EventBridge wire spelling (`detail-type`,
    /// `execution-id`) and camelCase. Any missing or empty identifier, an
    /// unexpected detail type or source, or an unknown state yields
    /// [`RelayError::MalformedEvent`].
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let envelope: RawEnvelope = serde_json::from_value(value.clone())
            .map_err(|e| RelayError::malformed(format!("invalid event envelope: {}", e)))?;

        if let Some(detail_type) = envelope.detail_type.as_deref() {
            if detail_type != ACTION_STATE_CHANGE {
                return Err(RelayError::malformed(format!(
                    "unexpected detail type '{}'",
                    detail_type
                )));
            }
        }

        if let Some(source) = envelope.source.as_deref() {
            if source != CODEPIPELINE_SOURCE {
                return Err(RelayError::malformed(format!(
                    "unexpected event source '{}'",
                    source
                )));
            }
        }

        let detail = envelope
            .detail
            .ok_or_else(|| RelayError::malformed("missing detail"))?;

        let state = required(detail.state, "state")?.parse::<ActionState>()?;

        Ok(Self {
            pipeline_name: required(detail.pipeline, "pipeline")?,
            execution_id: required(detail.execution_id, "execution-id")?,
            stage_name: required(detail.stage, "stage")?,
            action_name: required(detail.action, "action")?,
            state,
            timestamp: envelope.time,
            region: envelope.region.filter(|r| !r.trim().is_empty()),
        })
    }
}

fn required(field: Option<String>, name: &str) -> Result<String> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(RelayError::malformed(format!("missing detail.{}", name))),
    }
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "detail-type", alias = "detailType")]
    detail_type: Option<String>,
    source: Option<String>,
    time: Option<DateTime<Utc>>,
    region: Option<String>,
    detail: Option<RawDetail>,
}

#[derive(Debug, Deserialize)]
struct RawDetail {
    pipeline: Option<String>,
    #[serde(rename = "execution-id", alias = "executionId")]
    execution_id: Option<String>,
    stage: Option<String>,
    action: Option<String>,
    state: Option<String>,
}
