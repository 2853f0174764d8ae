//! CodePipeline repository
//!
//! Looks up pipeline executions and extracts their source revisions.
//!
//! An execution only lists artifact revisions, keyed by artifact name. That
//! name is what the relay matches against the action name of an event, so a
//! pipeline must name each source artifact after the action whose status it
//! reports. An action with no artifact of its own name fails resolution with
//! `RevisionNotFound`.

use async_trait::async_trait;
use aws_sdk_codepipeline::Client;
use aws_sdk_codepipeline::error::DisplayErrorContext;
use aws_sdk_codepipeline::types::ArtifactRevision;
use relay_core::domain::execution::{ExecutionDetail, SourceRevision};
use relay_core::error::{RelayError, Result};
use tracing::debug;

use super::ExecutionRepository;

/// CodePipeline implementation of ExecutionRepository
#[derive(Debug, Clone)]
pub struct CodePipelineExecutionRepository {
    client: Client,
}

impl CodePipelineExecutionRepository {
    /// Creates a repository from a loaded AWS configuration
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ExecutionRepository for CodePipelineExecutionRepository {
    async fn get_execution(
        &self,
        pipeline_name: &str,
        execution_id: &str,
    ) -> Result<ExecutionDetail> {
        let resolution_error = |message: String| RelayError::Resolution {
            execution_id: execution_id.to_string(),
            message,
        };

        let output = self
            .client
            .get_pipeline_execution()
            .pipeline_name(pipeline_name)
            .pipeline_execution_id(execution_id)
            .send()
            .await
            .map_err(|e| {
                let message = match e.as_service_error() {
                    Some(err) if err.is_pipeline_execution_not_found_exception() => {
                        format!("execution not found in pipeline {}", pipeline_name)
                    }
                    Some(err) if err.is_pipeline_not_found_exception() => {
                        format!("pipeline {} not found", pipeline_name)
                    }
                    _ => format!("CodePipeline error: {}", DisplayErrorContext(&e)),
                };
                resolution_error(message)
            })?;

        let execution = output
            .pipeline_execution()
            .ok_or_else(|| resolution_error("response carries no execution".to_string()))?;

        let source_revisions: Vec<SourceRevision> = execution
            .artifact_revisions()
            .iter()
            .filter_map(to_source_revision)
            .collect();

        debug!(
            "Execution {} of {} has {} source revision(s)",
            execution_id,
            pipeline_name,
            source_revisions.len()
        );

        Ok(ExecutionDetail {
            execution_id: execution_id.to_string(),
            source_revisions,
        })
    }
}

/// Maps an artifact revision onto the action of the same name.
/// Entries without a name or revision id cannot be reported against.
fn to_source_revision(artifact: &ArtifactRevision) -> Option<SourceRevision> {
    let action_name = artifact.name().filter(|s| !s.is_empty())?;
    let revision_id = artifact.revision_id().filter(|s| !s.is_empty())?;

    Some(SourceRevision {
        action_name: action_name.to_string(),
        revision_id: revision_id.to_string(),
        revision_url: artifact.revision_url().map(str::to_string),
        revision_summary: artifact.revision_summary().map(str::to_string),
    })
}
