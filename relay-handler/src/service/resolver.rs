//! Execution resolver
//!
//! Resolves the identifiers carried by an event to the execution's source
//! revisions. Detail is fetched fresh for every event.

use async_trait::async_trait;
use relay_core::domain::execution::ExecutionDetail;
use relay_core::error::Result;
use std::sync::Arc;
use tracing::debug;

use crate::repository::ExecutionRepository;

/// Service trait for resolving executions
#[async_trait]
pub trait ExecutionResolver: Send + Sync {
    /// Resolves an execution to its detail
    ///
    /// # Arguments
    /// * `pipeline_name` - The pipeline the execution belongs to
    /// * `execution_id` - The execution to resolve
    async fn resolve(&self, pipeline_name: &str, execution_id: &str) -> Result<ExecutionDetail>;
}

/// Standard implementation of ExecutionResolver
pub struct StandardExecutionResolver {
    repository: Arc<dyn ExecutionRepository>,
}

impl StandardExecutionResolver {
    /// Creates a new resolver backed by the given repository
    pub fn new(repository: Arc<dyn ExecutionRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ExecutionResolver for StandardExecutionResolver {
    async fn resolve(&self, pipeline_name: &str, execution_id: &str) -> Result<ExecutionDetail> {
        debug!("Resolving execution {} of {}", execution_id, pipeline_name);

        let detail = self
            .repository
            .get_execution(pipeline_name, execution_id)
            .await?;

        for revision in &detail.source_revisions {
            debug!(
                "  - {} @ {}",
                revision.action_name, revision.revision_id
            );
        }

        Ok(detail)
    }
}
