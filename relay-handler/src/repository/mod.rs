//! Repository layer
//!
//! Repositories are stateless clients of the AWS services the handler reads
//! from. They translate SDK responses into domain types without any business
//! logic.
//!
//! All repositories are trait-based to enable testing and mocking.

mod codepipeline;
mod ssm;

use async_trait::async_trait;
use relay_core::domain::execution::ExecutionDetail;
use relay_core::error::Result;

pub use codepipeline::CodePipelineExecutionRepository;
pub use ssm::SsmParameterRepository;

/// Read access to pipeline executions
#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    /// Fetches the detail of one execution of a pipeline
    ///
    /// # Arguments
    /// * `pipeline_name` - Name of the pipeline
    /// * `execution_id` - Execution to look up
    async fn get_execution(&self, pipeline_name: &str, execution_id: &str)
    -> Result<ExecutionDetail>;
}

/// Read access to the secret store
#[async_trait]
pub trait ParameterRepository: Send + Sync {
    /// Fetches the decrypted value of a parameter
    async fn get_parameter(&self, name: &str) -> Result<String>;
}
