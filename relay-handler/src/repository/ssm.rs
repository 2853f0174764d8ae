//! SSM Parameter Store repository

use async_trait::async_trait;
use aws_sdk_ssm::Client;
use aws_sdk_ssm::error::DisplayErrorContext;
use relay_core::error::{RelayError, Result};

use super::ParameterRepository;

/// SSM implementation of ParameterRepository
#[derive(Debug, Clone)]
pub struct SsmParameterRepository {
    client: Client,
}

impl SsmParameterRepository {
    /// Creates a repository from a loaded AWS configuration
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ParameterRepository for SsmParameterRepository {
    async fn get_parameter(&self, name: &str) -> Result<String> {
        let credential_error = |message: String| RelayError::Credential {
            name: name.to_string(),
            message,
        };

        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| {
                let message = match e.as_service_error() {
                    Some(err) if err.is_parameter_not_found() => "parameter not found".to_string(),
                    _ => format!("SSM error: {}", DisplayErrorContext(&e)),
                };
                credential_error(message)
            })?;

        output
            .parameter()
            .and_then(|p| p.value())
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().to_string())
            .ok_or_else(|| credential_error("parameter has no value".to_string()))
    }
}
