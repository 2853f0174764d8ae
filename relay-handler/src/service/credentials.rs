//! Credential provider
//!
//! Fetches the access token from the secret store once per process and
//! serves it from memory afterwards. There is no expiry: a rotated token is
//! picked up by recycling the process.

use async_trait::async_trait;
use relay_core::domain::credential::Credential;
use relay_core::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::repository::ParameterRepository;

/// Service trait for obtaining access tokens
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Gets the token stored under the given parameter name
    async fn get_token(&self, name: &str) -> Result<Credential>;
}

/// Caching implementation of CredentialProvider
///
/// The cache lives as long as the provider, which the handler keeps for the
/// whole process. The lock is held across the first fetch so concurrent
/// invocations on a cold process issue a single secret-store call.
pub struct CachedCredentialProvider {
    repository: Arc<dyn ParameterRepository>,
    cache: Mutex<HashMap<String, Credential>>,
}

impl CachedCredentialProvider {
    /// Creates a provider with an empty cache
    pub fn new(repository: Arc<dyn ParameterRepository>) -> Self {
        Self {
            repository,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CredentialProvider for CachedCredentialProvider {
    async fn get_token(&self, name: &str) -> Result<Credential> {
        let mut cache = self.cache.lock().await;

        if let Some(credential) = cache.get(name) {
            debug!("Using cached credential '{}'", name);
            return Ok(credential.clone());
        }

        let credential = Credential::new(self.repository.get_parameter(name).await?);
        info!("Fetched credential '{}' from parameter store", name);

        cache.insert(name.to_string(), credential.clone());
        Ok(credential)
    }
}
