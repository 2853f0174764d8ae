//! Relay HTTP Client
//!
//! A small, type-safe client for the Bitbucket Server build-status API.
//!
//! The client is pure transport: it posts a [`BuildStatusReport`] for a commit,
//! retries transient failures with bounded backoff and reports everything
//! else through a typed [`ClientError`].
//!
//! # Example
//!
//! ```no_run
//! use relay_client::BitbucketClient;
//! use relay_core::domain::build_status::{BuildState, BuildStatusReport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BitbucketClient::new("https://bitbucket.example.com");
//!
//!     let report = BuildStatusReport {
//!         state: BuildState::Successful,
//!         key: "svc:Build".to_string(),
//!         name: "svc › Build › Build".to_string(),
//!         url: "https://console.aws.amazon.com/codesuite/codepipeline/pipelines/svc".to_string(),
//!         description: "Build succeeded in stage Build".to_string(),
//!     };
//!
//!     client.report_build_status("token", "abc123", &report).await?;
//!     Ok(())
//! }
//! ```
//!
//! [`BuildStatusReport`]: relay_core::domain::build_status::BuildStatusReport

mod build_status;
pub mod error;
pub mod retry;

pub use error::{ClientError, Result};
pub use retry::RetryPolicy;

use reqwest::{Client, Url};

/// Path prefix of the commit build-status endpoint
const BUILD_STATUS_PATH: [&str; 4] = ["rest", "build-status", "1.0", "commits"];

/// HTTP client for a Bitbucket Server instance
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    /// Base URL of the server (e.g., "https://bitbucket.example.com")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Backoff applied to transient failures
    retry: RetryPolicy,
}

impl BitbucketClient {
    /// Create a new client with the default retry policy
    ///
    /// # Arguments
    /// * `base_url` - The server address, optionally with a context path
    ///
    /// # Example
    /// ```
    /// use relay_client::BitbucketClient;
    ///
    /// let client = BitbucketClient::new("https://bitbucket.example.com/");
    /// assert_eq!(client.base_url(), "https://bitbucket.example.com");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use relay_client::BitbucketClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = BitbucketClient::with_client("https://bitbucket.example.com", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the retry policy
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Build the build-status URL of a commit
    ///
    /// The revision is appended as a single, percent-encoded path segment.
    fn commit_url(&self, revision_id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(BUILD_STATUS_PATH)
            .push(revision_id);

        Ok(url)
    }
}
