//! Handler configuration
//!
//! Defines all configurable parameters of the handler: the Bitbucket server,
//! the token parameter, deadlines and retry bounds.

use relay_client::RetryPolicy;
use relay_core::deploy::{DEFAULT_TOKEN_PARAMETER, SERVER_ENV, TOKEN_ENV};
use std::time::Duration;

/// Handler configuration
///
/// The server address and token parameter are supplied at deployment time;
/// everything else has a default suited to a short-lived invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bitbucket server base URL (e.g., "https://bitbucket.example.com")
    pub server_address: String,

    /// Name of the parameter holding the access token
    pub token_parameter: String,

    /// Address the HTTP API binds to
    pub bind_addr: String,

    /// Deadline for handling one event end to end
    pub invocation_timeout: Duration,

    /// Timeout of a single HTTP request to the Bitbucket server
    pub request_timeout: Duration,

    /// Total attempts for delivering a report
    pub report_max_attempts: u32,

    /// Backoff after the first failed delivery attempt
    pub report_initial_backoff: Duration,

    /// Upper bound of the delivery backoff
    pub report_max_backoff: Duration,

    /// Total attempts for AWS API calls
    pub aws_max_attempts: u32,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(server_address: String) -> Self {
        Self {
            server_address,
            token_parameter: DEFAULT_TOKEN_PARAMETER.to_string(),
            bind_addr: "0.0.0.0:8080".to_string(),
            invocation_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            report_max_attempts: 3,
            report_initial_backoff: Duration::from_millis(200),
            report_max_backoff: Duration::from_secs(5),
            aws_max_attempts: 3,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - BITBUCKET_SERVER (required)
    /// - BITBUCKET_TOKEN (optional, parameter name, default: BITBUCKET_UPDATE_BUILD_STATUS_TOKEN)
    /// - RELAY_BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - INVOCATION_TIMEOUT (optional, seconds, default: 30)
    /// - REQUEST_TIMEOUT (optional, seconds, default: 10)
    /// - REPORT_MAX_ATTEMPTS (optional, default: 3)
    /// - REPORT_INITIAL_BACKOFF_MS (optional, default: 200)
    /// - REPORT_MAX_BACKOFF_MS (optional, default: 5000)
    /// - AWS_MAX_ATTEMPTS (optional, default: 3)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let server_address = lookup(SERVER_ENV)
            .ok_or_else(|| anyhow::anyhow!("{} environment variable not set", SERVER_ENV))?;

        let mut config = Self::new(server_address);

        if let Some(token_parameter) = lookup(TOKEN_ENV).filter(|s| !s.trim().is_empty()) {
            config.token_parameter = token_parameter;
        }

        if let Some(bind_addr) = lookup("RELAY_BIND_ADDR") {
            config.bind_addr = bind_addr;
        }

        let number = |key: &str| lookup(key).and_then(|s| s.parse::<u64>().ok());

        if let Some(secs) = number("INVOCATION_TIMEOUT") {
            config.invocation_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = number("REQUEST_TIMEOUT") {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = number("REPORT_MAX_ATTEMPTS") {
            config.report_max_attempts = attempts.try_into().unwrap_or(u32::MAX);
        }
        if let Some(ms) = number("REPORT_INITIAL_BACKOFF_MS") {
            config.report_initial_backoff = Duration::from_millis(ms);
        }
        if let Some(ms) = number("REPORT_MAX_BACKOFF_MS") {
            config.report_max_backoff = Duration::from_millis(ms);
        }
        if let Some(attempts) = number("AWS_MAX_ATTEMPTS") {
            config.aws_max_attempts = attempts.try_into().unwrap_or(u32::MAX);
        }

        Ok(config)
    }

    /// Retry policy for report delivery
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.report_max_attempts,
            self.report_initial_backoff,
            self.report_max_backoff,
        )
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server_address.is_empty() {
            anyhow::bail!("server_address cannot be empty");
        }

        if !self.server_address.starts_with("http://")
            && !self.server_address.starts_with("https://")
        {
            anyhow::bail!("server_address must start with http:// or https://");
        }

        if self.token_parameter.trim().is_empty() {
            anyhow::bail!("token_parameter cannot be empty");
        }

        if self.invocation_timeout.is_zero() {
            anyhow::bail!("invocation_timeout must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.report_max_attempts == 0 {
            anyhow::bail!("report_max_attempts must be greater than 0");
        }

        if self.aws_max_attempts == 0 {
            anyhow::bail!("aws_max_attempts must be greater than 0");
        }

        Ok(())
    }
}
