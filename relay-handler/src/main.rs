//! Relay Handler
//!
//! Serves the event endpoint that relays CodePipeline action state changes
//! to the Bitbucket build-status API.

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relay_client::BitbucketClient;
use relay_handler::api;
use relay_handler::config::Config;
use relay_handler::repository::{CodePipelineExecutionRepository, SsmParameterRepository};
use relay_handler::service::{
    BitbucketStatusReporter, CachedCredentialProvider, StandardExecutionResolver, StatusRelay,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay_handler=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Relay Handler");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;
    info!(
        "Loaded configuration: server_address={}, token_parameter={}",
        config.server_address, config.token_parameter
    );

    // AWS clients
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .retry_config(RetryConfig::standard().with_max_attempts(config.aws_max_attempts))
        .load()
        .await;
    let executions = Arc::new(CodePipelineExecutionRepository::new(&sdk_config));
    let parameters = Arc::new(SsmParameterRepository::new(&sdk_config));

    // Bitbucket client
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;
    let client = BitbucketClient::with_client(config.server_address.clone(), http_client)
        .with_retry_policy(config.retry_policy());

    // Services
    let relay = Arc::new(StatusRelay::new(
        &config,
        Arc::new(StandardExecutionResolver::new(executions)),
        Arc::new(CachedCredentialProvider::new(parameters)),
        Arc::new(BitbucketStatusReporter::new(client)),
    ));

    info!("Services initialized");

    let app = api::create_router(relay);

    info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
