//! Relay Handler
//!
//! Receives CodePipeline action state changes and reports them as build
//! statuses to a Bitbucket server.
//!
//! Architecture:
//! - Configuration: Load settings from environment
//! - Repositories: AWS lookups (CodePipeline executions, SSM parameters)
//! - Services: Resolution, credentials, reporting and the relay itself
//! - API: HTTP entry point the event delivery mechanism posts to

pub mod api;
pub mod config;
pub mod repository;
pub mod service;
