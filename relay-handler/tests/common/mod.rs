//! Shared fakes for the handler integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use relay_core::domain::execution::{ExecutionDetail, SourceRevision};
use relay_core::error::{RelayError, Result};
use relay_handler::repository::ParameterRepository;
use relay_handler::service::ExecutionResolver;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Resolver returning a fixed revision list for every execution
pub struct FixedResolver {
    pub revisions: Vec<(&'static str, &'static str)>,
    pub calls: AtomicUsize,
}

impl FixedResolver {
    pub fn new(revisions: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            revisions,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionResolver for FixedResolver {
    async fn resolve(&self, _pipeline_name: &str, execution_id: &str) -> Result<ExecutionDetail> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ExecutionDetail {
            execution_id: execution_id.to_string(),
            source_revisions: self
                .revisions
                .iter()
                .map(|(action, id)| SourceRevision {
                    action_name: action.to_string(),
                    revision_id: id.to_string(),
                    revision_url: None,
                    revision_summary: None,
                })
                .collect(),
        })
    }
}

/// Parameter store holding a single token
pub struct StaticParameters {
    pub token: Option<&'static str>,
    pub calls: AtomicUsize,
}

impl StaticParameters {
    pub fn new(token: Option<&'static str>) -> Self {
        Self {
            token,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ParameterRepository for StaticParameters {
    async fn get_parameter(&self, name: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token
            .map(str::to_string)
            .ok_or_else(|| RelayError::Credential {
                name: name.to_string(),
                message: "parameter not found".to_string(),
            })
    }
}

/// EventBridge notification for the `svc` pipeline
pub fn action_event(execution_id: &str, action: &str, state: &str) -> serde_json::Value {
    json!({
        "version": "0",
        "detail-type": "CodePipeline Action Execution State Change",
        "source": "aws.codepipeline",
        "time": "2024-03-01T12:00:00Z",
        "region": "eu-west-1",
        "detail": {
            "pipeline": "svc",
            "execution-id": execution_id,
            "stage": "Build",
            "action": action,
            "state": state
        }
    })
}
