//! Status relay
//!
//! Handles one pipeline action event end to end:
//! - Parsing the notification
//! - Resolving the execution to the action's source revision
//! - Mapping the action state to a build state
//! - Fetching the access token
//! - Posting the build-status report
//!
//! The first failing step ends the invocation. Nothing is retried here; the
//! reporter retries transient delivery failures on its own and redelivery of
//! the whole event is up to the caller.

use relay_core::domain::build_status::{BuildStatusReport, map_state};
use relay_core::domain::event::PipelineActionEvent;
use relay_core::error::{RelayError, Result};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::service::{CredentialProvider, ExecutionResolver, StatusReporter};

/// Step of an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandlerState {
    Received,
    Resolving,
    Mapping,
    Authenticating,
    Reporting,
    Done,
    Failed,
}

impl fmt::Display for HandlerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "RECEIVED",
            Self::Resolving => "RESOLVING",
            Self::Mapping => "MAPPING",
            Self::Authenticating => "AUTHENTICATING",
            Self::Reporting => "REPORTING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Successful outcome of an invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub revision_id: String,
    pub report: BuildStatusReport,
}

/// Failed outcome of an invocation
///
/// `state` is the step that was running when the error occurred.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed while {state}: {error}")]
pub struct HandlerFailure {
    pub state: HandlerState,
    pub error: RelayError,
}

/// Handler orchestrating one event per invocation
pub struct StatusRelay {
    token_parameter: String,
    invocation_timeout: Duration,
    resolver: Arc<dyn ExecutionResolver>,
    credentials: Arc<dyn CredentialProvider>,
    reporter: Arc<dyn StatusReporter>,
}

impl StatusRelay {
    /// Creates a relay from the configuration and its collaborators
    pub fn new(
        config: &Config,
        resolver: Arc<dyn ExecutionResolver>,
        credentials: Arc<dyn CredentialProvider>,
        reporter: Arc<dyn StatusReporter>,
    ) -> Self {
        Self {
            token_parameter: config.token_parameter.clone(),
            invocation_timeout: config.invocation_timeout,
            resolver,
            credentials,
            reporter,
        }
    }

    /// Handles one raw notification
    ///
    /// Returns once the report was accepted by the server, or with the state
    /// and error that ended the invocation.
    pub async fn handle(&self, raw: &serde_json::Value) -> std::result::Result<Delivery, HandlerFailure> {
        let invocation_id = Uuid::new_v4();
        let span = info_span!("invocation", id = %invocation_id);

        async {
            let outcome = self.run(raw).await;
            match &outcome {
                Ok(delivery) => info!(
                    "Reported {} for {} on revision {}",
                    delivery.report.state, delivery.report.key, delivery.revision_id
                ),
                Err(failure) => warn!(
                    kind = %failure.error.kind(),
                    state = %failure.state,
                    "Invocation failed: {}",
                    failure.error
                ),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(&self, raw: &serde_json::Value) -> std::result::Result<Delivery, HandlerFailure> {
        let deadline = Instant::now() + self.invocation_timeout;
        let mut state = HandlerState::Received;

        let event = PipelineActionEvent::from_value(raw).map_err(|e| fail(state, e))?;
        info!(
            "Received {} for {}/{}/{} (execution {})",
            event.state, event.pipeline_name, event.stage_name, event.action_name, event.execution_id
        );

        state = advance(state, HandlerState::Resolving);
        let detail = within(
            deadline,
            "resolving execution",
            self.resolver.resolve(&event.pipeline_name, &event.execution_id),
        )
        .await
        .map_err(|e| fail(state, e))?;
        let revision = detail
            .revision_for(&event.action_name)
            .map_err(|e| fail(state, e))?
            .clone();

        state = advance(state, HandlerState::Mapping);
        let build_state = map_state(event.state).map_err(|e| fail(state, e))?;

        state = advance(state, HandlerState::Authenticating);
        let credential = within(
            deadline,
            "fetching credential",
            self.credentials.get_token(&self.token_parameter),
        )
        .await
        .map_err(|e| fail(state, e))?;

        state = advance(state, HandlerState::Reporting);
        let report = BuildStatusReport::new(&event, build_state, &revision);
        within(
            deadline,
            "reporting build status",
            self.reporter
                .report(&credential.token, &revision.revision_id, &report),
        )
        .await
        .map_err(|e| fail(state, e))?;

        advance(state, HandlerState::Done);
        Ok(Delivery {
            revision_id: revision.revision_id,
            report,
        })
    }
}

fn advance(from: HandlerState, to: HandlerState) -> HandlerState {
    debug!("{} -> {}", from, to);
    to
}

fn fail(state: HandlerState, error: RelayError) -> HandlerFailure {
    debug!("{} -> {}", state, HandlerState::Failed);
    HandlerFailure { state, error }
}

/// Await an outbound call, bounded by the invocation deadline
async fn within<T>(
    deadline: Instant,
    operation: &str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout_at(deadline, call)
        .await
        .map_err(|_| RelayError::Timeout {
            operation: operation.to_string(),
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use relay_core::ErrorKind;
    use relay_core::domain::build_status::BuildState;
    use relay_core::domain::credential::Credential;
    use relay_core::domain::execution::{ExecutionDetail, SourceRevision};
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeResolver {
        revisions: Vec<(&'static str, &'static str)>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FakeResolver {
        fn with(revisions: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                revisions,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ExecutionResolver for FakeResolver {
        async fn resolve(&self, _pipeline_name: &str, execution_id: &str) -> Result<ExecutionDetail> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
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

    #[derive(Default)]
    struct FakeCredentials {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CredentialProvider for FakeCredentials {
        async fn get_token(&self, name: &str) -> Result<Credential> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RelayError::Credential {
                    name: name.to_string(),
                    message: "parameter not found".to_string(),
                });
            }
            Ok(Credential::new("tok"))
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        error: Option<RelayError>,
        sent: Mutex<Vec<(String, String, BuildStatusReport)>>,
    }

    #[async_trait]
    impl StatusReporter for RecordingReporter {
        async fn report(
            &self,
            token: &str,
            revision_id: &str,
            report: &BuildStatusReport,
        ) -> Result<()> {
            self.sent.lock().unwrap().push((
                token.to_string(),
                revision_id.to_string(),
                report.clone(),
            ));
            match &self.error {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    struct Harness {
        resolver: Arc<FakeResolver>,
        credentials: Arc<FakeCredentials>,
        reporter: Arc<RecordingReporter>,
        relay: StatusRelay,
    }

    fn harness(
        resolver: FakeResolver,
        credentials: FakeCredentials,
        reporter: RecordingReporter,
    ) -> Harness {
        let config = Config::new("https://bitbucket.example.com".to_string());
        harness_with(config, resolver, credentials, reporter)
    }

    fn harness_with(
        config: Config,
        resolver: FakeResolver,
        credentials: FakeCredentials,
        reporter: RecordingReporter,
    ) -> Harness {
        let resolver = Arc::new(resolver);
        let credentials = Arc::new(credentials);
        let reporter = Arc::new(reporter);
        let relay = StatusRelay::new(
            &config,
            resolver.clone(),
            credentials.clone(),
            reporter.clone(),
        );
        Harness {
            resolver,
            credentials,
            reporter,
            relay,
        }
    }

    fn event(state: &str) -> serde_json::Value {
        json!({
            "detail-type": "CodePipeline Action Execution State Change",
            "source": "aws.codepipeline",
            "time": "2024-03-01T12:00:00Z",
            "region": "eu-west-1",
            "detail": {
                "pipeline": "svc",
                "execution-id": "e1",
                "stage": "Build",
                "action": "Build",
                "state": state
            }
        })
    }

    #[tokio::test]
    async fn test_succeeded_event_is_reported() {
        let h = harness(
            FakeResolver::with(vec![("Source", "fff000"), ("Build", "abc123")]),
            FakeCredentials::default(),
            RecordingReporter::default(),
        );

        let delivery = h.relay.handle(&event("SUCCEEDED")).await.unwrap();

        assert_eq!(delivery.revision_id, "abc123");
        assert_eq!(delivery.report.state, BuildState::Successful);
        assert_eq!(delivery.report.key, "svc:Build");

        let sent = h.reporter.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "tok");
        assert_eq!(sent[0].1, "abc123");
        assert_eq!(sent[0].2, delivery.report);
    }

    #[tokio::test]
    async fn test_missing_revision_fails_without_reporting() {
        let h = harness(
            FakeResolver::with(vec![("Source", "fff000")]),
            FakeCredentials::default(),
            RecordingReporter::default(),
        );

        let failure = h.relay.handle(&event("SUCCEEDED")).await.unwrap_err();

        assert_eq!(failure.state, HandlerState::Resolving);
        assert_eq!(failure.error.kind(), ErrorKind::RevisionNotFound);
        assert_eq!(h.credentials.calls.load(Ordering::SeqCst), 0);
        assert!(h.reporter.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_revision_is_ambiguous() {
        let h = harness(
            FakeResolver::with(vec![("Build", "abc123"), ("Build", "def456")]),
            FakeCredentials::default(),
            RecordingReporter::default(),
        );

        let failure = h.relay.handle(&event("FAILED")).await.unwrap_err();

        assert_eq!(failure.error.kind(), ErrorKind::AmbiguousRevision);
        assert!(h.reporter.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_event_makes_no_calls() {
        let h = harness(
            FakeResolver::with(vec![("Build", "abc123")]),
            FakeCredentials::default(),
            RecordingReporter::default(),
        );

        let failure = h
            .relay
            .handle(&json!({ "detail": { "pipeline": "svc" } }))
            .await
            .unwrap_err();

        assert_eq!(failure.state, HandlerState::Received);
        assert_eq!(failure.error.kind(), ErrorKind::MalformedEvent);
        assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.credentials.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_started_event_is_unmapped() {
        let h = harness(
            FakeResolver::with(vec![("Build", "abc123")]),
            FakeCredentials::default(),
            RecordingReporter::default(),
        );

        let failure = h.relay.handle(&event("STARTED")).await.unwrap_err();

        assert_eq!(failure.state, HandlerState::Mapping);
        assert_eq!(failure.error.kind(), ErrorKind::UnmappedState);
        assert_eq!(h.credentials.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_credential_failure() {
        let h = harness(
            FakeResolver::with(vec![("Build", "abc123")]),
            FakeCredentials {
                fail: true,
                ..Default::default()
            },
            RecordingReporter::default(),
        );

        let failure = h.relay.handle(&event("CANCELED")).await.unwrap_err();

        assert_eq!(failure.state, HandlerState::Authenticating);
        assert_eq!(failure.error.kind(), ErrorKind::Credential);
        assert!(h.reporter.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reporter_error_is_carried_through() {
        let error = RelayError::RevisionUnknown {
            revision: "abc123".to_string(),
        };
        let h = harness(
            FakeResolver::with(vec![("Build", "abc123")]),
            FakeCredentials::default(),
            RecordingReporter {
                error: Some(error.clone()),
                ..Default::default()
            },
        );

        let failure = h.relay.handle(&event("FAILED")).await.unwrap_err();

        assert_eq!(failure.state, HandlerState::Reporting);
        assert_eq!(failure.error, error);
    }

    #[tokio::test]
    async fn test_same_event_twice_sends_identical_reports() {
        let h = harness(
            FakeResolver::with(vec![("Build", "abc123")]),
            FakeCredentials::default(),
            RecordingReporter::default(),
        );

        h.relay.handle(&event("CANCELED")).await.unwrap();
        h.relay.handle(&event("CANCELED")).await.unwrap();

        let sent = h.reporter.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], sent[1]);
        assert_eq!(sent[0].2.state, BuildState::Stopped);
    }

    #[tokio::test]
    async fn test_deadline_bounds_resolution() {
        let mut config = Config::new("https://bitbucket.example.com".to_string());
        config.invocation_timeout = Duration::from_millis(20);
        let mut resolver = FakeResolver::with(vec![("Build", "abc123")]);
        resolver.delay = Duration::from_secs(5);

        let h = harness_with(
            config,
            resolver,
            FakeCredentials::default(),
            RecordingReporter::default(),
        );

        let failure = h.relay.handle(&event("SUCCEEDED")).await.unwrap_err();

        assert_eq!(failure.state, HandlerState::Resolving);
        assert_eq!(
            failure.error,
            RelayError::Timeout {
                operation: "resolving execution".to_string()
            }
        );
    }

    #[test]
    fn test_failure_display() {
        let failure = HandlerFailure {
            state: HandlerState::Reporting,
            error: RelayError::ReportRejected {
                status: 401,
                message: "Authentication failed".to_string(),
            },
        };
        assert_eq!(
            failure.to_string(),
            "failed while REPORTING: Build status rejected (status 401): Authentication failed"
        );
    }
}
