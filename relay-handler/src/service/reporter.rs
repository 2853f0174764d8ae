//! Status reporter
//!
//! Delivers a build-status report to the source-control server.

use async_trait::async_trait;
use relay_client::BitbucketClient;
use relay_core::domain::build_status::BuildStatusReport;
use relay_core::error::{RelayError, Result};

/// Service trait for delivering build-status reports
#[async_trait]
pub trait StatusReporter: Send + Sync {
    /// Posts a report for a commit
    ///
    /// # Arguments
    /// * `token` - Bearer token for the server
    /// * `revision_id` - The commit the report applies to
    /// * `report` - The report body
    async fn report(&self, token: &str, revision_id: &str, report: &BuildStatusReport)
    -> Result<()>;
}

/// Bitbucket Server implementation of StatusReporter
pub struct BitbucketStatusReporter {
    client: BitbucketClient,
}

impl BitbucketStatusReporter {
    pub fn new(client: BitbucketClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusReporter for BitbucketStatusReporter {
    async fn report(
        &self,
        token: &str,
        revision_id: &str,
        report: &BuildStatusReport,
    ) -> Result<()> {
        self.client
            .report_build_status(token, revision_id, report)
            .await
            .map_err(RelayError::from)
    }
}
