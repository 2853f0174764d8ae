//! Build-status endpoint

use relay_core::domain::build_status::BuildStatusReport;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::BitbucketClient;
use crate::error::{ClientError, Result};

impl BitbucketClient {
    // =============================================================================
    // Build Status
    // =============================================================================

    /// Report the build status of a commit
    ///
    /// Network failures and 5xx responses are retried according to the retry
    /// policy; once attempts run out the last failure is wrapped in
    /// [`ClientError::DeliveryFailed`]. A 404 yields
    /// [`ClientError::RevisionNotFound`], any other non-2xx response an
    /// [`ClientError::ApiError`], both without retrying.
    ///
    /// # Arguments
    /// * `token` - Bearer token
    /// * `revision_id` - Commit the status applies to
    /// * `report` - The build-status body
    pub async fn report_build_status(
        &self,
        token: &str,
        revision_id: &str,
        report: &BuildStatusReport,
    ) -> Result<()> {
        let url = self.commit_url(revision_id)?;
        let max_attempts = self.retry.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(
                "Posting build status {} for {} to {} (attempt {}/{})",
                report.state, report.key, url, attempt, max_attempts
            );

            let err = match self.post_once(url.clone(), token, revision_id, report).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() => e,
                Err(e) => return Err(e),
            };

            if attempt >= max_attempts {
                return Err(ClientError::DeliveryFailed {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.retry.delay_after(attempt);
            warn!(
                "Build status delivery failed (attempt {}/{}): {}; retrying in {:?}",
                attempt, max_attempts, err, delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn post_once(
        &self,
        url: reqwest::Url,
        token: &str,
        revision_id: &str,
        report: &BuildStatusReport,
    ) -> Result<()> {
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(report)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::RevisionNotFound(revision_id.to_string()));
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ClientError::api_error(status.as_u16(), error_text))
    }
}
