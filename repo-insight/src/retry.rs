// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Caller-side re-invocation while commit statistics are computing.
///
/// The fetchers never retry on their own. This helper re-invokes
/// [`fetch_commit_activity`] with exponential backoff for as long as GitHub
/// answers [`CommitActivity::Computing`]. Errors are returned immediately.
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{
    activity::{CommitActivity, fetch_commit_activity},
    normalizer::ApiError,
    transport::Transport,
    RepositoryIdentifier,
};

/// Configuration for re-invocation with exponential backoff.
#[derive(Debug, Clone,)]
pub struct RetryConfig
{
    /// Maximum number of fetch attempts (default: 3).
    pub max_attempts:     u32,
    /// Initial delay between attempts in milliseconds (default: 1000).
    pub initial_delay_ms: u64,
    /// Multiplier for exponential backoff (default: 2.0).
    pub backoff_factor:   f64,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            max_attempts: 3, initial_delay_ms: 1000, backoff_factor: 2.0,
        }
    }
}

impl RetryConfig
{
    /// Configuration that performs exactly one attempt.
    pub fn single_attempt() -> Self
    {
        Self {
            max_attempts: 1, ..Self::default()
        }
    }
}

/// Fetches commit activity, re-invoking while statistics are computing.
///
/// # Arguments
///
/// * `transport` - Transport used for every attempt
/// * `id` - Repository to query
/// * `config` - Attempt budget and backoff
///
/// # Errors
///
/// Returns the first [`ApiError`] encountered; failures are not retried.
///
/// # Example
///
/// ```no_run
/// use repo_insight::{ClientConfig, OctocrabTransport, RepositoryIdentifier, RetryConfig, poll_commit_activity};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = OctocrabTransport::new(&ClientConfig::default(),)?;
/// let id = RepositoryIdentifier::new("octocat", "Hello-World",);
/// let activity = poll_commit_activity(&transport, &id, &RetryConfig::default(),).await?;
/// # Ok(())
/// # }
/// ```
pub async fn poll_commit_activity<T,>(
    transport: &T,
    id: &RepositoryIdentifier,
    config: &RetryConfig,
) -> Result<CommitActivity, ApiError,>
where
    T: Transport + ?Sized,
{
    let max_attempts = config.max_attempts.max(1,);
    let mut attempt = 1;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        let activity = fetch_commit_activity(transport, id,).await?;
        if !activity.is_computing() {
            if attempt > 1 {
                debug!("commit activity for {} ready on attempt {}", id, attempt);
            }
            return Ok(activity,);
        }

        if attempt >= max_attempts {
            warn!("commit activity for {} still computing after {} attempts", id, max_attempts);
            return Ok(activity,);
        }

        debug!(
            "commit activity for {} computing on attempt {}/{}. Retrying in {}ms...",
            id, attempt, max_attempts, delay_ms
        );

        sleep(Duration::from_millis(delay_ms,),).await;
        delay_ms = (delay_ms as f64 * config.backoff_factor) as u64;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::{ApiErrorKind, transport::mock::MockTransport};

    const PATH: &str = "/repos/octocat/Hello-World/stats/commit_activity";
    const READY: &str = r#"[{"days": [0, 1, 0, 0, 0, 0, 0], "total": 1, "week": 1700352000}]"#;

    fn fast_config(max_attempts: u32,) -> RetryConfig
    {
        RetryConfig {
            max_attempts, initial_delay_ms: 10, backoff_factor: 2.0,
        }
    }

    fn octocat() -> RepositoryIdentifier
    {
        RepositoryIdentifier::new("octocat", "Hello-World",)
    }

    #[test]
    fn retry_config_default_values()
    {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_delay_ms, 1000);
        assert_eq!(config.backoff_factor, 2.0);
        assert_eq!(RetryConfig::single_attempt().max_attempts, 1);
    }

    #[tokio::test]
    async fn returns_ready_series_after_computing()
    {
        let transport = MockTransport::new();
        transport.respond(PATH, 202, "",).respond(PATH, 202, "",).respond(PATH, 200, READY,);

        let activity = poll_commit_activity(&transport, &octocat(), &fast_config(3,),)
            .await
            .expect("should become ready",);

        assert!(matches!(activity, CommitActivity::Ready(_)));
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn stops_after_max_attempts_with_computing()
    {
        let transport = MockTransport::new();
        transport.respond(PATH, 202, "",).respond(PATH, 202, "",).respond(PATH, 200, READY,);

        let activity = poll_commit_activity(&transport, &octocat(), &fast_config(2,),)
            .await
            .expect("computing is not an error",);

        assert!(activity.is_computing());
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn errors_are_not_retried()
    {
        let transport = MockTransport::new();
        transport.respond(PATH, 404, "",).respond(PATH, 200, READY,);

        let error = poll_commit_activity(&transport, &octocat(), &fast_config(3,),)
            .await
            .expect_err("not found",);

        assert_eq!(error.kind(), ApiErrorKind::NotFound);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_fetches_once()
    {
        let transport = MockTransport::new();
        transport.respond(PATH, 202, "",);

        let activity =
            poll_commit_activity(&transport, &octocat(), &fast_config(0,),).await.expect("computing",);

        assert!(activity.is_computing());
        assert_eq!(transport.requests().len(), 1);
    }
}
