// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Per-repository analysis combining the three fetchers.
//!
//! The summary, language and commit activity fetches are independent: they
//! run concurrently on the current task and each keeps its own outcome, so a
//! failure in one never hides the others. Batches are processed one
//! repository at a time in input order.

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    activity::CommitActivity,
    identifier::RepositoryIdentifier,
    languages::{LanguageStats, fetch_languages},
    normalizer::ApiError,
    retry::{RetryConfig, poll_commit_activity},
    summary::{RepositorySummary, fetch_summary},
    transport::Transport,
};

/// Result of one fetch inside an analysis.
#[derive(Debug, Clone, PartialEq, Serialize,)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome<T,>
{
    /// The fetch produced a value.
    Success(T,),
    /// The fetch failed with a normalized error.
    Failure(ApiError,),
}

impl<T,> FetchOutcome<T,>
{
    /// Borrows the outcome as a `Result`.
    pub fn as_result(&self,) -> Result<&T, &ApiError,>
    {
        match self {
            Self::Success(value,) => Ok(value,),
            Self::Failure(error,) => Err(error,),
        }
    }

    /// Converts the outcome into a `Result`.
    pub fn into_result(self,) -> Result<T, ApiError,>
    {
        match self {
            Self::Success(value,) => Ok(value,),
            Self::Failure(error,) => Err(error,),
        }
    }
}

impl<T,> From<Result<T, ApiError,>,> for FetchOutcome<T,>
{
    fn from(result: Result<T, ApiError,>,) -> Self
    {
        match result {
            Ok(value,) => Self::Success(value,),
            Err(error,) => Self::Failure(error,),
        }
    }
}

/// Outcomes of the three fetches for one repository.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct RepositoryAnalysis
{
    /// Repository that was analyzed.
    pub repository:      RepositoryIdentifier,
    /// Overview metadata.
    pub summary:         FetchOutcome<RepositorySummary,>,
    /// Language composition.
    pub languages:       FetchOutcome<LanguageStats,>,
    /// Weekly commit activity.
    pub commit_activity: FetchOutcome<CommitActivity,>,
}

/// Report produced for one input URL.
#[derive(Debug, Clone, PartialEq, Serialize,)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepositoryReport
{
    /// The URL does not reference a GitHub repository.
    InvalidUrl
    {
        /// Input as supplied.
        url: String,
    },
    /// The repository was analyzed.
    Analyzed
    {
        /// Input as supplied.
        url:      String,
        /// Per-fetch outcomes.
        analysis: RepositoryAnalysis,
    },
}

impl RepositoryReport
{
    /// Input URL the report was produced for.
    pub fn url(&self,) -> &str
    {
        match self {
            Self::InvalidUrl {
                url,
            }
            | Self::Analyzed {
                url, ..
            } => url,
        }
    }
}

/// Knobs applied to every analysis.
#[derive(Debug, Clone,)]
pub struct AnalysisOptions
{
    /// Re-invocation budget while commit statistics are computing.
    pub commit_activity_retry: RetryConfig,
}

impl Default for AnalysisOptions
{
    fn default() -> Self
    {
        Self {
            commit_activity_retry: RetryConfig::single_attempt(),
        }
    }
}

/// Runs the three fetches for an already extracted identifier.
pub async fn analyze_identifier<T,>(
    transport: &T,
    id: &RepositoryIdentifier,
    options: &AnalysisOptions,
) -> RepositoryAnalysis
where
    T: Transport + ?Sized,
{
    let (summary, languages, commit_activity,) = tokio::join!(
        fetch_summary(transport, id),
        fetch_languages(transport, id),
        poll_commit_activity(transport, id, &options.commit_activity_retry),
    );

    for (label, error,) in [
        ("summary", summary.as_ref().err(),),
        ("languages", languages.as_ref().err(),),
        ("commit activity", commit_activity.as_ref().err(),),
    ] {
        if let Some(error,) = error {
            warn!("{} fetch for {} failed: {}", label, id, error);
        }
    }

    RepositoryAnalysis {
        repository:      id.clone(),
        summary:         summary.into(),
        languages:       languages.into(),
        commit_activity: commit_activity.into(),
    }
}

/// Extracts the identifier from `url` and analyzes the repository.
///
/// # Example
///
/// ```no_run
/// use repo_insight::{AnalysisOptions, ClientConfig, OctocrabTransport, analyze_repository};
///
/// # async fn example() -> Result<(), repo_insight::Error> {
/// let transport = OctocrabTransport::new(&ClientConfig::default(),)?;
/// let report = analyze_repository(
///     &transport,
///     "https://github.com/octocat/Hello-World",
///     &AnalysisOptions::default(),
/// )
/// .await;
/// println!("{}", serde_json::to_string_pretty(&report,)?);
/// # Ok(())
/// # }
/// ```
pub async fn analyze_repository<T,>(transport: &T, url: &str, options: &AnalysisOptions,) -> RepositoryReport
where
    T: Transport + ?Sized,
{
    let Some(id,) = RepositoryIdentifier::extract(url,) else {
        warn!("Invalid repository URL format: {}", url);
        return RepositoryReport::InvalidUrl {
            url: url.to_owned(),
        };
    };

    let analysis = analyze_identifier(transport, &id, options,).await;
    RepositoryReport::Analyzed {
        url: url.to_owned(),
        analysis,
    }
}

/// Analyzes each URL in order, one repository at a time.
///
/// `on_report` is invoked after each repository with its index and report.
/// A failing repository never aborts the batch.
pub async fn analyze_batch<T, S, F,>(
    transport: &T,
    urls: &[S],
    options: &AnalysisOptions,
    mut on_report: F,
) -> Vec<RepositoryReport,>
where
    T: Transport + ?Sized,
    S: AsRef<str,>,
    F: FnMut(usize, &RepositoryReport,),
{
    info!("Analyzing {} repositories", urls.len());

    let mut reports = Vec::with_capacity(urls.len(),);
    for (index, url,) in urls.iter().enumerate() {
        let report = analyze_repository(transport, url.as_ref(), options,).await;
        on_report(index, &report,);
        reports.push(report,);
    }

    reports
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::{ApiErrorKind, transport::mock::MockTransport};

    const SUMMARY: &str = r#"{"name":"Hello-World","description":null,"stargazers_count":3,
        "forks_count":1,"watchers_count":3,"language":"Python",
        "created_at":"2011-01-26T19:01:12Z","updated_at":"2024-05-01T08:00:00Z"}"#;

    fn octocat_routes(transport: &MockTransport,)
    {
        transport
            .respond("/repos/octocat/Hello-World", 200, SUMMARY,)
            .respond("/repos/octocat/Hello-World/languages", 200, r#"{"Python": 300, "JavaScript": 100}"#,)
            .respond("/repos/octocat/Hello-World/stats/commit_activity", 202, "",);
    }

    #[tokio::test]
    async fn collects_all_three_outcomes()
    {
        let transport = MockTransport::new();
        octocat_routes(&transport,);

        let report = analyze_repository(
            &transport,
            "https://github.com/octocat/Hello-World",
            &AnalysisOptions::default(),
        )
        .await;

        let RepositoryReport::Analyzed {
            analysis, ..
        } = report
        else {
            panic!("expected analyzed report");
        };

        assert_eq!(analysis.summary.as_result().expect("summary").star_count, 3);
        assert!(matches!(analysis.languages, FetchOutcome::Success(LanguageStats::Available(_))));
        assert!(matches!(analysis.commit_activity, FetchOutcome::Success(CommitActivity::Computing { .. })));
    }

    #[tokio::test]
    async fn failures_are_isolated_per_fetch()
    {
        let transport = MockTransport::new();
        transport
            .respond("/repos/octocat/Hello-World", 200, SUMMARY,)
            .respond("/repos/octocat/Hello-World/languages", 500, "oops",)
            .respond(
                "/repos/octocat/Hello-World/stats/commit_activity",
                200,
                r#"[{"days": [1, 0, 0, 0, 0, 0, 0], "total": 1, "week": 1700352000}]"#,
            );

        let id = RepositoryIdentifier::new("octocat", "Hello-World",);
        let analysis = analyze_identifier(&transport, &id, &AnalysisOptions::default(),).await;

        assert!(analysis.summary.as_result().is_ok());
        let language_error = analysis.languages.as_result().expect_err("languages should fail",);
        assert_eq!(language_error.kind(), ApiErrorKind::Other);
        assert!(matches!(
            analysis.commit_activity.into_result(),
            Ok(CommitActivity::Ready(ref series)) if series.total_commits == 1
        ));
    }

    #[tokio::test]
    async fn summary_failure_does_not_skip_other_fetches()
    {
        let transport = MockTransport::new();
        transport
            .respond("/repos/octocat/Hello-World", 403, "",)
            .respond("/repos/octocat/Hello-World/languages", 200, "{}",)
            .respond("/repos/octocat/Hello-World/stats/commit_activity", 200, "[]",);

        let id = RepositoryIdentifier::new("octocat", "Hello-World",);
        let analysis = analyze_identifier(&transport, &id, &AnalysisOptions::default(),).await;

        assert_eq!(
            analysis.summary.as_result().expect_err("rate limited").kind(),
            ApiErrorKind::RateLimited
        );
        assert_eq!(analysis.languages, FetchOutcome::Success(LanguageStats::NoData));
        assert_eq!(analysis.commit_activity, FetchOutcome::Success(CommitActivity::Unavailable));
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn batch_preserves_order_and_isolates_invalid_urls()
    {
        let transport = MockTransport::new();
        octocat_routes(&transport,);

        let urls = ["not a url", "https://github.com/octocat/Hello-World.git", "https://github.com/ghost/missing"];
        let mut seen = Vec::new();
        let reports = analyze_batch(&transport, &urls, &AnalysisOptions::default(), |index, report| {
            seen.push((index, report.url().to_owned(),),);
        },)
        .await;

        assert_eq!(reports.len(), 3);
        assert!(matches!(reports[0], RepositoryReport::InvalidUrl { .. }));
        assert!(matches!(reports[1], RepositoryReport::Analyzed { .. }));
        let RepositoryReport::Analyzed {
            analysis, ..
        } = &reports[2]
        else {
            panic!("expected analyzed report");
        };
        assert!(analysis.summary.as_result().is_err());
        assert!(analysis.languages.as_result().is_err());
        assert!(analysis.commit_activity.as_result().is_err());
        assert_eq!(seen.iter().map(|(index, _,)| *index,).collect::<Vec<_,>>(), vec![0, 1, 2]);
        assert_eq!(seen[1].1, "https://github.com/octocat/Hello-World.git");
    }

    #[derive(Clone, Default,)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8,>,>,>,);

    impl CapturedLogs
    {
        fn lines(&self,) -> Vec<String,>
        {
            let buffer = self.0.lock().expect("log buffer poisoned",);
            String::from_utf8_lossy(&buffer,).lines().map(str::to_owned,).collect()
        }
    }

    impl std::io::Write for CapturedLogs
    {
        fn write(&mut self, buf: &[u8],) -> std::io::Result<usize,>
        {
            self.0.lock().expect("log buffer poisoned",).extend_from_slice(buf,);
            Ok(buf.len(),)
        }

        fn flush(&mut self,) -> std::io::Result<(),>
        {
            Ok((),)
        }
    }

    impl<'a,> tracing_subscriber::fmt::MakeWriter<'a,> for CapturedLogs
    {
        type Writer = CapturedLogs;

        fn make_writer(&'a self,) -> Self::Writer
        {
            self.clone()
        }
    }

    #[tokio::test]
    async fn each_failed_fetch_is_warned_once()
    {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone(),)
            .with_max_level(tracing::Level::WARN,)
            .with_ansi(false,)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber,);

        let transport = MockTransport::new();
        transport
            .respond("/repos/octocat/Hello-World", 404, "",)
            .respond("/repos/octocat/Hello-World/languages", 200, "{}",)
            .respond("/repos/octocat/Hello-World/stats/commit_activity", 200, "[]",);

        let id = RepositoryIdentifier::new("octocat", "Hello-World",);
        analyze_identifier(&transport, &id, &AnalysisOptions::default(),).await;

        let warnings = logs.lines();
        assert_eq!(warnings.len(), 1, "unexpected warnings: {warnings:?}");
        assert!(warnings[0].contains("summary fetch for octocat/Hello-World failed"));
    }

    #[test]
    fn reports_serialize_with_status_tags()
    {
        let report = RepositoryReport::InvalidUrl {
            url: "nope".to_owned(),
        };
        let json = serde_json::to_value(&report,).expect("serialize",);
        assert_eq!(json, serde_json::json!({"status": "invalid_url", "url": "nope"}));

        let outcome: FetchOutcome<u8,> = Ok(1,).into();
        assert_eq!(serde_json::to_value(&outcome).expect("serialize"), serde_json::json!({"success": 1}));
    }
}
