//! Data acquisition and aggregation for GitHub repository analytics.
//!
//! The library queries the GitHub REST API for a repository's overview
//! metadata, language composition and weekly commit activity, normalizes
//! every failure into the closed [`ApiError`] taxonomy, and derives the
//! aggregates consumed by presentation layers: language percentages, the
//! weekly commit series and per-weekday totals. Pending and empty states
//! (`Computing`, `Unavailable`, `NoData`) are explicit enum variants rather
//! than missing values.
//!
//! All network access goes through the [`Transport`] trait; the production
//! [`OctocrabTransport`] is configured explicitly through [`ClientConfig`].

mod activity;
mod analysis;
mod config;
mod error;
mod identifier;
mod languages;
mod normalizer;
mod rate_limit;
mod report;
mod retry;
mod summary;
mod transport;

pub use activity::{
    COMPUTING_MESSAGE, CommitActivity, CommitSeries, DAYS_PER_WEEK, WeekRecord, WeeklyCommits,
    aggregate_weeks, fetch_commit_activity, week_start_date,
};
pub use analysis::{
    AnalysisOptions, FetchOutcome, RepositoryAnalysis, RepositoryReport, analyze_batch,
    analyze_identifier, analyze_repository,
};
pub use config::{
    ClientConfig, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS, ListFormat, load_repository_list,
    parse_repository_list,
};
pub use error::{Error, io_error};
pub use identifier::RepositoryIdentifier;
pub use languages::{
    LanguageComposition, LanguageShare, LanguageStats, compute_composition, fetch_languages,
};
pub use normalizer::{ApiError, ApiErrorKind, format_unix_time, normalize};
pub use rate_limit::{RateLimitStatus, check_rate_limit};
pub use report::{compact_count, render_report};
pub use retry::{RetryConfig, poll_commit_activity};
pub use summary::{RepositorySummary, fetch_summary};
pub use transport::{
    Endpoint, Headers, OctocrabTransport, RawResponse, Transport, TransportFailure, header_get,
};
