// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Weekly commit activity over the last year.
///
/// Fetches `/repos/{owner}/{name}/stats/commit_activity`, which GitHub
/// computes lazily: the first request may answer `202 Accepted` while the
/// statistics are being generated. That state is reported as
/// [`CommitActivity::Computing`] and left to the caller to re-invoke.
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    normalizer::{ApiError, decode_payload, ensure_success},
    transport::{Endpoint, Transport},
    RepositoryIdentifier,
};

/// Number of weekday slots, Sunday first.
pub const DAYS_PER_WEEK: usize = 7;

/// Message returned while GitHub computes the statistics.
pub const COMPUTING_MESSAGE: &str =
    "GitHub is computing statistics. Please wait a moment and try again.";

/// Raw weekly record as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize,)]
pub struct WeekRecord
{
    /// Unix timestamp of the week start (Sunday 00:00 UTC).
    pub week:  i64,
    /// Commits during the week.
    pub total: u64,
    /// Commits per weekday, Sunday first.
    #[serde(default)]
    pub days:  Option<Vec<u64,>,>,
}

/// Commit count for one week of the series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct WeeklyCommits
{
    /// Week start date in the local time zone, serialized as `YYYY-MM-DD`.
    /// Week start date, serialized as `YYYY-MM-DD`.
    pub week_start: NaiveDate,
    /// Commits during the week.
    pub commits:    u64,
}

/// Aggregated commit activity.
///
/// Invariant: `total_commits` equals both the sum of `weeks[].commits` and
/// the sum of `daily_commits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct CommitSeries
{
    /// Commits over the whole series.
    pub total_commits: u64,
    /// Weekly counts in the order returned by the API.
    pub weeks:         Vec<WeeklyCommits,>,
    /// Commits per weekday summed over all weeks, Sunday = 0 .. Saturday = 6.
    pub daily_commits: [u64; DAYS_PER_WEEK],
}

/// Outcome of a commit activity fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommitActivity
{
    /// GitHub has not finished computing the statistics.
    Computing
    {
        /// Human readable hint to try again later.
        message: String,
    },
    /// No activity data exists, e.g. for an empty repository.
    Unavailable,
    /// Statistics are available.
    Ready(CommitSeries,),
}

impl CommitActivity
{
    /// Returns `true` while statistics are still being computed.
    pub fn is_computing(&self,) -> bool
    {
        matches!(self, Self::Computing { .. })
    }
}

/// Aggregates raw weekly records into a [`CommitActivity`].
///
/// An empty series yields [`CommitActivity::Unavailable`].
///
/// # Errors
///
/// Returns an [`ApiErrorKind::Other`](crate::ApiErrorKind::Other) error when
/// a week lacks its per-day breakdown, the breakdown does not have seven
/// entries, the per-day counts do not add up to the week total, or the week
/// timestamp is out of range. Counts whose sum does not fit in `u64` are
/// rejected the same way.
///
/// # Examples
///
/// ```
/// use repo_insight::{CommitActivity, WeekRecord, aggregate_weeks};
///
/// let weeks = vec![
///     WeekRecord { week: 1_700_352_000, total: 5, days: Some(vec![1, 0, 0, 0, 0, 0, 4],), },
///     WeekRecord { week: 1_700_956_800, total: 3, days: Some(vec![0, 1, 1, 0, 0, 1, 0],), },
/// ];
/// let CommitActivity::Ready(series,) = aggregate_weeks(&weeks,)? else {
///     panic!("expected a ready series");
/// };
/// assert_eq!(series.total_commits, 8);
/// assert_eq!(series.daily_commits, [1, 1, 1, 0, 0, 1, 4]);
/// # Ok::<(), repo_insight::ApiError>(())
/// ```
pub fn aggregate_weeks(records: &[WeekRecord],) -> Result<CommitActivity, ApiError,>
{
    if records.is_empty() {
        return Ok(CommitActivity::Unavailable,);
    }

    let mut total_commits = 0u64;
    let mut daily_commits = [0u64; DAYS_PER_WEEK];
    let mut weeks = Vec::with_capacity(records.len(),);

    for record in records {
        let days = record.days.as_deref().ok_or_else(|| {
            ApiError::malformed_payload(format!("week {} has no per-day breakdown", record.week),)
        },)?;

        if days.len() != DAYS_PER_WEEK {
            return Err(ApiError::malformed_payload(format!(
                "week {} has {} per-day entries, expected {DAYS_PER_WEEK}",
                record.week,
                days.len()
            ),),);
        }

        let day_sum = days
            .iter()
            .try_fold(0u64, |sum, &count| sum.checked_add(count,),)
            .ok_or_else(|| overflow(record.week,),)?;
        if day_sum != record.total {
            return Err(ApiError::malformed_payload(format!(
                "week {} total {} does not match per-day sum {day_sum}",
                record.week, record.total
            ),),);
        }

        let week_start = week_start_date(record.week,).ok_or_else(|| {
            ApiError::malformed_payload(format!("week timestamp {} is out of range", record.week),)
        },)?;

        for (slot, count,) in daily_commits.iter_mut().zip(days,) {
            *slot = slot.checked_add(*count,).ok_or_else(|| overflow(record.week,),)?;
        }
        total_commits = total_commits.checked_add(record.total,).ok_or_else(|| overflow(record.week,),)?;
        weeks.push(WeeklyCommits {
            week_start,
            commits: record.total,
        },);
    }

    Ok(CommitActivity::Ready(CommitSeries {
        total_commits,
        weeks,
        daily_commits,
    },),)
}

/// Calendar date, in the local time zone, of a week's Unix timestamp.
///
/// Returns `None` when the timestamp is out of range.
pub fn week_start_date(seconds: i64,) -> Option<NaiveDate,>
{
    DateTime::from_timestamp(seconds, 0,).map(|utc| utc.with_timezone(&Local,).date_naive(),)
}

fn overflow(week: i64,) -> ApiError
{
    ApiError::malformed_payload(format!("commit counts of week {week} overflow"),)
}

fn is_empty_payload(payload: &Value,) -> bool
{
    match payload {
        Value::Null => true,
        Value::Array(items,) => items.is_empty(),
        Value::Object(fields,) => fields.is_empty(),
        _ => false,
    }
}

/// Fetches the weekly commit activity of a repository.
///
/// A `202 Accepted` answer yields [`CommitActivity::Computing`] without
/// retrying; see [`poll_commit_activity`](crate::poll_commit_activity) for
/// caller-side re-invocation. An empty body, `null`, `[]` or `{}` yields
/// [`CommitActivity::Unavailable`].
///
/// # Errors
///
/// Returns the normalized [`ApiError`] for other non-2xx statuses and
/// transport failures, and the shape errors of [`aggregate_weeks`].
///
/// # Example
///
/// ```no_run
/// use repo_insight::{ClientConfig, CommitActivity, OctocrabTransport, RepositoryIdentifier, fetch_commit_activity};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = OctocrabTransport::new(&ClientConfig::default(),)?;
/// let id = RepositoryIdentifier::new("octocat", "Hello-World",);
/// match fetch_commit_activity(&transport, &id,).await? {
///     CommitActivity::Ready(series,) => println!("{} commits", series.total_commits),
///     CommitActivity::Computing { message, } => println!("{message}"),
///     CommitActivity::Unavailable => println!("no activity"),
/// }
/// # Ok(())
/// # }
/// ```
pub async fn fetch_commit_activity<T,>(
    transport: &T,
    id: &RepositoryIdentifier,
) -> Result<CommitActivity, ApiError,>
where
    T: Transport + ?Sized,
{
    debug!("Fetching commit activity for {}", id);

    let response = transport.get(&Endpoint::CommitActivity(id,),).await?;
    if response.status == 202 {
        info!("Commit statistics for {} are still being computed", id);
        return Ok(CommitActivity::Computing {
            message: COMPUTING_MESSAGE.to_owned(),
        },);
    }

    let response = ensure_success(response,)?;
    if response.body.trim().is_empty() {
        return Ok(CommitActivity::Unavailable,);
    }

    let payload: Value = decode_payload(&response,)?;
    if is_empty_payload(&payload,) {
        return Ok(CommitActivity::Unavailable,);
    }

    let records: Vec<WeekRecord,> = serde_json::from_value(payload,).map_err(ApiError::malformed_payload,)?;
    let activity = aggregate_weeks(&records,)?;

    if let CommitActivity::Ready(series,) = &activity {
        debug!("Aggregated {} weeks with {} commits for {}", series.weeks.len(), series.total_commits, id);
    }

    Ok(activity,)
}
