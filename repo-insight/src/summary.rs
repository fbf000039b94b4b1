// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Repository overview metadata.
///
/// Fetches `/repos/{owner}/{name}` and shapes the payload into a
/// [`RepositorySummary`] with calendar dates.
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    normalizer::{ApiError, decode_payload, ensure_success},
    transport::{Endpoint, Transport},
    RepositoryIdentifier,
};

/// Timestamp format used by the API for `created_at` / `updated_at`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const MISSING_DESCRIPTION: &str = "No description available";
const MISSING_LANGUAGE: &str = "Not specified";

#[derive(Debug, Deserialize,)]
struct RepositoryPayload
{
    name:             String,
    #[serde(default = "missing_description")]
    description:      Option<String,>,
    stargazers_count: u64,
    forks_count:      u64,
    watchers_count:   u64,
    #[serde(default = "missing_language")]
    language:         Option<String,>,
    created_at:       String,
    updated_at:       String,
}

fn missing_description() -> Option<String,>
{
    Some(MISSING_DESCRIPTION.to_owned(),)
}

fn missing_language() -> Option<String,>
{
    Some(MISSING_LANGUAGE.to_owned(),)
}

/// Overview metadata of a repository.
///
/// A payload without a `description` or `language` key reports the
/// placeholders `"No description available"` and `"Not specified"`; an
/// explicit `null` stays `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct RepositorySummary
{
    /// Repository name as reported by the API.
    pub name:             String,
    /// Free-form description.
    pub description:      Option<String,>,
    /// Number of stargazers.
    pub star_count:       u64,
    /// Number of forks.
    pub fork_count:       u64,
    /// Number of watchers.
    pub watcher_count:    u64,
    /// Dominant language detected by GitHub.
    pub primary_language: Option<String,>,
    /// Creation date, serialized as `YYYY-MM-DD`.
    pub created_at:       NaiveDate,
    /// Last update date, serialized as `YYYY-MM-DD`.
    pub updated_at:       NaiveDate,
}

/// Fetches the overview metadata of a repository.
///
/// # Errors
///
/// Returns the normalized [`ApiError`] for non-2xx statuses and transport
/// failures, and an [`ApiErrorKind::Other`](crate::ApiErrorKind::Other) error
/// when a required field is missing or a timestamp does not match
/// `YYYY-MM-DDTHH:MM:SSZ`.
///
/// # Example
///
/// ```no_run
/// use repo_insight::{ClientConfig, OctocrabTransport, RepositoryIdentifier, fetch_summary};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = OctocrabTransport::new(&ClientConfig::default(),)?;
/// let id = RepositoryIdentifier::new("octocat", "Hello-World",);
/// let summary = fetch_summary(&transport, &id,).await?;
/// println!("{} has {} stars", summary.name, summary.star_count);
/// # Ok(())
/// # }
/// ```
pub async fn fetch_summary<T,>(
    transport: &T,
    id: &RepositoryIdentifier,
) -> Result<RepositorySummary, ApiError,>
where
    T: Transport + ?Sized,
{
    debug!("Fetching repository summary for {}", id);

    let response = transport.get(&Endpoint::Repository(id,),).await?;
    let response = ensure_success(response,)?;
    let payload: RepositoryPayload = decode_payload(&response,)?;

    Ok(RepositorySummary {
        created_at:       parse_date(&payload.created_at, "created_at",)?,
        updated_at:       parse_date(&payload.updated_at, "updated_at",)?,
        name:             payload.name,
        description:      payload.description,
        star_count:       payload.stargazers_count,
        fork_count:       payload.forks_count,
        watcher_count:    payload.watchers_count,
        primary_language: payload.language,
    },)
}

fn parse_date(raw: &str, field: &str,) -> Result<NaiveDate, ApiError,>
{
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT,)
        .map(|timestamp| timestamp.date(),)
        .map_err(|e| ApiError::malformed_payload(format!("{field} '{raw}' is not a valid timestamp: {e}"),),)
}
