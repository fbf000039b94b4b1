// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Advisory snapshot of the core API quota.
///
/// The inspector is best-effort: every failure is logged and reported as
/// `None` so it never blocks an analysis.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    normalizer::format_unix_time,
    transport::{Endpoint, Transport},
};

#[derive(Debug, Deserialize,)]
struct RateLimitPayload
{
    resources: RateLimitResources,
}

#[derive(Debug, Deserialize,)]
struct RateLimitResources
{
    core: CoreQuota,
}

#[derive(Debug, Deserialize,)]
struct CoreQuota
{
    limit:     u64,
    remaining: u64,
    reset:     i64,
}

/// Remaining quota of the core REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct RateLimitStatus
{
    /// Calls left in the current window.
    pub remaining:  u64,
    /// Calls allowed per window.
    pub limit:      u64,
    /// Local `HH:MM:SS` at which the window resets.
    pub reset_time: String,
}

impl std::fmt::Display for RateLimitStatus
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        write!(f, "{}/{} calls remaining, resets at {}", self.remaining, self.limit, self.reset_time)
    }
}

/// Queries the global rate-limit status.
///
/// Returns `None` on transport failure, non-200 status, or an unexpected
/// payload.
///
/// # Example
///
/// ```no_run
/// use repo_insight::{ClientConfig, OctocrabTransport, check_rate_limit};
///
/// # async fn example() -> Result<(), repo_insight::Error> {
/// let transport = OctocrabTransport::new(&ClientConfig::default(),)?;
/// if let Some(status,) = check_rate_limit(&transport,).await {
///     println!("{status}");
/// }
/// # Ok(())
/// # }
/// ```
pub async fn check_rate_limit<T,>(transport: &T,) -> Option<RateLimitStatus,>
where
    T: Transport + ?Sized,
{
    let response = match transport.get(&Endpoint::RateLimit,).await {
        Ok(response,) => response,
        Err(failure,) => {
            debug!("Rate limit check failed: {}", failure);
            return None;
        }
    };

    if response.status != 200 {
        debug!("Rate limit check returned status {}", response.status);
        return None;
    }

    let payload: RateLimitPayload = match serde_json::from_str(&response.body,) {
        Ok(payload,) => payload,
        Err(e,) => {
            debug!("Rate limit payload did not match the expected shape: {}", e);
            return None;
        }
    };

    let core = payload.resources.core;
    let reset_time = format_unix_time(core.reset,)?;

    Some(RateLimitStatus {
        remaining: core.remaining,
        limit: core.limit,
        reset_time,
    },)
}
