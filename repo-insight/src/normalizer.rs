#![allow(non_shorthand_field_patterns)]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Normalization of transport outcomes into the [`ApiError`] taxonomy.
//!
//! This module is the only place where HTTP statuses, rate-limit headers and
//! transport failures are translated into error kinds. Fetchers call
//! [`ensure_success`] and [`decode_payload`] instead of inspecting statuses
//! themselves.

use chrono::{DateTime, Local};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::transport::{RawResponse, TransportFailure, header_get};

/// Header carrying the number of calls left in the current window.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "X-RateLimit-Remaining";
/// Header carrying the Unix timestamp at which the window resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Reset";
/// Placeholder printed when rate-limit metadata is absent.
pub const UNKNOWN: &str = "Unknown";

/// Closed set of failure categories reported by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize,)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind
{
    /// HTTP 404.
    NotFound,
    /// HTTP 403, treated as an exhausted rate limit.
    RateLimited,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 429.
    TooManyRequests,
    /// The transport timed out.
    Timeout,
    /// The transport could not reach the API.
    ConnectionFailure,
    /// Any other status or a payload that does not match the expected shape.
    Other,
}

impl ApiErrorKind
{
    /// Suggestions a presentation layer can show next to the error message.
    pub fn remediation(self,) -> &'static [&'static str]
    {
        match self {
            Self::RateLimited | Self::TooManyRequests => &[
                "Wait until the rate limit resets",
                "Use a GitHub personal access token",
                "Check the API status with the rate-limit command",
            ],
            Self::NotFound => &[
                "Make sure the repository URL is correct",
                "Make sure the repository exists and is public",
                "Check the spelling of the owner and repository name",
            ],
            Self::Unauthorized => &[
                "Make sure you have access to the repository",
                "Use a GitHub personal access token with appropriate scopes",
            ],
            Self::Timeout | Self::ConnectionFailure | Self::Other => &[],
        }
    }
}

/// Normalized failure of a single fetch.
///
/// Instances are immutable and carry the rate-limit metadata found on the
/// failing response, when any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, masterror::Error,)]
#[error("{message}")]
pub struct ApiError
{
    kind:            ApiErrorKind,
    message:         String,
    http_status:     Option<u16,>,
    remaining_calls: Option<u64,>,
    reset_time:      Option<String,>,
}

impl ApiError
{
    /// Failure category.
    pub fn kind(&self,) -> ApiErrorKind
    {
        self.kind
    }

    /// Human readable description.
    pub fn message(&self,) -> &str
    {
        &self.message
    }

    /// HTTP status of the failing response, if a response was received.
    pub fn http_status(&self,) -> Option<u16,>
    {
        self.http_status
    }

    /// Value of `X-RateLimit-Remaining`, when present and numeric.
    pub fn remaining_calls(&self,) -> Option<u64,>
    {
        self.remaining_calls
    }

    /// Local `HH:MM:SS` rendering of `X-RateLimit-Reset`, when present.
    pub fn reset_time(&self,) -> Option<&str,>
    {
        self.reset_time.as_deref()
    }

    /// Error for a 2xx payload that does not match the expected shape.
    pub fn malformed_payload(detail: impl std::fmt::Display,) -> Self
    {
        Self::bare(ApiErrorKind::Other, format!("Unexpected response payload: {detail}"),)
    }

    fn bare(kind: ApiErrorKind, message: String,) -> Self
    {
        Self {
            kind,
            message,
            http_status: None,
            remaining_calls: None,
            reset_time: None,
        }
    }
}

impl From<TransportFailure,> for ApiError
{
    fn from(failure: TransportFailure,) -> Self
    {
        match failure {
            TransportFailure::Timeout {
                ..
            } => Self::bare(ApiErrorKind::Timeout, "Request timed out. Please try again.".to_owned(),),
            TransportFailure::Connection {
                ..
            } => Self::bare(
                ApiErrorKind::ConnectionFailure,
                "Connection error. Please check your internet connection.".to_owned(),
            ),
        }
    }
}

/// Maps a non-2xx response to an [`ApiError`].
///
/// | status | kind |
/// |---|---|
/// | 404 | [`ApiErrorKind::NotFound`] |
/// | 403 | [`ApiErrorKind::RateLimited`] |
/// | 401 | [`ApiErrorKind::Unauthorized`] |
/// | 429 | [`ApiErrorKind::TooManyRequests`] |
/// | other | [`ApiErrorKind::Other`] |
///
/// # Examples
///
/// ```
/// use repo_insight::{ApiErrorKind, normalize};
///
/// let headers = vec![("X-RateLimit-Remaining".to_owned(), "0".to_owned(),)];
/// let error = normalize(403, &headers, "",);
/// assert_eq!(error.kind(), ApiErrorKind::RateLimited);
/// assert_eq!(error.remaining_calls(), Some(0));
/// assert_eq!(error.message(), "Rate limit exceeded. Resets at Unknown. Remaining calls: 0");
/// ```
pub fn normalize(status: u16, headers: &[(String, String,)], body: &str,) -> ApiError
{
    let remaining_raw = header_get(headers, RATE_LIMIT_REMAINING_HEADER,).map(str::trim,);
    let remaining_calls = remaining_raw.and_then(|value| value.parse::<u64,>().ok(),);
    let reset_time = header_get(headers, RATE_LIMIT_RESET_HEADER,).and_then(format_reset_header,);

    let reset_display = reset_time.as_deref().unwrap_or(UNKNOWN,);
    let remaining_display = remaining_raw.unwrap_or(UNKNOWN,);

    let (kind, message,) = match status {
        404 => (ApiErrorKind::NotFound, "Repository not found. Please check the URL.".to_owned(),),
        403 => (
            ApiErrorKind::RateLimited,
            format!(
                "Rate limit exceeded. Resets at {reset_display}. Remaining calls: {remaining_display}"
            ),
        ),
        401 => (
            ApiErrorKind::Unauthorized,
            "Unauthorized access. Please check your credentials.".to_owned(),
        ),
        429 => {
            (ApiErrorKind::TooManyRequests, format!("Too many requests. Please wait until {reset_display}."),)
        }
        other => (ApiErrorKind::Other, format!("GitHub API error: {other} - {body}"),),
    };

    ApiError {
        kind,
        message,
        http_status: Some(status,),
        remaining_calls,
        reset_time,
    }
}

/// Passes 2xx responses through and normalizes everything else.
///
/// # Errors
///
/// Returns the normalized [`ApiError`] for non-2xx statuses.
pub(crate) fn ensure_success(response: RawResponse,) -> Result<RawResponse, ApiError,>
{
    if response.is_success() {
        return Ok(response,);
    }

    let error = normalize(response.status, &response.headers, &response.body,);
    debug!("request failed with status {}: {}", response.status, error);
    Err(error,)
}

/// Decodes a JSON body, reporting shape mismatches as [`ApiErrorKind::Other`].
pub(crate) fn decode_payload<T,>(response: &RawResponse,) -> Result<T, ApiError,>
where
    T: DeserializeOwned,
{
    serde_json::from_str(&response.body,).map_err(|e| {
        debug!("response payload did not match the expected shape: {}", e);
        ApiError::malformed_payload(e,)
    },)
}

/// Renders a Unix timestamp as local `HH:MM:SS`.
///
/// Returns `None` for timestamps outside the supported range.
pub fn format_unix_time(seconds: i64,) -> Option<String,>
{
    let utc = DateTime::from_timestamp(seconds, 0,)?;
    Some(utc.with_timezone(&Local,).format("%H:%M:%S",).to_string(),)
}

fn format_reset_header(raw: &str,) -> Option<String,>
{
    raw.trim().parse::<i64,>().ok().and_then(format_unix_time,)
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;

    use super::{ApiError, ApiErrorKind, decode_payload, ensure_success, format_unix_time, normalize};
    use crate::transport::{RawResponse, TransportFailure};

    fn rate_headers(remaining: &str, reset: &str,) -> Vec<(String, String,),>
    {
        vec![
            ("X-RateLimit-Remaining".to_owned(), remaining.to_owned(),),
            ("X-RateLimit-Reset".to_owned(), reset.to_owned(),),
        ]
    }

    #[test]
    fn not_found_uses_fixed_message()
    {
        let error = normalize(404, &[], "{\"message\":\"Not Found\"}",);
        assert_eq!(error.kind(), ApiErrorKind::NotFound);
        assert_eq!(error.message(), "Repository not found. Please check the URL.");
        assert_eq!(error.http_status(), Some(404));
    }

    #[test]
    fn forbidden_reads_rate_limit_headers()
    {
        let error = normalize(403, &rate_headers("0", "1700000000",), "",);
        let expected_reset = format_unix_time(1_700_000_000,).expect("timestamp in range",);

        assert_eq!(error.kind(), ApiErrorKind::RateLimited);
        assert_eq!(error.remaining_calls(), Some(0));
        assert_eq!(error.reset_time(), Some(expected_reset.as_str()));
        assert_eq!(
            error.message(),
            format!("Rate limit exceeded. Resets at {expected_reset}. Remaining calls: 0")
        );
    }

    #[test]
    fn forbidden_without_headers_reports_unknown()
    {
        let error = normalize(403, &[], "",);
        assert_eq!(error.remaining_calls(), None);
        assert_eq!(error.reset_time(), None);
        assert_eq!(error.message(), "Rate limit exceeded. Resets at Unknown. Remaining calls: Unknown");
    }

    #[test]
    fn unparsable_reset_header_is_unknown()
    {
        let error = normalize(429, &rate_headers("12", "soon",), "",);
        assert_eq!(error.kind(), ApiErrorKind::TooManyRequests);
        assert_eq!(error.reset_time(), None);
        assert_eq!(error.remaining_calls(), Some(12));
        assert_eq!(error.message(), "Too many requests. Please wait until Unknown.");
    }

    #[test]
    fn unauthorized_has_generic_message()
    {
        let error = normalize(401, &[], "Bad credentials",);
        assert_eq!(error.kind(), ApiErrorKind::Unauthorized);
        assert!(error.message().contains("credentials"));
    }

    #[test]
    fn other_statuses_include_status_and_body()
    {
        let error = normalize(500, &[], "boom",);
        assert_eq!(error.kind(), ApiErrorKind::Other);
        assert_eq!(error.message(), "GitHub API error: 500 - boom");
        assert_eq!(error.to_string(), error.message());
    }

    #[test]
    fn transport_failures_bypass_status_table()
    {
        let timeout: ApiError = TransportFailure::Timeout {
            after: std::time::Duration::from_secs(10,),
        }
        .into();
        assert_eq!(timeout.kind(), ApiErrorKind::Timeout);
        assert!(timeout.message().contains("try again"));
        assert_eq!(timeout.http_status(), None);

        let connection: ApiError = TransportFailure::connection("refused",).into();
        assert_eq!(connection.kind(), ApiErrorKind::ConnectionFailure);
        assert_eq!(connection.http_status(), None);
    }

    #[test]
    fn ensure_success_passes_2xx_through()
    {
        let response = RawResponse {
            status: 200, headers: Vec::new(), body: "{}".to_owned(),
        };
        assert!(ensure_success(response).is_ok());

        let failing = RawResponse {
            status: 404, headers: Vec::new(), body: String::new(),
        };
        let error = ensure_success(failing,).expect_err("404 should fail",);
        assert_eq!(error.kind(), ApiErrorKind::NotFound);
    }

    #[test]
    fn decode_payload_reports_shape_errors_as_other()
    {
        let response = RawResponse {
            status: 200, headers: Vec::new(), body: "[1, 2]".to_owned(),
        };
        let error = decode_payload::<std::collections::BTreeMap<String, u64,>,>(&response,)
            .expect_err("array is not a map",);
        assert_eq!(error.kind(), ApiErrorKind::Other);
        assert!(error.message().starts_with("Unexpected response payload:"));
    }

    #[test]
    fn remediation_hints_exist_for_actionable_kinds()
    {
        assert!(!ApiErrorKind::RateLimited.remediation().is_empty());
        assert!(!ApiErrorKind::NotFound.remediation().is_empty());
        assert!(!ApiErrorKind::Unauthorized.remediation().is_empty());
        assert!(ApiErrorKind::Other.remediation().is_empty());
    }

    #[test]
    fn kinds_serialize_as_snake_case()
    {
        let json = serde_json::to_string(&ApiErrorKind::TooManyRequests,).expect("serialize",);
        assert_eq!(json, "\"too_many_requests\"");
    }

    proptest! {
        #[test]
        fn not_found_is_independent_of_body_and_headers(body in ".{0,64}", remaining in "[0-9]{1,4}") {
            let headers = vec![("X-RateLimit-Remaining".to_owned(), remaining)];
            let error = normalize(404, &headers, &body);
            prop_assert_eq!(error.kind(), ApiErrorKind::NotFound);
        }

        #[test]
        fn formatted_reset_time_has_clock_shape(seconds in 0i64..4_102_444_800) {
            let formatted = format_unix_time(seconds).expect("in range");
            prop_assert_eq!(formatted.len(), 8);
            prop_assert_eq!(formatted.as_bytes()[2], b':');
            prop_assert_eq!(formatted.as_bytes()[5], b':');
        }
    }
}
