// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! HTTP transport boundary for the GitHub REST API.
//!
//! Fetchers never talk to the network directly: they describe an [`Endpoint`]
//! and hand it to a [`Transport`]. The production implementation wraps an
//! [`Octocrab`] client and enforces a per-call timeout; tests substitute an
//! in-memory transport. Every non-2xx response is returned as-is, headers
//! included, so rate-limit metadata survives until the error normalizer.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use tokio::time::timeout;
use tracing::debug;

use crate::{ClientConfig, Error, RepositoryIdentifier};

/// Response headers as name/value pairs in the order received.
pub type Headers = Vec<(String, String,),>;

/// Remote resources queried by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum Endpoint<'id,>
{
    /// Repository metadata: `/repos/{owner}/{name}`.
    Repository(&'id RepositoryIdentifier,),
    /// Per-language byte counts: `/repos/{owner}/{name}/languages`.
    Languages(&'id RepositoryIdentifier,),
    /// Weekly commit activity: `/repos/{owner}/{name}/stats/commit_activity`.
    CommitActivity(&'id RepositoryIdentifier,),
    /// Global quota status: `/rate_limit`.
    RateLimit,
}

impl Endpoint<'_,>
{
    /// Returns the request path relative to the API base.
    pub fn path(&self,) -> String
    {
        match self {
            Self::Repository(id,) => format!("/repos/{}/{}", id.owner(), id.name()),
            Self::Languages(id,) => format!("/repos/{}/{}/languages", id.owner(), id.name()),
            Self::CommitActivity(id,) => {
                format!("/repos/{}/{}/stats/commit_activity", id.owner(), id.name())
            }
            Self::RateLimit => "/rate_limit".to_owned(),
        }
    }
}

impl fmt::Display for Endpoint<'_,>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str(&self.path(),)
    }
}

/// Raw outcome of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RawResponse
{
    /// HTTP status code.
    pub status:  u16,
    /// Response headers.
    pub headers: Headers,
    /// Response body decoded as UTF-8 text.
    pub body:    String,
}

impl RawResponse
{
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self,) -> bool
    {
        (200..300).contains(&self.status,)
    }

    /// Returns the first header matching `name`, ignoring ASCII case.
    pub fn header(&self, name: &str,) -> Option<&str,>
    {
        header_get(&self.headers, name,)
    }
}

/// Looks up a header value by name, ignoring ASCII case.
pub fn header_get<'a,>(headers: &'a [(String, String,)], name: &str,) -> Option<&'a str,>
{
    headers.iter().find(|(key, _,)| key.eq_ignore_ascii_case(name,),).map(|(_, value,)| value.as_str(),)
}

/// Failure that prevented an HTTP exchange from completing.
#[derive(Debug, Clone, PartialEq, Eq, masterror::Error,)]
pub enum TransportFailure
{
    /// The request did not complete within the configured timeout.
    #[error("request timed out after {after:?}")]
    Timeout
    {
        /// Timeout that elapsed.
        after: Duration,
    },
    /// The connection could not be established or broke mid-exchange.
    #[error("connection failed: {message}")]
    Connection
    {
        /// Description reported by the HTTP stack.
        message: String,
    },
}

impl TransportFailure
{
    /// Builds a connection failure from any displayable cause.
    pub fn connection(cause: impl fmt::Display,) -> Self
    {
        Self::Connection {
            message: cause.to_string(),
        }
    }
}

/// GET capability used by every fetcher.
#[async_trait]
pub trait Transport: Send + Sync
{
    /// Issues a GET request for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportFailure`] when no HTTP response was obtained.
    /// Non-2xx responses are **not** errors at this layer.
    async fn get(&self, endpoint: &Endpoint<'_,>,) -> Result<RawResponse, TransportFailure,>;
}

/// [`Transport`] backed by an [`Octocrab`] client.
///
/// Octocrab's retry middleware is disabled: retries are a caller decision.
#[derive(Clone,)]
pub struct OctocrabTransport
{
    client:  Octocrab,
    timeout: Duration,
}

impl OctocrabTransport
{
    /// Builds a transport from an explicit client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the configuration is invalid and
    /// [`Error::Client`] when Octocrab rejects the base URI or fails to build.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use repo_insight::{ClientConfig, OctocrabTransport};
    ///
    /// # async fn example() -> Result<(), repo_insight::Error> {
    /// let transport = OctocrabTransport::new(&ClientConfig::default(),)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &ClientConfig,) -> Result<Self, Error,>
    {
        config.validate()?;

        let mut builder = Octocrab::builder()
            .add_retry_config(RetryConfig::None,)
            .base_uri(config.api_base.as_str(),)
            .map_err(|e| Error::client(format!("invalid API base URI: {e}"),),)?;

        if let Some(token,) = config.token.as_ref() {
            builder = builder.personal_token(token.clone(),);
        }

        let client = builder
            .build()
            .map_err(|e| Error::client(format!("failed to initialize GitHub client: {e}"),),)?;

        Ok(Self {
            client,
            timeout: config.timeout,
        },)
    }

    /// Timeout applied to every request.
    pub fn timeout(&self,) -> Duration
    {
        self.timeout
    }
}

impl fmt::Debug for OctocrabTransport
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.debug_struct("OctocrabTransport",).field("timeout", &self.timeout,).finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for OctocrabTransport
{
    async fn get(&self, endpoint: &Endpoint<'_,>,) -> Result<RawResponse, TransportFailure,>
    {
        let path = endpoint.path();
        debug!("GET {}", path);

        let exchange = async {
            let response =
                self.client._get(path.as_str(),).await.map_err(TransportFailure::connection,)?;

            let status = response.status().as_u16();
            let headers: Headers = response
                .headers()
                .iter()
                .map(|(name, value,)| {
                    (name.as_str().to_owned(), value.to_str().unwrap_or_default().to_owned(),)
                },)
                .collect();
            let body =
                self.client.body_to_string(response,).await.map_err(TransportFailure::connection,)?;

            Ok::<_, TransportFailure,>(RawResponse {
                status,
                headers,
                body,
            },)
        };

        match timeout(self.timeout, exchange,).await {
            Ok(outcome,) => outcome,
            Err(_elapsed,) => {
                debug!("GET {} timed out after {:?}", path, self.timeout);
                Err(TransportFailure::Timeout {
                    after: self.timeout,
                },)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod mock
{
    use std::{
        collections::{HashMap, VecDeque},
        sync::Mutex,
    };

    use async_trait::async_trait;

    use super::{Endpoint, Headers, RawResponse, Transport, TransportFailure};

    type Outcome = Result<RawResponse, TransportFailure,>;

    /// In-memory transport returning queued outcomes per request path.
    ///
    /// Outcomes registered for the same path are returned in FIFO order.
    #[derive(Default,)]
    pub(crate) struct MockTransport
    {
        routes:   Mutex<HashMap<String, VecDeque<Outcome,>,>,>,
        requests: Mutex<Vec<String,>,>,
    }

    impl MockTransport
    {
        pub(crate) fn new() -> Self
        {
            Self::default()
        }

        pub(crate) fn respond(&self, path: &str, status: u16, body: &str,) -> &Self
        {
            self.respond_with_headers(path, status, Vec::new(), body,)
        }

        pub(crate) fn respond_with_headers(
            &self,
            path: &str,
            status: u16,
            headers: Headers,
            body: &str,
        ) -> &Self
        {
            self.push(
                path,
                Ok(RawResponse {
                    status,
                    headers,
                    body: body.to_owned(),
                },),
            )
        }

        pub(crate) fn fail(&self, path: &str, failure: TransportFailure,) -> &Self
        {
            self.push(path, Err(failure,),)
        }

        pub(crate) fn requests(&self,) -> Vec<String,>
        {
            self.requests.lock().expect("mock transport lock should not be poisoned",).clone()
        }

        fn push(&self, path: &str, outcome: Outcome,) -> &Self
        {
            self.routes
                .lock()
                .expect("mock transport lock should not be poisoned",)
                .entry(path.to_owned(),)
                .or_default()
                .push_back(outcome,);
            self
        }
    }

    #[async_trait]
    impl Transport for MockTransport
    {
        async fn get(&self, endpoint: &Endpoint<'_,>,) -> Outcome
        {
            let path = endpoint.path();
            self.requests
                .lock()
                .expect("mock transport lock should not be poisoned",)
                .push(path.clone(),);

            let queued = self
                .routes
                .lock()
                .expect("mock transport lock should not be poisoned",)
                .get_mut(&path,)
                .and_then(VecDeque::pop_front,);

            queued.unwrap_or_else(|| {
                Err(TransportFailure::connection(format!("no mock response registered for {path}"),),)
            },)
        }
    }
}
