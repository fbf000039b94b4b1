// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Client configuration and repository list documents.
//!
//! [`ClientConfig`] is passed explicitly to the transport; the library never
//! reads environment variables. Repository lists are accepted as JSON or YAML
//! documents with a `repositories` field, or as plain text with one URL per
//! line.

use std::{fmt, fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::error::{self, Error};

/// Default GitHub REST API base.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Explicit parameters for building a transport.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use repo_insight::ClientConfig;
///
/// let config = ClientConfig::default().with_token("ghp_example",).with_timeout(Duration::from_secs(5,),);
/// assert_eq!(config.timeout, Duration::from_secs(5));
/// assert!(!format!("{config:?}").contains("ghp_example"));
/// ```
#[derive(Clone, PartialEq, Eq,)]
pub struct ClientConfig
{
    /// API base URI, e.g. `https://api.github.com`.
    pub api_base: String,
    /// Optional personal access token sent as a bearer credential.
    pub token:    Option<String,>,
    /// Timeout applied to every request.
    pub timeout:  Duration,
}

impl Default for ClientConfig
{
    fn default() -> Self
    {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            token:    None,
            timeout:  Duration::from_secs(DEFAULT_TIMEOUT_SECS,),
        }
    }
}

impl ClientConfig
{
    /// Sets the API base URI.
    pub fn with_api_base(mut self, api_base: impl Into<String,>,) -> Self
    {
        self.api_base = api_base.into();
        self
    }

    /// Sets the access token. Blank tokens are ignored.
    pub fn with_token(mut self, token: impl Into<String,>,) -> Self
    {
        let token = token.into();
        self.token = if token.trim().is_empty() { None } else { Some(token,) };
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration,) -> Self
    {
        self.timeout = timeout;
        self
    }

    /// Checks the invariants required by the transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the timeout is zero or the API base
    /// is not an absolute `http(s)` URI.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.timeout.is_zero() {
            return Err(Error::validation("timeout must be greater than zero",),);
        }

        let base = self.api_base.trim();
        if !(base.starts_with("https://",) || base.starts_with("http://",)) {
            return Err(Error::validation(format!(
                "API base must be an absolute http(s) URI, got '{base}'"
            ),),);
        }

        Ok((),)
    }
}

impl fmt::Debug for ClientConfig
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.debug_struct("ClientConfig",)
            .field("api_base", &self.api_base,)
            .field("token", &self.token.as_ref().map(|_| "<redacted>",),)
            .field("timeout", &self.timeout,)
            .finish()
    }
}

/// Encoding of a repository list document.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum ListFormat
{
    /// JSON document with a `repositories` array.
    Json,
    /// YAML document with a `repositories` sequence.
    Yaml,
    /// One repository URL per line.
    PlainText,
}

impl ListFormat
{
    /// Infers the format from a file extension; unknown extensions are text.
    pub fn from_path(path: &Path,) -> Self
    {
        match path.extension().and_then(|ext| ext.to_str(),).map(str::to_ascii_lowercase,).as_deref()
        {
            Some("json",) => Self::Json,
            Some("yml" | "yaml",) => Self::Yaml,
            _ => Self::PlainText,
        }
    }
}

#[derive(Debug, Deserialize,)]
struct RepositoryListDocument
{
    repositories: Vec<String,>,
}

/// Loads repository URLs from a list file, inferring the format from the
/// extension.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and propagates the
/// errors of [`parse_repository_list`].
pub fn load_repository_list(path: &Path,) -> Result<Vec<String,>, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_repository_list(&contents, ListFormat::from_path(path,),)
}

/// Parses repository URLs from list contents.
///
/// Entries are trimmed and blank entries are dropped.
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed YAML, [`Error::Validation`] for
/// malformed JSON, and [`Error::Validation`] when the list resolves to no
/// entries.
///
/// # Examples
///
/// ```
/// use repo_insight::{ListFormat, parse_repository_list};
///
/// let urls = parse_repository_list("https://github.com/a/b\n\n  https://github.com/c/d  \n", ListFormat::PlainText,)?;
/// assert_eq!(urls, vec!["https://github.com/a/b", "https://github.com/c/d"]);
/// # Ok::<(), repo_insight::Error>(())
/// ```
pub fn parse_repository_list(contents: &str, format: ListFormat,) -> Result<Vec<String,>, Error,>
{
    let raw = match format {
        ListFormat::Json => {
            let document: RepositoryListDocument = serde_json::from_str(contents,)
                .map_err(|e| Error::validation(format!("invalid repository list JSON: {e}"),),)?;
            document.repositories
        }
        ListFormat::Yaml => {
            let document: RepositoryListDocument = serde_yaml::from_str(contents,)?;
            document.repositories
        }
        ListFormat::PlainText => contents.lines().map(str::to_owned,).collect(),
    };

    let repositories: Vec<String,> = raw
        .into_iter()
        .map(|entry| entry.trim().to_owned(),)
        .filter(|entry| !entry.is_empty(),)
        .collect();

    if repositories.is_empty() {
        return Err(Error::validation("repository list must contain at least one entry",),);
    }

    Ok(repositories,)
}
