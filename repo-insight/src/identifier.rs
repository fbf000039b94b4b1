// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Extraction of repository identifiers from user-supplied URLs.
//!
//! Any string containing `github.com/<owner>/<name>` is accepted, so scheme,
//! `www.` prefix, trailing paths and query strings are tolerated. A trailing
//! `.git` suffix is removed from the repository name.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

static REPOSITORY_URL: LazyLock<Option<Regex,>,> =
    LazyLock::new(|| Regex::new(r"github\.com/([^/\s?#]+)/([^/\s?#]+)",).ok(),);

/// Owner and name pair identifying a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize,)]
pub struct RepositoryIdentifier
{
    owner: String,
    name:  String,
}

impl RepositoryIdentifier
{
    /// Creates an identifier from already separated parts.
    pub fn new(owner: impl Into<String,>, name: impl Into<String,>,) -> Self
    {
        Self {
            owner: owner.into(), name: name.into(),
        }
    }

    /// Extracts the identifier embedded in `url`.
    ///
    /// Returns `None` when the input does not contain a
    /// `github.com/<owner>/<name>` segment. Never panics.
    ///
    /// # Examples
    ///
    /// ```
    /// use repo_insight::RepositoryIdentifier;
    ///
    /// let id = RepositoryIdentifier::extract("https://github.com/octocat/Hello-World.git",)
    ///     .expect("valid url",);
    /// assert_eq!(id.owner(), "octocat");
    /// assert_eq!(id.name(), "Hello-World");
    /// assert!(RepositoryIdentifier::extract("https://example.com/octocat",).is_none());
    /// ```
    pub fn extract(url: &str,) -> Option<Self,>
    {
        let captures = REPOSITORY_URL.as_ref()?.captures(url,)?;
        let owner = captures.get(1,)?.as_str();
        let raw_name = captures.get(2,)?.as_str();
        let name = raw_name.strip_suffix(".git",).unwrap_or(raw_name,);

        if name.is_empty() {
            return None;
        }

        Some(Self::new(owner, name,),)
    }

    /// Repository owner (user or organization).
    pub fn owner(&self,) -> &str
    {
        &self.owner
    }

    /// Repository name without any `.git` suffix.
    pub fn name(&self,) -> &str
    {
        &self.name
    }
}

impl fmt::Display for RepositoryIdentifier
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
