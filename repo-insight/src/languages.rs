// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Language composition of a repository.
///
/// Converts the per-language byte counts reported by
/// `/repos/{owner}/{name}/languages` into percentages of the total.
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::{
    normalizer::{ApiError, decode_payload, ensure_success},
    transport::{Endpoint, Transport},
    RepositoryIdentifier,
};

/// Share of a single language.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct LanguageShare
{
    /// Language name as reported by GitHub linguist.
    pub language:   String,
    /// Bytes of code written in the language.
    pub bytes:      u64,
    /// Percentage of the repository total, 0–100.
    pub percentage: f64,
}

/// Percentages of total bytes per language, largest share first.
///
/// Percentages sum to 100 within floating-point tolerance.
#[derive(Debug, Clone, PartialEq, Serialize,)]
#[serde(transparent)]
pub struct LanguageComposition
{
    shares: Vec<LanguageShare,>,
}

impl LanguageComposition
{
    /// Shares ordered by descending percentage, then by name.
    pub fn shares(&self,) -> &[LanguageShare]
    {
        &self.shares
    }

    /// Percentage for `language`, if present.
    pub fn percentage(&self, language: &str,) -> Option<f64,>
    {
        self.shares.iter().find(|share| share.language == language,).map(|share| share.percentage,)
    }

    /// Number of languages.
    pub fn len(&self,) -> usize
    {
        self.shares.len()
    }

    /// Always `false`: an empty payload is reported as [`LanguageStats::NoData`].
    pub fn is_empty(&self,) -> bool
    {
        self.shares.is_empty()
    }
}

/// Outcome of a language composition fetch.
#[derive(Debug, Clone, PartialEq, Serialize,)]
#[serde(tag = "status", content = "languages", rename_all = "snake_case")]
pub enum LanguageStats
{
    /// At least one language with a non-zero byte count.
    Available(LanguageComposition,),
    /// The repository reports no language data.
    NoData,
}

/// Derives percentages from raw byte counts.
///
/// Returns [`LanguageStats::NoData`] when the mapping is empty or every count
/// is zero.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use repo_insight::{LanguageStats, compute_composition};
///
/// let bytes = BTreeMap::from([("Python".to_owned(), 300,), ("JavaScript".to_owned(), 100,),]);
/// let LanguageStats::Available(composition,) = compute_composition(&bytes,) else {
///     panic!("expected composition");
/// };
/// assert_eq!(composition.percentage("Python"), Some(75.0));
/// assert_eq!(composition.percentage("JavaScript"), Some(25.0));
/// ```
pub fn compute_composition(bytes: &BTreeMap<String, u64,>,) -> LanguageStats
{
    let total: u128 = bytes.values().map(|&count| u128::from(count,),).sum();
    if total == 0 {
        return LanguageStats::NoData;
    }

    let mut shares: Vec<LanguageShare,> = bytes
        .iter()
        .map(|(language, &count,)| LanguageShare {
            language: language.clone(),
            bytes: count,
            percentage: count as f64 / total as f64 * 100.0,
        },)
        .collect();

    shares.sort_by(|a, b| {
        b.percentage.total_cmp(&a.percentage,).then_with(|| a.language.cmp(&b.language,),)
    },);

    LanguageStats::Available(LanguageComposition {
        shares,
    },)
}

/// Fetches the language composition of a repository.
///
/// # Errors
///
/// Returns the normalized [`ApiError`] for non-2xx statuses, transport
/// failures, and payloads that are not a map of byte counts.
///
/// # Example
///
/// ```no_run
/// use repo_insight::{ClientConfig, LanguageStats, OctocrabTransport, RepositoryIdentifier, fetch_languages};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = OctocrabTransport::new(&ClientConfig::default(),)?;
/// let id = RepositoryIdentifier::new("octocat", "Hello-World",);
/// if let LanguageStats::Available(composition,) = fetch_languages(&transport, &id,).await? {
///     for share in composition.shares() {
///         println!("{}: {:.1}%", share.language, share.percentage);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn fetch_languages<T,>(transport: &T, id: &RepositoryIdentifier,) -> Result<LanguageStats, ApiError,>
where
    T: Transport + ?Sized,
{
    debug!("Fetching language composition for {}", id);

    let response = transport.get(&Endpoint::Languages(id,),).await?;
    let response = ensure_success(response,)?;
    let bytes: BTreeMap<String, u64,> = decode_payload(&response,)?;

    let stats = compute_composition(&bytes,);
    if matches!(stats, LanguageStats::NoData) {
        debug!("No language data reported for {}", id);
    }

    Ok(stats,)
}
