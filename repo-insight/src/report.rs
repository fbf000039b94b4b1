// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Plain-text rendering of repository reports for terminals.
use std::fmt;

use crate::{
    activity::CommitActivity,
    analysis::{FetchOutcome, RepositoryAnalysis, RepositoryReport},
    languages::LanguageStats,
    normalizer::ApiError,
    summary::RepositorySummary,
};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const HISTOGRAM_WIDTH: u64 = 30;

/// Formats large counts with `K`/`M`/`B` suffixes.
///
/// # Examples
///
/// ```
/// use repo_insight::compact_count;
///
/// assert_eq!(compact_count(999,), "999");
/// assert_eq!(compact_count(1_240,), "1.2K");
/// assert_eq!(compact_count(3_400_000,), "3.4M");
/// assert_eq!(compact_count(1_000_000_000,), "1.0B");
/// ```
pub fn compact_count(count: u64,) -> String
{
    let value = count as f64;
    if count >= 1_000_000_000 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if count >= 1_000_000 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Renders a report as human readable text.
pub fn render_report(report: &RepositoryReport,) -> String
{
    TextReport(report,).to_string()
}

struct TextReport<'report,>(&'report RepositoryReport,);

impl fmt::Display for TextReport<'_,>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        match self.0 {
            RepositoryReport::InvalidUrl {
                url,
            } => writeln!(f, "Invalid repository URL format: {url}"),
            RepositoryReport::Analyzed {
                url,
                analysis,
            } => write_analysis(f, url, analysis,),
        }
    }
}

fn write_analysis(f: &mut fmt::Formatter<'_,>, url: &str, analysis: &RepositoryAnalysis,) -> fmt::Result
{
    writeln!(f, "== {} ({url})", analysis.repository)?;

    writeln!(f, "Overview")?;
    match &analysis.summary {
        FetchOutcome::Success(summary,) => write_summary(f, summary,)?,
        FetchOutcome::Failure(error,) => write_error(f, error,)?,
    }

    writeln!(f, "Languages")?;
    match &analysis.languages {
        FetchOutcome::Success(LanguageStats::Available(composition,),) => {
            for share in composition.shares() {
                writeln!(
                    f,
                    "  {:<16} {:>6.2}%  ({} bytes)",
                    share.language,
                    share.percentage,
                    compact_count(share.bytes,)
                )?;
                writeln!(f, "      Common file types: {}", language_file_types(&share.language,))?;
                writeln!(f, "      Typical use:       {}", language_description(&share.language,))?;
            }
        }
        FetchOutcome::Success(LanguageStats::NoData,) => {
            writeln!(f, "  No language statistics available for this repository.")?;
        }
        FetchOutcome::Failure(error,) => write_error(f, error,)?,
    }

    writeln!(f, "Commit activity")?;
    match &analysis.commit_activity {
        FetchOutcome::Success(CommitActivity::Ready(series,),) => {
            writeln!(f, "  Total commits: {}", series.total_commits)?;
            for week in &series.weeks {
                writeln!(f, "  {}  {}", week.week_start, week.commits)?;
            }

            writeln!(f, "Commits by weekday")?;
            let busiest = series.daily_commits.iter().copied().max().unwrap_or(0,);
            for (day, count,) in WEEKDAYS.iter().zip(series.daily_commits,) {
                let bar = if busiest == 0 { 0 } else { count * HISTOGRAM_WIDTH / busiest };
                writeln!(f, "  {day} {count:>6} {}", "#".repeat(bar as usize,))?;
            }
        }
        FetchOutcome::Success(CommitActivity::Computing {
            message,
        },) => writeln!(f, "  {message}")?,
        FetchOutcome::Success(CommitActivity::Unavailable,) => {
            writeln!(f, "  No commit activity data available for this repository.")?;
        }
        FetchOutcome::Failure(error,) => write_error(f, error,)?,
    }

    Ok((),)
}

fn language_file_types(language: &str,) -> &'static str
{
    match language {
        "Python" => ".py, .pyw, .pyx",
        "JavaScript" => ".js, .jsx, .mjs",
        "TypeScript" => ".ts, .tsx",
        "Java" => ".java, .class, .jar",
        "C++" => ".cpp, .hpp, .cc",
        "HTML" => ".html, .htm",
        "CSS" => ".css, .scss, .sass",
        "Ruby" => ".rb, .erb",
        "Go" => ".go",
        "Rust" => ".rs",
        _ => "Various files",
    }
}

fn language_description(language: &str,) -> &'static str
{
    match language {
        "Python" => "General-purpose language known for readability and extensive libraries",
        "JavaScript" => "Web programming language for client-side and server-side development",
        "TypeScript" => "Typed superset of JavaScript for large-scale applications",
        "Java" => "Object-oriented language for enterprise and Android development",
        "C++" => "Systems programming language for performance-critical applications",
        "HTML" => "Markup language for structuring web content",
        "CSS" => "Style sheet language for web page presentation",
        "Ruby" => "Dynamic language focused on simplicity and productivity",
        "Go" => "Concurrent programming language for scalable network services",
        "Rust" => "Systems language focusing on safety and performance",
        _ => "Programming language",
    }
}

fn write_summary(f: &mut fmt::Formatter<'_,>, summary: &RepositorySummary,) -> fmt::Result
{
    writeln!(f, "  Name:        {}", summary.name)?;
    writeln!(f, "  Description: {}", summary.description.as_deref().unwrap_or("No description provided",))?;
    writeln!(
        f,
        "  Stars: {}  Forks: {}  Watchers: {}",
        compact_count(summary.star_count,),
        compact_count(summary.fork_count,),
        compact_count(summary.watcher_count,)
    )?;
    writeln!(f, "  Language:    {}", summary.primary_language.as_deref().unwrap_or("N/A",))?;
    writeln!(f, "  Created:     {}", summary.created_at)?;
    writeln!(f, "  Updated:     {}", summary.updated_at)
}

fn write_error(f: &mut fmt::Formatter<'_,>, error: &ApiError,) -> fmt::Result
{
    writeln!(f, "  Error: {}", error.message())?;
    for hint in error.kind().remediation() {
        writeln!(f, "    - {hint}")?;
    }
    Ok((),)
}
