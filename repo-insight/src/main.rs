//! Command-line interface for the repo-insight binary.
//!
//! The CLI analyzes one or more GitHub repositories and prints the reports as
//! JSON or plain text, and can query the current API rate-limit status.

use std::{
    io::{self, Write},
    path::PathBuf,
    process,
    time::Duration,
};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use repo_insight::{
    AnalysisOptions, ClientConfig, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS, Error, OctocrabTransport,
    RepositoryReport, RetryConfig, analyze_batch, check_rate_limit, load_repository_list,
    render_report,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line interface for GitHub repository analytics.
#[derive(Debug, Parser,)]
#[command(name = "repo-insight", version, about = "Analyze GitHub repository activity")]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Analyze repositories given as URLs or in a repository list file.
    Analyze(AnalyzeArgs,),
    /// Show the remaining API quota.
    #[command(name = "rate-limit")]
    RateLimit(RateLimitArgs,),
}

/// Connection parameters shared by all subcommands.
#[derive(Debug, Args,)]
struct ConnectionArgs
{
    /// Personal access token used to raise the rate limit.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,

    /// GitHub REST API base URI.
    #[arg(long = "api-base", value_name = "URL", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Per-request timeout in seconds.
    #[arg(long = "timeout", value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
}

impl ConnectionArgs
{
    fn client_config(&self,) -> ClientConfig
    {
        let config = ClientConfig::default()
            .with_api_base(self.api_base.clone(),)
            .with_timeout(Duration::from_secs(self.timeout,),);

        match self.token.as_deref() {
            Some(token,) => config.with_token(token,),
            None => config,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum,)]
enum OutputFormat
{
    Json,
    Text,
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `analyze` subcommand.
struct AnalyzeArgs
{
    /// Repository URL, e.g. https://github.com/octocat/Hello-World. Repeatable.
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String,>,

    /// Repository list: JSON/YAML with a `repositories` field, or one URL per
    /// line.
    #[arg(long = "file", value_name = "PATH")]
    file: Option<PathBuf,>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,

    /// Attempts made while GitHub is still computing commit statistics.
    #[arg(long = "wait-for-stats", value_name = "ATTEMPTS", default_value_t = 1)]
    wait_for_stats: u32,

    #[command(flatten)]
    connection: ConnectionArgs,
}

#[derive(Debug, Args,)]
struct RateLimitArgs
{
    #[command(flatten)]
    connection: ConnectionArgs,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("repo_insight=warn",),);

    tracing_subscriber::fmt().with_env_filter(filter,).with_writer(io::stderr,).with_target(false,).init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates input, client construction and output errors. API failures are
/// part of the reports and do not fail the command.
async fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args,) => run_analyze(args,).await,
        Command::RateLimit(args,) => run_rate_limit(args,).await,
    }
}

async fn run_analyze(args: AnalyzeArgs,) -> Result<(), Error,>
{
    let urls = collect_urls(&args,)?;
    let transport = OctocrabTransport::new(&args.connection.client_config(),)?;
    let options = AnalysisOptions {
        commit_activity_retry: RetryConfig {
            max_attempts: args.wait_for_stats.max(1,),
            ..RetryConfig::default()
        },
    };

    let rate_limit = check_rate_limit(&transport,).await;
    if let Some(status,) = rate_limit.as_ref() {
        info!("GitHub API status: {}", status);
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
            .unwrap_or_else(|_| ProgressStyle::default_spinner(),),
    );
    pb.enable_steady_tick(Duration::from_millis(120,),);
    pb.set_message(format!("Analyzing {} repositories...", urls.len()),);

    let total = urls.len();
    let reports = analyze_batch(&transport, &urls, &options, |index, report| {
        pb.set_message(format!("[{}/{}] analyzed {}", index + 1, total, report.url()),);
    },)
    .await;

    pb.finish_and_clear();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if args.format == OutputFormat::Text {
        if let Some(status,) = rate_limit {
            writeln!(handle, "GitHub API status: {status}\n").map_err(Error::output,)?;
        }
    }

    write_reports(&mut handle, &reports, args.format, args.pretty,)
}

async fn run_rate_limit(args: RateLimitArgs,) -> Result<(), Error,>
{
    let transport = OctocrabTransport::new(&args.connection.client_config(),)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match check_rate_limit(&transport,).await {
        Some(status,) => {
            serde_json::to_writer(&mut handle, &status,)?;
            writeln!(handle).map_err(Error::output,)?;
        }
        None => writeln!(handle, "unavailable").map_err(Error::output,)?,
    }

    Ok((),)
}

/// Merges `--url` values and the `--file` list, preserving order.
fn collect_urls(args: &AnalyzeArgs,) -> Result<Vec<String,>, Error,>
{
    let mut urls: Vec<String,> =
        args.urls.iter().map(|url| url.trim().to_owned(),).filter(|url| !url.is_empty(),).collect();

    if let Some(path,) = args.file.as_deref() {
        urls.extend(load_repository_list(path,)?,);
    }

    if urls.is_empty() {
        return Err(Error::validation("provide at least one --url <URL> or a --file <PATH>",),);
    }

    Ok(urls,)
}

fn write_reports<W: io::Write,>(
    writer: &mut W,
    reports: &[RepositoryReport],
    format: OutputFormat,
    pretty: bool,
) -> Result<(), Error,>
{
    match format {
        OutputFormat::Json if pretty => serde_json::to_writer_pretty(&mut *writer, reports,)?,
        OutputFormat::Json => serde_json::to_writer(&mut *writer, reports,)?,
        OutputFormat::Text => {
            for report in reports {
                writer.write_all(render_report(report,).as_bytes(),).map_err(Error::output,)?;
                writer.write_all(b"\n",).map_err(Error::output,)?;
            }
            return Ok((),);
        }
    }

    writer.write_all(b"\n",).map_err(Error::output,)?;
    Ok((),)
}
