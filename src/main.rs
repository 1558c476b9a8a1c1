use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

use pr_ledger::filter::{last_full_month, resolve_range, DateRange, RelationFilter, SortOrder};
use pr_ledger::github::{ApiError, ClientConfig, GitHubClient, DEFAULT_API_URL};
use pr_ledger::output::{self, OutputFormat};
use pr_ledger::pulls::PrState;
use pr_ledger::{FetchError, FetchRequest, ReportOutcome};

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_RATE_LIMIT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Parser, Debug)]
#[command(name = "pr-ledger")]
#[command(about = "Collect the pull requests a user authored or reviewed", long_about = None)]
#[command(version)]
struct Cli {
    /// Repository as owner/name (repeatable, falls back to config)
    #[arg(short, long = "repo", value_name = "OWNER/NAME")]
    repos: Vec<String>,

    /// GitHub login (falls back to config)
    #[arg(short, long, value_name = "LOGIN")]
    user: Option<String>,

    /// GitHub token (else $PR_LEDGER_GH_TOKEN, else $GITHUB_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Start date: month number, mm.yyyy, dd.mm.yyyy, yyyy-mm-dd or last-month
    #[arg(long, conflicts_with = "last_month")]
    start: Option<String>,

    /// End date, same formats as --start
    #[arg(long, conflicts_with = "last_month")]
    end: Option<String>,

    /// Restrict to the previous calendar month
    #[arg(long)]
    last_month: bool,

    /// Keep only PRs in these states (repeatable)
    #[arg(long = "status", value_enum)]
    statuses: Vec<PrState>,

    /// Which relation to keep
    #[arg(long, value_enum, default_value_t = RelationFilter::Both)]
    only: RelationFilter,

    /// Sort order
    #[arg(long, value_enum, default_value_t = SortOrder::DateNewest)]
    sort: SortOrder,

    /// Omit size stats
    #[arg(long)]
    no_stats: bool,

    /// Output format (defaults to config, then table)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Report file for html/pdf (default pr-ledger.html or pr-ledger.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Open the HTML or PDF report in a browser
    #[arg(long)]
    open: bool,

    /// Bypass the report cache
    #[arg(long)]
    no_cache: bool,

    /// Remove the report cache and exit
    #[arg(long)]
    clear_cache: bool,

    /// Path to config file (defaults to ~/.config/pr-ledger/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Map a fatal fetch failure to a process exit code
fn exit_code_for(error: &FetchError) -> i32 {
    match &error.source {
        ApiError::RateLimitExceeded { .. } => EXIT_RATE_LIMIT,
        ApiError::Status { status: 401, .. } => EXIT_AUTH,
        ApiError::InvalidUrl(_) => EXIT_CONFIG,
        _ => EXIT_NETWORK,
    }
}

fn fail(code: i32, message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(code);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Install rustls crypto provider (required for rustls 0.23+)
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }

    let start_time = Instant::now();
    let cache_path = pr_ledger::cache::get_cache_path();

    if cli.clear_cache {
        match pr_ledger::cache::clear_cache(&cache_path) {
            Ok(()) => {
                println!("Cache cleared: {}", cache_path.display());
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => fail(EXIT_CONFIG, format!("Failed to clear cache: {:#}", e)),
        }
    }

    // Load config
    let config = match pr_ledger::config::load_config(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => fail(EXIT_CONFIG, format!("Config error: {:#}", e)),
    };
    let cache_ttl = match config.cache_ttl() {
        Ok(ttl) => ttl,
        Err(e) => fail(EXIT_CONFIG, format!("Config error: {:#}", e)),
    };

    let repos = if cli.repos.is_empty() {
        config.repositories.clone()
    } else {
        cli.repos.clone()
    };
    let Some(username) = cli.user.clone().or_else(|| config.username.clone()) else {
        fail(
            EXIT_CONFIG,
            "No user given. Pass --user or set `username` in ~/.config/pr-ledger/config.yaml",
        );
    };

    let today = Local::now().date_naive();
    let date_range: DateRange = if cli.last_month {
        last_full_month(today)
    } else {
        resolve_range(cli.start.as_deref(), cli.end.as_deref(), today)
    }
    .unwrap_or_else(|e| fail(EXIT_CONFIG, format!("Invalid date: {}", e)));

    let token = pr_ledger::credentials::resolve_token(cli.token.clone());
    if token.is_none() {
        warn!("No GitHub token found; unauthenticated requests are limited to 60 per hour");
    }

    let request = match FetchRequest::new(&repos, &username) {
        Ok(r) => r,
        Err(e) => fail(EXIT_CONFIG, format!("Invalid request: {}", e)),
    }
    .with_credential(token.clone())
    .with_date_range(date_range)
    .with_statuses(cli.statuses.iter().copied())
    .with_relation_filter(cli.only)
    .with_stats(!cli.no_stats)
    .with_sort(cli.sort);

    debug!(
        repositories = repos.len(),
        user = %request.username,
        start = ?request.date_range.start,
        end = ?request.date_range.end,
        "request built"
    );

    let api_url = config.api_url.clone().unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let cache = pr_ledger::cache::ReportCache::new(cache_path, cache_ttl);
    let cached = if cli.no_cache {
        None
    } else {
        cache.get(&request, &api_url)
    };

    let outcome = match cached {
        Some(outcome) => {
            info!("Using cached report");
            outcome
        }
        None => {
            let client = GitHubClient::new(
                ClientConfig::default()
                    .with_base_url(api_url.clone())
                    .with_token(token),
            );
            let outcome = match pr_ledger::fetch_report(&client, &request).await {
                Ok(outcome) => outcome,
                Err(e) => fail(exit_code_for(&e), format!("Fetch failed: {}", e)),
            };
            if !cli.no_cache {
                if let Err(e) = cache.put(&request, &api_url, &outcome) {
                    warn!("Failed to write report cache: {:#}", e);
                }
            }
            outcome
        }
    };

    for failure in outcome.failures() {
        eprintln!("Warning: {}", failure);
    }

    let report = match outcome {
        ReportOutcome::Found(report) => report,
        ReportOutcome::NoMatchingRecords { dropped, .. } => {
            if dropped > 0 {
                debug!(dropped, "malformed records dropped");
            }
            println!("No pull requests match the given filters.");
            std::process::exit(EXIT_SUCCESS);
        }
    };

    let show_stats = request.include_stats;
    match cli.format.or(config.format).unwrap_or_default() {
        OutputFormat::Table => {
            let use_colors = output::should_use_colors();
            println!("{}", output::format_record_table(&report.records, use_colors, show_stats));
            println!();
            println!("{}", output::format_summary(&report.records));
        }
        OutputFormat::Tsv => {
            println!("{}", output::format_tsv(&report.records));
        }
        format @ (OutputFormat::Html | OutputFormat::Pdf) => {
            let contents = if format == OutputFormat::Pdf {
                output::render_pdf(&report.records, &request.username, &repos)
            } else {
                Ok(output::render_html(&report.records, &request.username, &repos, show_stats).into_bytes())
            };
            let contents = contents.unwrap_or_else(|e| fail(EXIT_CONFIG, format!("{:#}", e)));
            let path = cli
                .output
                .clone()
                .or_else(|| format.default_path())
                .unwrap_or_else(|| PathBuf::from("pr-ledger.html"));
            if let Err(e) = output::write_report(&path, &contents) {
                fail(EXIT_CONFIG, format!("{:#}", e));
            }
            println!("Wrote {} PRs to {}", report.count(), path.display());
            if cli.open {
                if let Err(e) = pr_ledger::browser::open_report(&path) {
                    eprintln!("{:#}", e);
                }
            }
        }
    }

    if report.dropped > 0 {
        eprintln!("Skipped {} malformed PR records", report.dropped);
    }
    debug!("Finished in {:?}", start_time.elapsed());
    std::process::exit(EXIT_SUCCESS);
}
