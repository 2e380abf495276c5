//! Sitemap-Harvest main entry point
//!
//! This is the command-line interface for the resumable sitemap extractor.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sitemap_harvest::config::{default_config_hash, load_config_with_hash, Config};
use sitemap_harvest::extractor::{request_stop, BatchJob, JobOutcome, JobSummary};
use sitemap_harvest::normalize_sitemap_url;
use sitemap_harvest::output::{format_progress, print_status, to_csv_string, write_csv};
use sitemap_harvest::state::BatchState;
use sitemap_harvest::storage::{self, open_storage, SharedStore, BATCH_STATE_KEY};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Sitemap-Harvest: a resumable sitemap URL extractor
///
/// Sitemap-Harvest reads a list of sites or sitemap URLs, fetches their
/// sitemaps through relay proxies, expands sitemap indexes and writes every
/// page URL found to a CSV file. Progress is saved after each input so an
/// interrupted run can be resumed.
#[derive(Parser, Debug)]
#[command(name = "sitemap-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable sitemap URL extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a fresh extraction, replacing any previous run
    Extract {
        /// File with one site or sitemap URL per line (stdin when omitted or `-`)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Continue an interrupted extraction
    Resume,

    /// Ask a running extraction to stop after its current item
    Stop,

    /// Delete the saved run and the sitemap cache
    Clear,

    /// Show progress and results of the saved run
    Status {
        /// Also print the per-item result log
        #[arg(long)]
        log: bool,
    },

    /// Show the sitemap URLs that would be fetched, without fetching
    DryRun {
        /// File with one site or sitemap URL per line (stdin when omitted or `-`)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Write the rows of the saved run to CSV
    Export {
        /// Destination file (defaults to the configured CSV path; `-` for stdout)
        #[arg(value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_configuration(cli.config.as_deref())?;

    match cli.command {
        Command::Extract { input } => handle_extract(&config, config_hash, input.as_deref()).await,
        Command::Resume => handle_resume(&config, config_hash).await,
        Command::Stop => handle_stop(&config),
        Command::Clear => handle_clear(&config, config_hash),
        Command::Status { log } => handle_status(&config, log),
        Command::DryRun { input } => handle_dry_run(&config, input.as_deref()),
        Command::Export { output } => handle_export(&config, output),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_harvest=info,warn"),
            1 => EnvFilter::new("sitemap_harvest=debug,info"),
            2 => EnvFilter::new("sitemap_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load_configuration(path: Option<&Path>) -> anyhow::Result<(Config, String)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::debug!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, hash))
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Ok((Config::default(), default_config_hash()))
        }
    }
}

fn open_store(config: &Config) -> anyhow::Result<SharedStore> {
    let path = Path::new(&config.output.database_path);
    open_storage(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Reads newline-separated inputs from a file, or stdin for `None` / `-`
fn read_inputs(input: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let text = match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read inputs from stdin")?;
            text
        }
    };

    Ok(text.lines().map(str::to_string).collect())
}

/// Handles `extract`: starts a fresh run over the given inputs
async fn handle_extract(
    config: &Config,
    config_hash: String,
    input: Option<&Path>,
) -> anyhow::Result<()> {
    let inputs = read_inputs(input)?;
    let store = open_store(config)?;
    let mut job = BatchJob::from_config(config, store, Some(config_hash))?;

    let outcome = tokio::select! {
        outcome = job.start(inputs) => outcome?,
        _ = tokio::signal::ctrl_c() => {
            report_interrupted();
            return Ok(());
        }
    };

    report_outcome(&outcome);
    Ok(())
}

/// Handles `resume`: continues the saved run
async fn handle_resume(config: &Config, config_hash: String) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let mut job = BatchJob::from_config(config, store, Some(config_hash))?;

    let outcome = tokio::select! {
        outcome = job.resume() => outcome?,
        _ = tokio::signal::ctrl_c() => {
            report_interrupted();
            return Ok(());
        }
    };

    report_outcome(&outcome);
    Ok(())
}

/// Handles `stop`: flags the saved run so its process stops at the next item
fn handle_stop(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;

    if request_stop(&store)? {
        println!("✓ Stop requested for the saved extraction");
        println!("  A running process stops after its current item; `resume` clears the request");
    } else {
        println!("No unfinished extraction to stop");
    }

    Ok(())
}

/// Handles `clear`: removes the saved run and the cache
fn handle_clear(config: &Config, config_hash: String) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let mut job = BatchJob::from_config(config, store, Some(config_hash))?;
    job.clear_all()?;

    println!("✓ Cleared saved extraction and sitemap cache");
    Ok(())
}

/// Handles `status`: prints the saved run
fn handle_status(config: &Config, show_log: bool) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_store(config)?;
    let state = storage::load::<BatchState>(&store, BATCH_STATE_KEY)?.unwrap_or_default();
    print_status(&state, show_log);

    Ok(())
}

/// Handles `dry-run`: shows the normalized sitemap URL for every input
fn handle_dry_run(config: &Config, input: Option<&Path>) -> anyhow::Result<()> {
    let inputs: Vec<String> = read_inputs(input)?
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect();

    println!("=== Sitemap-Harvest Dry Run ===\n");

    println!("Fetcher Configuration:");
    println!("  Max retries: {}", config.fetcher.max_retries);
    println!("  Timeout: {}ms", config.fetcher.timeout_ms);
    println!("  Retry delay: {}ms", config.fetcher.retry_delay_ms);
    println!(
        "  Rate limit: {} requests per {}s",
        config.rate_limit.max_requests, config.rate_limit.window_secs
    );
    println!("  Cache TTL: {}h", config.cache.ttl_hours);

    println!("\nProxies ({}):", config.fetcher.proxies.len());
    for proxy in &config.fetcher.proxies {
        println!("  - {}", proxy);
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  CSV: {}", config.output.csv_path);

    let max_inputs = config.batch.max_inputs;
    println!("\nInputs ({}):", inputs.len());
    let mut valid = 0;
    for raw in inputs.iter().take(max_inputs) {
        match normalize_sitemap_url(raw) {
            Ok(url) => {
                valid += 1;
                match url.fallback() {
                    Some(fallback) => println!("  - {} -> {} (fallback {})", raw.trim(), url, fallback),
                    None => println!("  - {} -> {}", raw.trim(), url),
                }
            }
            Err(e) => println!("  - {} -> {}", raw.trim(), e),
        }
    }

    if inputs.len() > max_inputs {
        println!(
            "\n! {} inputs beyond the limit of {} would be ignored",
            inputs.len() - max_inputs,
            max_inputs
        );
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would fetch {} sitemaps", valid);

    Ok(())
}

/// Handles `export`: rewrites the CSV from the saved rows
fn handle_export(config: &Config, output: Option<PathBuf>) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(&config.output.csv_path));
    let store = open_store(config)?;
    let state = storage::load::<BatchState>(&store, BATCH_STATE_KEY)?.unwrap_or_default();

    if state.output_rows.is_empty() {
        println!("No URLs extracted for CSV.");
        return Ok(());
    }

    if path == Path::new("-") {
        print!("{}", to_csv_string(&state.output_rows)?);
        return Ok(());
    }

    write_csv(&state.output_rows, &path)?;
    println!("✓ Exported {} URLs to: {}", state.output_rows.len(), path.display());

    Ok(())
}

fn report_interrupted() {
    tracing::warn!("Interrupted; progress is saved");
    println!("Run `sitemap-harvest resume` to continue this extraction.");
}

fn report_outcome(outcome: &JobOutcome) {
    match outcome {
        JobOutcome::Completed(summary) => {
            print_summary(summary);
            match &summary.csv_path {
                Some(path) => println!("✓ CSV written to: {}", path.display()),
                None => println!("No URLs extracted for CSV."),
            }
        }
        JobOutcome::Stopped(summary) => {
            print_summary(summary);
            println!("Extraction stopped by user.");
        }
        JobOutcome::NothingToResume => {
            println!("No interrupted extraction to resume");
        }
    }
}

fn print_summary(summary: &JobSummary) {
    println!("{}", format_progress(summary.processed, summary.total));
    println!("  URLs extracted: {}", summary.rows);
    if summary.errors > 0 {
        println!("  Summary: {} errors occurred.", summary.errors);
    }
}
