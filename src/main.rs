//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the Catalog-Harvest catalogue harvester.

use anyhow::Context;
use catalog_harvest::config::{load_config_with_hash, validate_worker_count, Config};
use catalog_harvest::crawler::{
    available_parallelism, needed_pages, run_job, worker_count, JobParams, JobSlot,
};
use catalog_harvest::progress::read_snapshot;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// The process-wide job slot; every harvest in this process goes through it
static JOB_SLOT: JobSlot = JobSlot::new();

/// Catalog-Harvest: a bounded product catalogue harvester
///
/// Catalog-Harvest enumerates the listing pages of a catalogue site, crawls
/// just enough of them with a pool of workers to collect the requested number
/// of products, and exports the records as a spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A bounded product catalogue harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Maximum number of items to collect (overrides max-items)
    #[arg(long, value_name = "N")]
    cap: Option<usize>,

    /// Maximum number of workers (overrides max-workers)
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Export path (overrides export-path)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the crawl plan without crawling
    #[arg(long, conflicts_with = "progress")]
    dry_run: bool,

    /// Print the current progress snapshot and exit
    #[arg(long, conflicts_with = "dry_run")]
    progress: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(output) = cli.output {
        config.output.export_path = output;
    }
    let params = job_params(&config, cli.cap, cli.workers)?;

    if cli.dry_run {
        handle_dry_run(&config, params);
    } else if cli.progress {
        handle_progress(&config, params)?;
    } else {
        handle_harvest(&config, params).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout carries only the JSON result.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Resolves the invocation parameters from config defaults and CLI overrides
fn job_params(config: &Config, cap: Option<usize>, workers: Option<usize>) -> anyhow::Result<JobParams> {
    let mut params = JobParams::from_config(config);

    if let Some(cap) = cap {
        anyhow::ensure!(cap >= 1, "--cap must be a positive integer");
        params.cap = cap;
    }
    if let Some(workers) = workers {
        validate_worker_count(workers)?;
        params.worker_count = workers;
    }

    Ok(params)
}

/// Handles the --dry-run mode: shows what a job would crawl
fn handle_dry_run(config: &Config, params: JobParams) {
    let needed = needed_pages(params.cap, config.source.items_per_page);

    println!("=== Catalog-Harvest Dry Run ===\n");

    println!("Source:");
    println!("  Root URL: {}", config.source.root_url);
    println!("  Page path: {}", config.source.page_path_template);
    println!("  Items per page: {}", config.source.items_per_page);

    println!("\nJob:");
    println!("  Cap: {}", params.cap);
    println!("  Listing pages needed: {}", needed);
    println!(
        "  Workers: at most {}",
        worker_count(params.worker_count, available_parallelism(), needed)
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Progress step: {}", config.crawler.progress_step);

    println!("\nOutput:");
    println!(
        "  Export: {} ({:?})",
        config.output.export_path.display(),
        config.output.export_format
    );
    println!("  Progress: {}", config.output.progress_path.display());

    println!("\n✓ Configuration is valid");
}

/// Handles the --progress mode: prints the latest snapshot as JSON
fn handle_progress(config: &Config, params: JobParams) -> anyhow::Result<()> {
    let state = read_snapshot(&config.output.progress_path, params.cap);
    println!("{}", serde_json::to_string(&state)?);
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config, params: JobParams) -> anyhow::Result<()> {
    let permit = JOB_SLOT.try_acquire()?;

    match run_job(config, params, &permit).await {
        Ok(report) => {
            tracing::info!(
                "Collected {} items in {:.2}s",
                report.items_collected,
                report.elapsed_seconds
            );
            println!("{}", serde_json::to_string(&report)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
