//! Skein main entry point
//!
//! This is the command-line interface for the Skein frontier crawler.

use clap::Parser;
use skein::config::{load_config_with_hash, Config};
use skein::crawler::{crawl, StopReason};
use skein::output::{load_statistics, print_statistics};
use skein::storage::{open_store, FrontierStore};
use skein::{SkeinError, EXIT_FRONTIER_EXHAUSTED};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Skein: a breadth-limited frontier crawler
///
/// Skein drains a persistent SQLite frontier of addresses with a bounded
/// pool of fetch tasks, feeding every newly discovered link back into the
/// frontier along with the edge that led to it.
#[derive(Parser, Debug)]
#[command(name = "skein")]
#[command(version)]
#[command(about = "A breadth-limited frontier crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the frontier database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<u8, SkeinError> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(0);
    }

    let store = open_store(Path::new(&config.store.database_path))
        .map_err(SkeinError::FrontierUnreadable)?;

    if cli.stats {
        handle_stats(&config, &store)?;
        return Ok(0);
    }

    handle_crawl(config, Arc::new(store)).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("skein=info,warn"),
            1 => EnvFilter::new("skein=debug,info"),
            2 => EnvFilter::new("skein=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Skein Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max concurrent tasks: {}",
        config.crawler.max_concurrent_tasks
    );
    println!("  Fetch timeout: {}ms", config.crawler.fetch_timeout_ms);
    println!(
        "  On empty frontier: {:?}",
        config.crawler.on_empty_frontier
    );
    match config.crawler.claim_lease_secs {
        0 => println!("  Claim lease: disabled"),
        secs => println!("  Claim lease: {}s", secs),
    }

    println!("\nLinks:");
    println!("  Strip query: {}", config.links.strip_query);
    println!(
        "  Count domain labels: {}",
        config.links.count_domain_labels
    );

    println!("\nStore:");
    println!("  Database: {}", config.store.database_path);

    println!("\nSeeds ({}):", config.frontier.seeds.len());
    for seed in &config.frontier.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config, store: &dyn FrontierStore) -> Result<(), SkeinError> {
    println!("Database: {}\n", config.store.database_path);

    let stats = load_statistics(store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, store: Arc<dyn FrontierStore>) -> Result<u8, SkeinError> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, finishing in-flight pages");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // Dropping the sender would read as a shutdown request
                tracing::warn!("Cannot listen for interrupts: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });

    let summary = crawl(&config, store, shutdown_rx).await?;

    match summary.stop_reason {
        StopReason::Exhausted => {
            tracing::info!("Frontier exhausted");
            Ok(EXIT_FRONTIER_EXHAUSTED as u8)
        }
        StopReason::Shutdown => Ok(0),
    }
}
