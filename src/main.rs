//! Tweet-Harvester main entry point
//!
//! This is the command-line interface for the Tweet-Harvester collector.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tweet_harvester::config::{load_config_with_hash, validate, Config, JobEntry};
use tweet_harvester::sink::{JsonLinesSink, Sink, SqliteSink};
use tweet_harvester::{ApiClient, CollectionEngine, CollectionSession, SystemClock};

/// Tweet-Harvester: a quota-aware tweet collector
///
/// Tweet-Harvester runs keyword searches, user timelines and follower lists
/// against the Twitter REST API, waits out rate limits, and stores every
/// collected record in SQLite or JSON lines files.
#[derive(Parser, Debug)]
#[command(name = "tweet-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A quota-aware tweet collector", long_about = None)]
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

    /// Validate config and show the planned jobs without calling the API
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show record counts and recent runs from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Use this entry of [[accounts]] instead of the configured one
    #[arg(long, value_name = "N")]
    account: Option<usize>,

    /// Stop each job after this many records
    #[arg(long, value_name = "N")]
    total: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Command-line overrides go through the same validation
    if let Some(account) = cli.account {
        config.collector.account = account;
    }
    if let Some(total) = cli.total {
        config.collector.total = Some(total);
    }
    if cli.account.is_some() || cli.total.is_some() {
        validate(&config)?;
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_collect(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tweet_harvester=info,warn"),
            1 => EnvFilter::new("tweet_harvester=debug,info"),
            2 => EnvFilter::new("tweet_harvester=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the planned jobs
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Tweet-Harvester Dry Run ===\n");

    println!("API:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  Timeout: {}s", config.api.timeout_secs);

    println!("\nCollector:");
    println!(
        "  Account: #{} of {}",
        config.collector.account,
        config.accounts.len()
    );
    println!("  Include retweets: {}", config.collector.include_retweets);
    println!("  Only text: {}", config.collector.only_text);
    match config.collector.total {
        Some(total) => println!("  Records per job: at most {}", total),
        None => println!("  Records per job: unlimited"),
    }

    println!("\nOutput:");
    match &config.output.jsonl_dir {
        Some(dir) => println!("  JSON lines directory: {}", dir),
        None => println!("  Database: {}", config.output.database_path),
    }

    println!("\nJobs ({}):", config.jobs.len());
    for job in &config.jobs {
        let strategy = job.to_strategy(None);
        println!(
            "  - [{}] {} -> {}",
            job.mode(),
            strategy.label(),
            job.collection_name()
        );
        if let Some(since_id) = job.explicit_since_id() {
            println!("    since-id: {}", since_id);
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would run {} jobs sequentially", config.jobs.len());

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let sink = SqliteSink::open(Path::new(&config.output.database_path))?;

    let counts = sink.collection_counts()?;
    println!("Collections ({}):", counts.len());
    for (collection, count) in &counts {
        println!("  {:<30} {:>10}", collection, count);
    }

    let runs = sink.recent_runs(10)?;
    println!("\nRecent runs ({}):", runs.len());
    for run in &runs {
        println!(
            "  #{} {} [{}] {} records, started {}",
            run.id,
            run.label,
            run.status.to_db_string(),
            run.emitted,
            run.started_at
        );
    }

    Ok(())
}

/// Handles the main collection: runs every job in order
async fn handle_collect(
    config: &Config,
    config_hash: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let account = config
        .selected_account()
        .ok_or("selected account is not configured")?;
    let client = ApiClient::new(&config.api, account.credentials())?;
    let engine = CollectionEngine::new(Arc::new(client), Arc::new(SystemClock));
    let options = config.collector.collect_options();

    tracing::info!(
        "Running {} jobs against {}",
        config.jobs.len(),
        config.api.base_url
    );

    match &config.output.jsonl_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            for job in &config.jobs {
                let path = Path::new(dir).join(format!("{}.jsonl", job.collection_name()));
                let mut sink = JsonLinesSink::open(&path)?;
                run_job(&engine, &mut sink, job, options).await?;
            }
        }
        None => {
            let mut sink = SqliteSink::open(Path::new(&config.output.database_path))?
                .with_config_hash(config_hash);
            for job in &config.jobs {
                sink.use_collection(&job.collection_name());
                run_job(&engine, &mut sink, job, options).await?;
            }
        }
    }

    tracing::info!("All jobs completed");
    Ok(())
}

async fn run_job<S: Sink>(
    engine: &CollectionEngine,
    sink: &mut S,
    job: &JobEntry,
    options: tweet_harvester::CollectOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = CollectionSession::new(engine, sink);
    let resume = session.resume_point()?;
    let strategy = job.to_strategy(Some(resume));

    match session.run(strategy, options).await {
        Ok(summary) => {
            tracing::info!(
                "Job '{}' stored {} records",
                job.collection_name(),
                summary.emitted
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Job '{}' failed: {}", job.collection_name(), e);
            Err(e.into())
        }
    }
}
