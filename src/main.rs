//! Alertmap main entry point
//!
//! This is the command-line interface for the Alertmap alerts crawler.

use alertmap::config::load_config_with_hash;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Alertmap: an incremental alerts-blog crawler
///
/// Alertmap walks the alerts blog post by post, derives a location and
/// topic categories for each new post, geocodes the location, and stores
/// light and heavy views of every post exactly once.
#[derive(Parser, Debug)]
#[command(name = "alertmap")]
#[command(version = "1.0.0")]
#[command(about = "An incremental alerts-blog crawler", long_about = None)]
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

    /// Walk backward through older posts starting from this URL
    #[arg(long, value_name = "URL", conflicts_with = "stats")]
    backfill: Option<String>,

    /// Run the full pipeline but skip store writes and notifications
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, cli.backfill, cli.dry_run).await?;
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
            0 => EnvFilter::new("alertmap=info,warn"),
            1 => EnvFilter::new("alertmap=debug,info"),
            2 => EnvFilter::new("alertmap=trace,debug"),
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

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &alertmap::config::Config) -> anyhow::Result<()> {
    use alertmap::storage::open_store;
    use std::path::Path;

    println!("Database: {}\n", config.storage.database_path);

    // Open the database
    let store = open_store(Path::new(&config.storage.database_path))?;
    let stats = store.stats()?;

    println!("=== Store Statistics ===\n");
    println!("Light records:    {}", stats.light_count);
    println!("Heavy records:    {}", stats.heavy_count);
    println!("With categories:  {}", stats.categorized);
    println!("With coordinates: {}", stats.located);
    match &stats.newest_upload {
        Some(uploaded) => println!("Newest upload:    {}", uploaded),
        None => println!("Store is empty"),
    }

    Ok(())
}

/// Handles the main crawl operation: wires the pipeline and runs it
async fn handle_crawl(
    config: alertmap::config::Config,
    backfill: Option<String>,
    dry_run: bool,
) -> anyhow::Result<()> {
    use alertmap::crawler::{CrawlDriver, FixedWindowGovernor, RateLimit};
    use alertmap::enrich::{Enricher, GeminiClient, NominatimResolver};
    use alertmap::model::PageHandle;
    use alertmap::notify::{EmailNotifier, NoopNotifier, Notifier};
    use alertmap::page::{build_http_client, CrawlDirection, HttpPageSource};
    use alertmap::storage::{RecordStore, SqliteStore};
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    let api_key = std::env::var("GEMINI_API_KEY")
        .context("GEMINI_API_KEY environment variable is required")?;

    let client = build_http_client(&config.user_agent)?;
    let store = Arc::new(Mutex::new(SqliteStore::open(Path::new(
        &config.storage.database_path,
    ))?));

    // The mode picks both the walk direction and the starting page
    let (direction, start) = match &backfill {
        Some(url) => {
            tracing::info!("Backfill mode: walking older posts from {}", url);
            (CrawlDirection::Older, PageHandle::parse(url)?)
        }
        None => {
            let anchor = store.lock().unwrap().resume_anchor()?;
            let start = match anchor {
                Some(url) => {
                    tracing::info!("Resuming from most recently uploaded post: {}", url);
                    PageHandle::parse(&url)?
                }
                None => {
                    tracing::info!("Store is empty, starting from the seed URL");
                    PageHandle::parse(&config.site.seed_url)?
                }
            };
            (CrawlDirection::Newer, start)
        }
    };

    if dry_run {
        tracing::info!("Dry run: posts will be fetched and enriched but not stored");
    }

    let governor: Arc<dyn RateLimit> = Arc::new(FixedWindowGovernor::new(
        config.rate_limit.quota,
        Duration::from_secs(config.rate_limit.window_secs),
    ));

    let gemini = GeminiClient::new(client.clone(), &config.enrichment, api_key);
    let geocoder = NominatimResolver::new(client.clone(), &config.geocoder);
    let enricher = Enricher::new(
        Box::new(gemini),
        Box::new(geocoder),
        governor,
        config.site.place_context.clone(),
    );

    let notifier: Box<dyn Notifier> = if config.notify.enabled && !dry_run {
        let mail_key = std::env::var("RESEND_API_KEY")
            .context("RESEND_API_KEY environment variable is required when notify is enabled")?;
        Box::new(EmailNotifier::new(client.clone(), &config.notify, mail_key))
    } else {
        Box::new(NoopNotifier)
    };

    let source = HttpPageSource::new(client, direction);

    let driver = CrawlDriver::new(
        Box::new(source),
        Box::new(enricher),
        store,
        notifier,
        dry_run,
    );

    // Run the crawler
    match driver.run(start).await {
        Ok(outcome) => {
            tracing::info!(
                "Crawl completed: {} pages visited, {} stored, {} skipped",
                outcome.visited,
                outcome.stored,
                outcome.skipped
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
