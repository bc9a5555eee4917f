//! cvrs-scraper main entry point
//!
//! This is the command-line interface for the cvrs artist scraper.

use clap::Parser;
use cvrs_scraper::config::{load_config_with_hash, read_token, Config};
use cvrs_scraper::crawler::{crawl, gallery_url, TagQuery};
use cvrs_scraper::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// cvrs-scraper: seeds the cvrs catalog with artists
///
/// Walks the artist listings of the configured tags, picks a JPEG image for
/// every artist from its gallery and uploads both to the cvrs backend.
#[derive(Parser, Debug)]
#[command(name = "cvrs-scraper")]
#[command(version)]
#[command(about = "Seeds the cvrs catalog with artists", long_about = None)]
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

    /// Validate config and show what would be fetched without any network access
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_scrape(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("cvrs_scraper=info,warn"),
            1 => EnvFilter::new("cvrs_scraper=debug,info"),
            2 => EnvFilter::new("cvrs_scraper=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be fetched and uploaded
fn handle_dry_run(config: &Config) {
    println!("=== cvrs-scraper Dry Run ===\n");

    println!("Catalog:");
    println!("  Base URL: {}", config.catalog.base_url);
    println!("  Pages per tag: {}", config.catalog.max_page);
    println!("  Gallery pattern: {}", gallery_url(&config.catalog.base_url, "<artist>"));

    println!("\nTags ({}):", config.catalog.tags.len());
    for tag in &config.catalog.tags {
        let query = TagQuery::new(&config.catalog.base_url, tag, config.catalog.max_page);
        println!("  - {} -> {}?page=1..{}", tag, query.listing_url(), config.catalog.max_page);
    }

    println!("\nBackend:");
    println!("  Upload endpoint: {}", config.backend.artists_add_url());
    println!(
        "  Token variable: {} ({})",
        config.backend.token_env,
        if read_token(&config.backend).is_some() {
            "set"
        } else {
            "not set"
        }
    );

    println!("\nWorkers: {}", config.workers.capacity);
    println!("HTTP: user agent '{}', timeout {}s", config.http.user_agent, config.http.timeout_secs);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would fetch {} listing pages",
        config.catalog.tags.len() as u64 * config.catalog.max_page as u64
    );
}

/// Handles the main scrape operation
async fn handle_scrape(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let token = match read_token(&config.backend) {
        Some(token) => token,
        None => {
            tracing::warn!(
                "{} is not set; the backend will refuse uploads",
                config.backend.token_env
            );
            String::new()
        }
    };

    match crawl(config, token).await {
        Ok(stats) => {
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
