//! Oscar-Ledger main entry point
//!
//! This is the command-line interface for the Oscar-Ledger nomination
//! scraper.

use anyhow::Context;
use clap::Parser;
use oscar_ledger::config::{load_config_with_hash, Config};
use oscar_ledger::crawler::{ceremony_url, run_scrape};
use oscar_ledger::output::LOAD_ORDER;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Oscar-Ledger: Academy Awards nomination scraper
///
/// Oscar-Ledger reads the nomination tables of the configured category
/// pages, follows links to film, person and ceremony pages, and writes the
/// result as a set of CSV tables ready for bulk loading.
#[derive(Parser, Debug)]
#[command(name = "oscar-ledger")]
#[command(version)]
#[command(about = "Academy Awards nomination scraper", long_about = None)]
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

    /// Validate config and show what would be scraped without fetching
    #[arg(long)]
    dry_run: bool,

    /// Write tables into this directory instead of the configured one
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).with_context(|| format!("loading {}", cli.config.display()));
        }
    };

    if let Some(output) = &cli.output {
        config.output.directory = output.display().to_string();
    }

    if cli.dry_run {
        print_plan(&config);
        return Ok(());
    }

    let summary = match run_scrape(config, config_hash).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            return Err(e).context("scrape run failed");
        }
    };

    tracing::info!(
        "Scrape completed: {} nominations, {} pages",
        summary.nominations_parsed,
        summary.total_pages()
    );
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("oscar_ledger=info,warn"),
            1 => EnvFilter::new("oscar_ledger=debug,info"),
            2 => EnvFilter::new("oscar_ledger=trace,debug"),
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

/// Handles --dry-run: shows what a run would fetch and write
fn print_plan(config: &Config) {
    println!("=== Oscar-Ledger Dry Run ===\n");

    println!("Fetcher:");
    println!("  Delay between requests: {}ms", config.fetcher.delay_ms);
    println!("  Max retries: {}", config.fetcher.max_retries);
    println!(
        "  Backoff: {}ms x{}",
        config.fetcher.backoff_ms, config.fetcher.backoff_multiplier
    );
    println!("  Timeout: {}s", config.fetcher.timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    let editions = &config.editions;
    println!("\nEditions:");
    println!(
        "  1..={} (first ceremony {})",
        editions.count, editions.first_year
    );
    if editions.fetch_ceremonies {
        println!(
            "  Ceremony pages: {} ... {}",
            ceremony_url(&editions.ceremony_url_template, 1),
            ceremony_url(&editions.ceremony_url_template, editions.count)
        );
    } else {
        println!("  Ceremony pages: not fetched");
    }

    println!("\nCategories ({}):", config.categories.len());
    for category in &config.categories {
        println!("  - {}", category.name);
        for (i, url) in category.urls.iter().enumerate() {
            let role = if i == 0 { "primary" } else { "fallback" };
            println!("    * {} ({})", url, role);
        }
    }

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Summary: {}", config.output.summary_file);
    println!("  Tables: {}", LOAD_ORDER.join(", "));

    let pages = config.categories.len()
        + if editions.fetch_ceremonies {
            editions.count as usize
        } else {
            0
        };
    println!("\n✓ Configuration is valid");
    println!("✓ Would start with {} seed pages", pages);
}
