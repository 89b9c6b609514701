//! Prospect main entry point
//!
//! This is the command-line interface for the Prospect listing harvester.

use clap::Parser;
use prospect::config::load_config_with_hash;
use prospect::crawler::crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Prospect: a business-listing harvester
///
/// Prospect crawls a listing site's search pages for configured city and
/// keyword pairs, follows the discovered detail links, and extracts
/// structured records into timestamped CSV files.
#[derive(Parser, Debug)]
#[command(name = "prospect")]
#[command(version = "0.1.0")]
#[command(about = "A business-listing harvester", long_about = None)]
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
    #[arg(long)]
    dry_run: bool,

    /// Write CSV output here instead of the configured csv-dir
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
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

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config, cli.output_dir).await?;
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
            0 => EnvFilter::new("prospect=info,warn"),
            1 => EnvFilter::new("prospect=debug,info"),
            2 => EnvFilter::new("prospect=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &prospect::config::Config) -> Result<(), Box<dyn std::error::Error>> {
    use prospect::crawler::generate_seed_urls;
    use prospect::extract::compile_rules;

    println!("=== Prospect Dry Run ===\n");

    println!("Search:");
    println!("  Base URL: {}", config.search.base_url);
    println!(
        "  Detail link pattern: {}",
        config.search.detail_link_pattern
    );

    println!("\nCrawler:");
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Max detail pages: {}", config.crawler.max_detail_pages);
    println!("  Crawl depth: {}", config.crawler.crawl_depth);
    println!("  Detail page cap: {}", config.crawler.detail_page_cap());
    println!("  Extract emails: {}", config.crawler.extract_emails);

    println!("\nCities ({}):", config.search.cities.len());
    for city in &config.search.cities {
        let keyword_count = config.search.keywords.get(city).map(Vec::len).unwrap_or(0);
        println!("  - {} ({} keywords)", city, keyword_count);
    }

    // Compiling here surfaces selector errors without fetching anything
    let rules = compile_rules(&config.extraction, config.crawler.extract_emails)?;
    println!("\nExtraction Rules ({}):", rules.len());
    for rule in &rules {
        match &rule.attribute {
            Some(attribute) => println!("  - {} (attribute: {})", rule.field, attribute),
            None => println!("  - {} (text)", rule.field),
        }
    }
    println!("  Primary field: {}", config.extraction.primary_field);

    println!("\nOutput:");
    println!("  CSV directory: {}", config.output.csv_dir);

    let seeds = generate_seed_urls(&config.search);

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", seeds.len());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: prospect::config::Config,
    output_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    use prospect::output::{export_records, print_summary};

    let csv_dir = output_dir.unwrap_or_else(|| PathBuf::from(&config.output.csv_dir));

    tracing::info!(
        "Cities: {}, concurrent fetches: {}, detail page cap: {}",
        config.search.cities.len(),
        config.crawler.max_concurrent_fetches,
        config.crawler.detail_page_cap()
    );

    let outcome = match crawl(config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    print_summary(&outcome.summary);

    match export_records(&csv_dir, &outcome.records, &outcome.field_names)? {
        Some(path) => println!(
            "\n✓ Wrote {} records to {}",
            outcome.records.len(),
            path.display()
        ),
        None => println!("\nNo records collected; no CSV written"),
    }

    Ok(())
}
