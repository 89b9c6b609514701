//! Crawler module for the two-phase listing harvest
//!
//! This module contains the core crawling logic, including:
//! - Seed URL generation from the city/keyword configuration
//! - HTTP fetching behind a mockable fetcher trait
//! - Detail link harvesting into a deduplicated frontier
//! - Record collection from detail pages
//! - Two-phase orchestration with bounded concurrency

mod collector;
mod fetcher;
mod frontier;
mod harvester;
mod orchestrator;
mod seeds;

pub use collector::{handle_detail_page, Record};
pub use fetcher::{
    build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher, DEFAULT_USER_AGENT,
};
pub use frontier::{DetailTarget, Frontier};
pub use harvester::{extract_detail_links, handle_search_page};
pub use orchestrator::{run_crawl, CrawlOutcome, CrawlPhase, CrawlSummary, Orchestrator};
pub use seeds::{generate_seed_urls, SeedUrl};

use crate::config::Config;
use crate::ProspectError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Compile the extraction rule set
/// 3. Generate seed URLs and crawl the search pages
/// 4. Crawl discovered detail pages
/// 5. Hand back records and run counters
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl completed; records and counters inside
/// * `Err(ProspectError)` - Configuration or client construction failure
pub async fn crawl(config: Config) -> Result<CrawlOutcome, ProspectError> {
    run_crawl(config).await
}
