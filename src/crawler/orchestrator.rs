//! Crawl orchestration - the two-phase pipeline
//!
//! This module contains the state machine that drives a full run:
//! - Seed generation from the city/keyword configuration
//! - Phase 1: bounded-concurrency search-page fetches feeding the frontier
//! - Frontier freeze, capped to the configured volume bound
//! - Phase 2: bounded-concurrency detail-page fetches feeding the result set
//! - Summary and result handoff
//!
//! Fetch completions are consumed one at a time on the orchestrating task,
//! so the frontier and result set have a single writer and need no locking.

use crate::config::Config;
use crate::crawler::collector::handle_detail_page;
use crate::crawler::harvester::handle_search_page;
use crate::crawler::{
    build_http_client, generate_seed_urls, DetailTarget, Frontier, HttpFetcher, PageFetcher,
    Record, SeedUrl,
};
use crate::extract::{compile_rules, SelectorRule};
use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Phase of a crawl run
///
/// Runs move strictly forward: seeds are generated, search pages crawled,
/// detail pages crawled, then `Done`. `Failed` is reached only when the
/// rule set cannot be compiled; per-page trouble never fails a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    GeneratingSeeds,
    CrawlingSearch,
    CrawlingDetail,
    Done,
    Failed,
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrawlPhase::Idle => "idle",
            CrawlPhase::GeneratingSeeds => "generating-seeds",
            CrawlPhase::CrawlingSearch => "crawling-search",
            CrawlPhase::CrawlingDetail => "crawling-detail",
            CrawlPhase::Done => "done",
            CrawlPhase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Counters accumulated over one run
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// Seed URLs generated from the city/keyword table
    pub seeds_generated: usize,

    /// Search pages fetched with a 2xx status
    pub search_pages_fetched: usize,

    /// Search fetches that failed (transport error or non-2xx status)
    pub search_fetch_failures: usize,

    /// Unique detail URLs discovered during phase 1
    pub detail_urls_discovered: usize,

    /// Detail URLs queued for phase 2, after the cap
    pub detail_urls_queued: usize,

    /// Detail pages fetched with a 2xx status
    pub detail_pages_fetched: usize,

    /// Detail fetches that failed (transport error or non-2xx status)
    pub detail_fetch_failures: usize,

    /// Valid records collected
    pub records_collected: usize,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

/// Everything a finished run hands back to the caller
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Valid records, in phase-2 completion order
    pub records: Vec<Record>,

    /// Rule field names in configured order (CSV column order)
    pub field_names: Vec<String>,

    /// Run counters
    pub summary: CrawlSummary,
}

/// Drives the two-phase crawl over any page fetcher
pub struct Orchestrator<F: PageFetcher> {
    config: Config,
    fetcher: F,
    phase: CrawlPhase,
    cancelled: Arc<AtomicBool>,
}

impl<F: PageFetcher> Orchestrator<F> {
    /// Creates an orchestrator over the given configuration and fetcher
    pub fn new(config: Config, fetcher: F) -> Self {
        Self {
            config,
            fetcher,
            phase: CrawlPhase::Idle,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current phase of the run
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Returns the flag that stops dispatch of new fetches when set
    ///
    /// In-flight fetches drain normally; the run then completes with
    /// whatever was gathered so far.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    fn set_phase(&mut self, phase: CrawlPhase) {
        tracing::debug!("Crawl phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    /// Runs the full two-phase crawl
    ///
    /// 1. Compile the selector rule set (the only fatal path)
    /// 2. Generate seed URLs; no seeds ends the run with an empty result
    /// 3. Phase 1: fetch search pages, harvest detail links into the frontier
    /// 4. Freeze the frontier, capped at max-detail-pages times crawl-depth
    /// 5. Phase 2: fetch detail pages, collect validated records
    ///
    /// Per-page failures never abort a run; they are logged and counted.
    pub async fn run(&mut self) -> crate::Result<CrawlOutcome> {
        let start_time = Instant::now();

        self.set_phase(CrawlPhase::GeneratingSeeds);
        let rules = match compile_rules(&self.config.extraction, self.config.crawler.extract_emails)
        {
            Ok(rules) => rules,
            Err(e) => {
                self.set_phase(CrawlPhase::Failed);
                return Err(e.into());
            }
        };
        let field_names: Vec<String> = rules.iter().map(|r| r.field.clone()).collect();

        let seeds = generate_seed_urls(&self.config.search);
        let mut summary = CrawlSummary {
            seeds_generated: seeds.len(),
            ..Default::default()
        };
        tracing::info!("Generated {} seed URLs", seeds.len());

        if seeds.is_empty() {
            tracing::info!("Nothing to crawl");
            return Ok(self.finish(Vec::new(), field_names, summary, start_time));
        }

        self.set_phase(CrawlPhase::CrawlingSearch);
        let mut frontier = Frontier::new();
        self.crawl_search_pages(&seeds, &mut frontier, &mut summary)
            .await;
        summary.detail_urls_discovered = frontier.len();
        tracing::info!(
            "Search phase complete: {} detail URLs discovered",
            frontier.len()
        );

        let cap = self.config.crawler.detail_page_cap();
        if frontier.len() > cap {
            tracing::info!("Truncating frontier from {} to {} URLs", frontier.len(), cap);
        }
        let targets = frontier.into_targets(cap);
        summary.detail_urls_queued = targets.len();

        if targets.is_empty() {
            tracing::info!("No detail pages discovered");
            return Ok(self.finish(Vec::new(), field_names, summary, start_time));
        }

        self.set_phase(CrawlPhase::CrawlingDetail);
        let records = self
            .crawl_detail_pages(&targets, &rules, &mut summary)
            .await;

        Ok(self.finish(records, field_names, summary, start_time))
    }

    /// Phase 1: fetch every seed URL and harvest detail links
    async fn crawl_search_pages(
        &self,
        seeds: &[SeedUrl],
        frontier: &mut Frontier,
        summary: &mut CrawlSummary,
    ) {
        let pattern = self.config.search.detail_link_pattern.as_str();
        let limit = self.config.crawler.max_concurrent_fetches as usize;
        let fetcher = &self.fetcher;
        let cancelled = &self.cancelled;

        let mut fetches = stream::iter(
            seeds
                .iter()
                .take_while(|_| !cancelled.load(Ordering::Relaxed)),
        )
        .map(|seed| async move { (seed, fetcher.fetch(&seed.url).await) })
        .buffer_unordered(limit);

        let mut completed = 0usize;
        while let Some((seed, outcome)) = fetches.next().await {
            completed += 1;
            match outcome {
                // The handler returns None for non-2xx pages
                Ok(page) => match handle_search_page(&page, seed, pattern, frontier) {
                    Some(_) => summary.search_pages_fetched += 1,
                    None => summary.search_fetch_failures += 1,
                },
                Err(e) => {
                    summary.search_fetch_failures += 1;
                    tracing::warn!("Search fetch failed: {}", e);
                }
            }

            if completed % 10 == 0 {
                tracing::info!(
                    "Progress: {}/{} search pages, {} detail URLs discovered",
                    completed,
                    seeds.len(),
                    frontier.len()
                );
            }
        }
    }

    /// Phase 2: fetch queued detail pages and collect validated records
    ///
    /// Records land in completion order, which concurrency makes
    /// non-deterministic from run to run.
    async fn crawl_detail_pages(
        &self,
        targets: &[DetailTarget],
        rules: &[SelectorRule],
        summary: &mut CrawlSummary,
    ) -> Vec<Record> {
        let primary_field = self.config.extraction.primary_field.as_str();
        let limit = self.config.crawler.max_concurrent_fetches as usize;
        let fetcher = &self.fetcher;
        let cancelled = &self.cancelled;

        let mut fetches = stream::iter(
            targets
                .iter()
                .take_while(|_| !cancelled.load(Ordering::Relaxed)),
        )
        .map(|target| async move { (target, fetcher.fetch(&target.url).await) })
        .buffer_unordered(limit);

        let mut records = Vec::new();
        let mut completed = 0usize;
        while let Some((target, outcome)) = fetches.next().await {
            completed += 1;
            match outcome {
                Ok(page) => {
                    if page.is_success() {
                        summary.detail_pages_fetched += 1;
                    } else {
                        summary.detail_fetch_failures += 1;
                    }
                    if let Some(record) = handle_detail_page(&page, target, rules, primary_field) {
                        records.push(record);
                    }
                }
                Err(e) => {
                    summary.detail_fetch_failures += 1;
                    tracing::warn!("Detail fetch failed: {}", e);
                }
            }

            if completed % 10 == 0 {
                tracing::info!(
                    "Progress: {}/{} detail pages, {} records collected",
                    completed,
                    targets.len(),
                    records.len()
                );
            }
        }

        records
    }

    /// Seals a run: sets the terminal phase, stamps counters, logs totals
    fn finish(
        &mut self,
        records: Vec<Record>,
        field_names: Vec<String>,
        mut summary: CrawlSummary,
        start_time: Instant,
    ) -> CrawlOutcome {
        self.set_phase(CrawlPhase::Done);
        summary.records_collected = records.len();
        summary.duration = start_time.elapsed();
        tracing::info!(
            "Crawl completed: {} records collected in {:?}",
            records.len(),
            summary.duration
        );

        CrawlOutcome {
            records,
            field_names,
            summary,
        }
    }
}

/// Runs a complete crawl with the real HTTP fetcher
///
/// This function:
///
/// 1. Builds the HTTP client from the crawler configuration
/// 2. Compiles the extraction rule set
/// 3. Generates seed URLs from the city/keyword table
/// 4. Crawls search pages, harvesting detail links
/// 5. Crawls the discovered detail pages, collecting records
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Records, field order, and run counters
/// * `Err(ProspectError)` - Configuration or client construction failure
///
/// # Example
///
/// ```no_run
/// use prospect::config::load_config;
/// use prospect::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let outcome = run_crawl(config).await?;
/// println!("Collected {} records", outcome.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> crate::Result<CrawlOutcome> {
    let client = build_http_client(config.crawler.user_agent.as_deref())?;
    let fetcher = HttpFetcher::new(client);
    let mut orchestrator = Orchestrator::new(config, fetcher);
    orchestrator.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, ExtractionConfig, OutputConfig, RuleEntry, SearchConfig};
    use crate::crawler::{FetchError, FetchedPage};
    use std::collections::HashMap;

    /// In-memory fetcher serving canned pages keyed by URL
    struct StubFetcher {
        pages: HashMap<String, (u16, String)>,
    }

    impl StubFetcher {
        fn new() -> Self {
            Self {
                pages: HashMap::new(),
            }
        }

        fn page(mut self, url: &str, status_code: u16, html: &str) -> Self {
            self.pages
                .insert(url.to_string(), (status_code, html.to_string()));
            self
        }
    }

    #[async_trait::async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            match self.pages.get(url) {
                Some((status_code, html)) => Ok(FetchedPage {
                    url: url.to_string(),
                    status_code: *status_code,
                    html: html.clone(),
                }),
                None => Err(FetchError::Connect {
                    url: url.to_string(),
                    message: "no stub page".to_string(),
                }),
            }
        }
    }

    fn test_config() -> Config {
        let mut keywords = HashMap::new();
        keywords.insert("Springfield".to_string(), vec!["bakery".to_string()]);

        Config {
            search: SearchConfig {
                base_url: "https://maps.test/search/".to_string(),
                detail_link_pattern: "/place/".to_string(),
                cities: vec!["Springfield".to_string()],
                keywords,
            },
            crawler: CrawlerConfig::default(),
            extraction: ExtractionConfig {
                primary_field: "name".to_string(),
                rules: vec![RuleEntry {
                    field: "name".to_string(),
                    selector: "h1".to_string(),
                    attribute: None,
                }],
            },
            output: OutputConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_full_run_with_stub_fetcher() {
        let search_html = r#"<html><body>
            <a href="/place/ada">Ada's Bakery</a>
            <a href="/place/blue">Blue Oven</a>
        </body></html>"#;

        let fetcher = StubFetcher::new()
            .page(
                "https://maps.test/search/bakery+in+Springfield",
                200,
                search_html,
            )
            .page(
                "https://maps.test/place/ada",
                200,
                "<html><body><h1>Ada's Bakery</h1></body></html>",
            )
            .page(
                "https://maps.test/place/blue",
                200,
                "<html><body><h1>Blue Oven</h1></body></html>",
            );

        let mut orchestrator = Orchestrator::new(test_config(), fetcher);
        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(orchestrator.phase(), CrawlPhase::Done);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.summary.seeds_generated, 1);
        assert_eq!(outcome.summary.search_pages_fetched, 1);
        assert_eq!(outcome.summary.detail_urls_discovered, 2);
        assert_eq!(outcome.summary.detail_urls_queued, 2);
        assert_eq!(outcome.summary.records_collected, 2);
        assert_eq!(outcome.field_names, vec!["name".to_string()]);

        // Completion order is unspecified, so compare sorted names
        let mut names: Vec<&str> = outcome
            .records
            .iter()
            .filter_map(|r| r.field("name"))
            .collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Ada's Bakery", "Blue Oven"]);
    }

    #[tokio::test]
    async fn test_empty_seeds_short_circuit() {
        let mut config = test_config();
        config.search.cities.clear();

        let mut orchestrator = Orchestrator::new(config, StubFetcher::new());
        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(orchestrator.phase(), CrawlPhase::Done);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.summary.seeds_generated, 0);
        assert_eq!(outcome.summary.search_pages_fetched, 0);
        assert_eq!(outcome.summary.search_fetch_failures, 0);
    }

    #[tokio::test]
    async fn test_no_links_short_circuit() {
        let fetcher = StubFetcher::new().page(
            "https://maps.test/search/bakery+in+Springfield",
            200,
            "<html><body><p>No results</p></body></html>",
        );

        let mut orchestrator = Orchestrator::new(test_config(), fetcher);
        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(orchestrator.phase(), CrawlPhase::Done);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.summary.detail_urls_queued, 0);
        assert_eq!(outcome.summary.detail_pages_fetched, 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_abort_run() {
        let mut config = test_config();
        config.search.keywords.insert(
            "Springfield".to_string(),
            vec!["bakery".to_string(), "plumber".to_string()],
        );

        // The plumber seed has no stub page and fails with a connect error
        let fetcher = StubFetcher::new()
            .page(
                "https://maps.test/search/bakery+in+Springfield",
                200,
                r#"<html><body><a href="/place/ada">Ada</a></body></html>"#,
            )
            .page(
                "https://maps.test/place/ada",
                200,
                "<html><body><h1>Ada's Bakery</h1></body></html>",
            );

        let mut orchestrator = Orchestrator::new(config, fetcher);
        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(orchestrator.phase(), CrawlPhase::Done);
        assert_eq!(outcome.summary.search_fetch_failures, 1);
        assert_eq!(outcome.summary.search_pages_fetched, 1);
        assert_eq!(outcome.records.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_selector_is_fatal() {
        let mut config = test_config();
        config.extraction.rules[0].selector = "h1[".to_string();

        let mut orchestrator = Orchestrator::new(config, StubFetcher::new());
        let result = orchestrator.run().await;

        assert!(result.is_err());
        assert_eq!(orchestrator.phase(), CrawlPhase::Failed);
    }

    #[tokio::test]
    async fn test_cancel_before_run_fetches_nothing() {
        let fetcher = StubFetcher::new().page(
            "https://maps.test/search/bakery+in+Springfield",
            200,
            r#"<html><body><a href="/place/ada">Ada</a></body></html>"#,
        );

        let mut orchestrator = Orchestrator::new(test_config(), fetcher);
        orchestrator.cancel_flag().store(true, Ordering::Relaxed);
        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(orchestrator.phase(), CrawlPhase::Done);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.summary.search_pages_fetched, 0);
        assert_eq!(outcome.summary.search_fetch_failures, 0);
    }

    #[tokio::test]
    async fn test_frontier_cap_limits_detail_fetches() {
        let mut config = test_config();
        config.crawler.max_detail_pages = 1;

        let search_html = r#"<html><body>
            <a href="/place/first">First</a>
            <a href="/place/second">Second</a>
        </body></html>"#;

        // No stub for /place/second: a request for it would be counted as
        // a detail fetch failure
        let fetcher = StubFetcher::new()
            .page(
                "https://maps.test/search/bakery+in+Springfield",
                200,
                search_html,
            )
            .page(
                "https://maps.test/place/first",
                200,
                "<html><body><h1>First Bakery</h1></body></html>",
            );

        let mut orchestrator = Orchestrator::new(config, fetcher);
        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(outcome.summary.detail_urls_discovered, 2);
        assert_eq!(outcome.summary.detail_urls_queued, 1);
        assert_eq!(outcome.summary.detail_fetch_failures, 0);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].field("name"), Some("First Bakery"));
    }

    #[tokio::test]
    async fn test_non_success_search_page_is_fail_soft() {
        let mut config = test_config();
        config.search.keywords.insert(
            "Springfield".to_string(),
            vec!["bakery".to_string(), "plumber".to_string()],
        );

        let fetcher = StubFetcher::new()
            .page(
                "https://maps.test/search/bakery+in+Springfield",
                200,
                r#"<html><body><a href="/place/ada">Ada</a></body></html>"#,
            )
            .page(
                "https://maps.test/search/plumber+in+Springfield",
                500,
                "<html><body>server error</body></html>",
            )
            .page(
                "https://maps.test/place/ada",
                200,
                "<html><body><h1>Ada's Bakery</h1></body></html>",
            );

        let mut orchestrator = Orchestrator::new(config, fetcher);
        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(outcome.summary.search_fetch_failures, 1);
        assert_eq!(outcome.summary.detail_urls_discovered, 1);
        assert_eq!(outcome.records.len(), 1);
    }
}
