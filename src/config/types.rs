use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure for Prospect
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Search seeding configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Base search URL that encoded seed queries are appended to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Substring an anchor's href must contain to count as a detail link
    #[serde(rename = "detail-link-pattern")]
    pub detail_link_pattern: String,

    /// Cities to search, in seed order
    #[serde(default)]
    pub cities: Vec<String>,

    /// Keywords per city; cities without an entry contribute no seeds
    #[serde(default)]
    pub keywords: HashMap<String, Vec<String>>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent page fetches
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: u32,

    /// Maximum number of detail pages fetched in one run
    #[serde(rename = "max-detail-pages", default = "default_max_detail_pages")]
    pub max_detail_pages: u32,

    /// Multiplier on the detail-page cap
    #[serde(rename = "crawl-depth", default = "default_crawl_depth")]
    pub crawl_depth: u32,

    /// Adds a synthesized email rule reading mailto anchors
    #[serde(rename = "extract-emails", default)]
    pub extract_emails: bool,

    /// User-Agent header override
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
            max_detail_pages: default_max_detail_pages(),
            crawl_depth: default_crawl_depth(),
            extract_emails: false,
            user_agent: None,
        }
    }
}

impl CrawlerConfig {
    /// Effective frontier cap: max-detail-pages scaled by crawl-depth
    pub fn detail_page_cap(&self) -> usize {
        self.max_detail_pages as usize * self.crawl_depth as usize
    }
}

/// Field extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Field whose presence makes a record valid
    #[serde(rename = "primary-field")]
    pub primary_field: String,

    /// Extraction rules, in output column order
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// One declarative extraction rule
#[derive(Debug, Clone, Deserialize)]
pub struct RuleEntry {
    /// Output field name
    pub field: String,

    /// CSS selector, optionally with a trailing `::attr(name)` accessor
    pub selector: String,

    /// Attribute to read instead of element text
    #[serde(default)]
    pub attribute: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory CSV exports are written into
    #[serde(rename = "csv-dir", default = "default_csv_dir")]
    pub csv_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_dir: default_csv_dir(),
        }
    }
}

fn default_max_concurrent_fetches() -> u32 {
    8
}

fn default_max_detail_pages() -> u32 {
    50
}

fn default_crawl_depth() -> u32 {
    1
}

fn default_csv_dir() -> String {
    "./data".to_string()
}
