//! Seed URL generation
//!
//! Seeds are the phase-1 search URLs, one per (city, keyword) pair. Only
//! cities that appear in the city list AND carry a keyword list contribute.

use crate::config::SearchConfig;

/// One phase-1 search URL with its originating city and keyword
#[derive(Debug, Clone)]
pub struct SeedUrl {
    pub url: String,
    pub city: String,
    pub keyword: String,
}

/// Expands the configured city/keyword table into seed URLs
///
/// Pure function: no network access, no deduplication, no failure modes.
/// Cities follow their configured order, keywords the order of each list.
/// Cities missing from the keyword table (and keyword entries for unlisted
/// cities) are silently skipped. An empty city list or all-empty keyword
/// lists produce an empty result, which the orchestrator treats as
/// "nothing to crawl".
pub fn generate_seed_urls(search: &SearchConfig) -> Vec<SeedUrl> {
    let mut seeds = Vec::new();

    for city in &search.cities {
        if let Some(keywords) = search.keywords.get(city) {
            for keyword in keywords {
                seeds.push(SeedUrl {
                    url: build_search_url(&search.base_url, keyword, city),
                    city: city.clone(),
                    keyword: keyword.clone(),
                });
            }
        }
    }

    seeds
}

/// Builds one search URL from the base and the `{keyword} in {city}` phrase
///
/// Only spaces are encoded (as `+`); case is preserved.
fn build_search_url(base_url: &str, keyword: &str, city: &str) -> String {
    let query = format!("{} in {}", keyword, city);
    let encoded = query.split_whitespace().collect::<Vec<_>>().join("+");
    format!("{}{}", base_url, encoded)
}
