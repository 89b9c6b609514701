//! Phase-1 handler: harvesting detail links from search pages
//!
//! A search page contributes every anchor whose href contains the configured
//! detail-link pattern, resolved to an absolute URL against the page's own
//! URL. New URLs enter the frontier in first-seen order; anything already
//! known is skipped silently.

use crate::crawler::{FetchedPage, Frontier, SeedUrl};
use scraper::{Html, Selector};
use url::Url;

/// Routes one fetched search page into the frontier
///
/// Non-2xx pages contribute nothing (logged, not fatal) and return None.
/// Otherwise returns the number of newly inserted detail URLs. Unparsable
/// markup degrades to zero links rather than an error.
pub fn handle_search_page(
    page: &FetchedPage,
    seed: &SeedUrl,
    pattern: &str,
    frontier: &mut Frontier,
) -> Option<usize> {
    if !page.is_success() {
        tracing::warn!(
            "Search page {} returned status {}, skipping",
            page.url,
            page.status_code
        );
        return None;
    }

    let links = extract_detail_links(&page.html, &page.url, pattern);

    let mut inserted = 0;
    for link in &links {
        if frontier.insert(link, &seed.city, &seed.keyword) {
            inserted += 1;
        }
    }

    tracing::debug!(
        "Found {} detail links on {} ({} new)",
        links.len(),
        page.url,
        inserted
    );

    Some(inserted)
}

/// Extracts absolute detail-page URLs from a search page body
///
/// Anchors qualify when their href contains `pattern`. Relative hrefs are
/// resolved against `base_url`; only http/https results are kept. An
/// unparsable base URL yields no links.
pub fn extract_detail_links(html: &str, base_url: &str, pattern: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(e) => {
            tracing::debug!("Cannot resolve links against '{}': {}", base_url, e);
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(anchor_selector) = Selector::parse("a[href]") {
        for element in document.select(&anchor_selector) {
            if let Some(href) = element.value().attr("href") {
                if !href.contains(pattern) {
                    continue;
                }

                if let Some(absolute_url) = resolve_link(href, &base) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    // Skip empty hrefs
    if href.is_empty() {
        return None;
    }

    // Skip special schemes
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Skip fragment-only links (same page anchors)
    if href.starts_with('#') {
        return None;
    }

    // Try to resolve the URL
    match base_url.join(href) {
        Ok(absolute_url) => {
            // Only accept HTTP and HTTPS URLs
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
