//! Detail URL frontier
//!
//! Phase 1 inserts discovered detail URLs here; phase 2 consumes a frozen,
//! capped snapshot. Deduplication is by exact string equality; iteration
//! order is first-seen insertion order.

use std::collections::HashSet;

/// A detail page queued for phase 2, carrying the provenance of the seed
/// that first discovered it
#[derive(Debug, Clone)]
pub struct DetailTarget {
    pub url: String,
    pub city: String,
    pub keyword: String,
}

/// Insertion-ordered, deduplicated set of discovered detail URLs
#[derive(Debug, Default)]
pub struct Frontier {
    seen: HashSet<String>,
    queue: Vec<DetailTarget>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a URL unless it is already known
    ///
    /// Returns true when the URL is new. The first discoverer's provenance
    /// sticks; later insertions of the same URL change nothing.
    pub fn insert(&mut self, url: &str, city: &str, keyword: &str) -> bool {
        if !self.seen.insert(url.to_string()) {
            return false;
        }

        self.queue.push(DetailTarget {
            url: url.to_string(),
            city: city.to_string(),
            keyword: keyword.to_string(),
        });
        true
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Freezes the frontier into an ordered snapshot of at most `cap` targets
    ///
    /// Truncation keeps the earliest-discovered URLs.
    pub fn into_targets(mut self, cap: usize) -> Vec<DetailTarget> {
        self.queue.truncate(cap);
        self.queue
    }
}
