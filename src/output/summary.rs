//! End-of-run summary printing

use crate::crawler::CrawlSummary;

/// Prints a run summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The run counters to display
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Seeds:");
    println!("  Seed URLs generated: {}", summary.seeds_generated);
    println!();

    println!("Search Phase:");
    println!("  Pages fetched: {}", summary.search_pages_fetched);
    println!("  Fetch failures: {}", summary.search_fetch_failures);
    println!(
        "  Detail URLs discovered: {}",
        summary.detail_urls_discovered
    );
    println!();

    println!("Detail Phase:");
    println!("  URLs queued: {}", summary.detail_urls_queued);
    println!("  Pages fetched: {}", summary.detail_pages_fetched);
    println!("  Fetch failures: {}", summary.detail_fetch_failures);
    println!();

    println!("Records collected: {}", summary.records_collected);
    println!("Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} detail pages yielded a record)",
        record_rate(summary.records_collected, summary.detail_urls_queued),
        summary.records_collected,
        summary.detail_urls_queued
    );
}

/// Percentage of queued detail pages that yielded a valid record
fn record_rate(records: usize, queued: usize) -> f64 {
    if queued == 0 {
        return 0.0;
    }
    (records as f64 / queued as f64) * 100.0
}
