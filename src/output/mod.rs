//! Output module for exporting crawl results
//!
//! This module handles:
//! - CSV export of collected records
//! - Printing the end-of-run summary

mod csv_output;
mod summary;

pub use csv_output::{export_records, timestamped_csv_path, write_records};
pub use summary::print_summary;
