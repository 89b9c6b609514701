//! CSV export of collected records
//!
//! Records are written with one column per extraction field, in configured
//! rule order, followed by the provenance columns `source_url`, `city`,
//! and `keyword`. Missing fields are written as empty cells.

use crate::crawler::Record;
use std::fs;
use std::path::{Path, PathBuf};

/// Builds a timestamped CSV path under the given directory
///
/// File names follow `prospect_results_<YYYYmmdd_HHMMSS>.csv` in local time.
pub fn timestamped_csv_path(csv_dir: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    csv_dir.join(format!("prospect_results_{}.csv", timestamp))
}

/// Writes records to a CSV file at the given path
///
/// # Arguments
///
/// * `path` - Destination file path
/// * `records` - The records to write
/// * `field_names` - Extraction field names, in column order
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the file
/// * `Err(ProspectError)` - Failed to create or write the file
pub fn write_records(path: &Path, records: &[Record], field_names: &[String]) -> crate::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = field_names.iter().map(String::as_str).collect();
    header.extend(["source_url", "city", "keyword"]);
    writer.write_record(&header)?;

    for record in records {
        let mut row: Vec<&str> = field_names
            .iter()
            .map(|name| record.field(name).unwrap_or(""))
            .collect();
        row.extend([
            record.source_url.as_str(),
            record.city.as_str(),
            record.keyword.as_str(),
        ]);
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Exports records to a timestamped CSV file under `csv_dir`
///
/// Creates the directory if it does not exist. When there are no records,
/// no file is written.
///
/// # Arguments
///
/// * `csv_dir` - Directory that receives the CSV file
/// * `records` - The records to write
/// * `field_names` - Extraction field names, in column order
///
/// # Returns
///
/// * `Ok(Some(path))` - Records written to `path`
/// * `Ok(None)` - Nothing to export
/// * `Err(ProspectError)` - Failed to create the directory or write the file
pub fn export_records(
    csv_dir: &Path,
    records: &[Record],
    field_names: &[String],
) -> crate::Result<Option<PathBuf>> {
    if records.is_empty() {
        return Ok(None);
    }

    fs::create_dir_all(csv_dir)?;
    let path = timestamped_csv_path(csv_dir);
    write_records(&path, records, field_names)?;
    Ok(Some(path))
}
