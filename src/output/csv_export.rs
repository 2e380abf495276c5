//! CSV export of extracted rows

use crate::state::{OutputRow, CSV_HEADER};
use crate::SitemapError;
use std::io::Write;
use std::path::Path;

/// Writes the header and `rows` as CSV to `writer`
fn write_rows<W: Write>(rows: &[OutputRow], writer: W) -> Result<(), SitemapError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for row in rows {
        csv_writer.write_record([row.sitemap_url.as_str(), row.extracted_url.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes rows to a CSV file, replacing it if it exists
///
/// # Arguments
///
/// * `rows` - The (sitemap, page) pairs to export
/// * `path` - Destination file
///
/// # Returns
///
/// * `Ok(())` - File written
/// * `Err(SitemapError)` - Failed to create or write the file
pub fn write_csv(rows: &[OutputRow], path: &Path) -> Result<(), SitemapError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::File::create(path)?;
    write_rows(rows, file)
}

/// Renders rows as CSV text
pub fn to_csv_string(rows: &[OutputRow]) -> Result<String, SitemapError> {
    let mut buffer = Vec::new();
    write_rows(rows, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| SitemapError::Validation(e.to_string()))
}
