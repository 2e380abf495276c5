//! Progress and status reporting for a batch run
//!
//! Everything here reads a `BatchState` snapshot; nothing touches the
//! network or the store.

use crate::state::{BatchState, JobStatus};
use std::collections::BTreeMap;

/// Summary of a batch snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStatistics {
    pub status: JobStatus,

    /// Completion percentage in `0.0..=100.0`
    pub percent: f64,

    pub processed: usize,
    pub total: usize,

    /// Number of extracted (sitemap, page) rows
    pub rows: usize,

    pub errors: usize,

    /// Rows per sitemap, ordered by sitemap URL
    pub rows_by_sitemap: BTreeMap<String, usize>,
}

impl BatchStatistics {
    /// Collects statistics from a snapshot
    pub fn from_state(state: &BatchState) -> Self {
        let mut rows_by_sitemap = BTreeMap::new();
        for row in &state.output_rows {
            *rows_by_sitemap.entry(row.sitemap_url.clone()).or_insert(0) += 1;
        }

        Self {
            status: state.status(),
            percent: state.progress_percent(),
            processed: state.processed_count,
            total: state.total_count,
            rows: state.output_rows.len(),
            errors: state.errors.len(),
            rows_by_sitemap,
        }
    }
}

/// Formats the one-line progress indicator
///
/// # Example
///
/// ```
/// use sitemap_harvest::output::format_progress;
///
/// assert_eq!(format_progress(1, 4), "25.0% Complete (1/4 URLs processed)");
/// ```
pub fn format_progress(processed: usize, total: usize) -> String {
    let percent = if total > 0 {
        (processed as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    format!(
        "{:.1}% Complete ({}/{} URLs processed)",
        percent, processed, total
    )
}

/// Prints a snapshot to stdout in a formatted manner
///
/// # Arguments
///
/// * `state` - The snapshot to display
/// * `show_log` - Whether to include the result log
pub fn print_status(state: &BatchState, show_log: bool) {
    let stats = BatchStatistics::from_state(state);

    println!("=== Sitemap Extraction ===\n");

    println!("Overview:");
    println!("  Status: {}", stats.status);
    println!("  {}", format_progress(stats.processed, stats.total));
    if stats.total > 0 {
        println!("  Started: {}", state.started_at.to_rfc3339());
        println!("  Updated: {}", state.updated_at.to_rfc3339());
    }
    println!("  URLs extracted: {}", stats.rows);
    println!("  Errors: {}", stats.errors);
    println!();

    if !stats.rows_by_sitemap.is_empty() {
        println!("URLs by Sitemap:");
        let mut counts: Vec<_> = stats.rows_by_sitemap.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));
        for (sitemap, count) in counts {
            println!("  {}: {}", sitemap, count);
        }
        println!();
    }

    if !state.errors.is_empty() {
        println!("Errors:");
        for error in &state.errors {
            println!("  - {}", error);
        }
        println!();
    }

    if show_log && !state.log.is_empty() {
        println!("Log:");
        for line in &state.log {
            println!("  {}", line);
        }
        println!();
    }

    if stats.status == JobStatus::Running {
        println!("Run `sitemap-harvest resume` to continue this extraction.");
    }
}
