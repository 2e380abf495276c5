//! Output module for reporting extraction results
//!
//! This module handles:
//! - Exporting extracted rows as CSV
//! - Formatting progress and status summaries

mod csv_export;
pub mod stats;

pub use csv_export::{to_csv_string, write_csv};
pub use stats::{format_progress, print_status, BatchStatistics};
