//! Batch job state, persisted after every processed item
//!
//! A `BatchState` is the complete snapshot of one extraction run. It is
//! created fresh when a run starts, mutated by the batch job one item at a
//! time, and written whole to storage after each item so a restarted process
//! can resume from `processed_count`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header row of the exported CSV
pub const CSV_HEADER: [&str; 2] = ["Sitemap URL", "Extracted URL"];

/// One extracted page URL and the sitemap it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    pub sitemap_url: String,
    pub extracted_url: String,
}

impl OutputRow {
    pub fn new(sitemap_url: impl Into<String>, extracted_url: impl Into<String>) -> Self {
        Self {
            sitemap_url: sitemap_url.into(),
            extracted_url: extracted_url.into(),
        }
    }
}

/// Lifecycle phase derived from a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// No job has been started
    Idle,
    /// Started and not finished; resumable after a restart
    Running,
    /// Every input was processed
    Completed,
    /// Ended early by a stop request
    Stopped,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Snapshot of an extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchState {
    /// Raw inputs, in processing order
    pub input_urls: Vec<String>,

    /// Accumulated (sitemap, page) pairs
    pub output_rows: Vec<OutputRow>,

    /// Number of inputs already handled, successfully or not
    pub processed_count: usize,

    /// Always equal to `input_urls.len()`
    pub total_count: usize,

    /// True from start until completion or an observed stop
    pub running: bool,

    /// Set by a stop request; observed at the next item boundary
    pub stop_requested: bool,

    /// One message per failed input
    pub errors: Vec<String>,

    /// Human-readable per-item results, errors and markers
    #[serde(default)]
    pub log: Vec<String>,

    /// Hash of the configuration the run was started with
    #[serde(default)]
    pub config_hash: Option<String>,

    pub started_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Default for BatchState {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            input_urls: Vec::new(),
            output_rows: Vec::new(),
            processed_count: 0,
            total_count: 0,
            running: false,
            stop_requested: false,
            errors: Vec::new(),
            log: Vec::new(),
            config_hash: None,
            started_at: now,
            updated_at: now,
        }
    }
}

impl BatchState {
    /// Creates the state for a fresh run over `input_urls`
    pub fn new(input_urls: Vec<String>, config_hash: Option<String>) -> Self {
        let total_count = input_urls.len();
        Self {
            input_urls,
            total_count,
            running: true,
            config_hash,
            ..Self::default()
        }
    }

    /// Derives the lifecycle phase from the snapshot fields
    pub fn status(&self) -> JobStatus {
        if self.running {
            JobStatus::Running
        } else if self.total_count == 0 {
            JobStatus::Idle
        } else if self.is_complete() {
            JobStatus::Completed
        } else {
            JobStatus::Stopped
        }
    }

    /// Returns true once every input has been handled
    pub fn is_complete(&self) -> bool {
        self.processed_count >= self.total_count
    }

    /// Returns true if a run was interrupted and can continue
    pub fn is_resumable(&self) -> bool {
        self.running && !self.is_complete()
    }

    /// Completion percentage in `0.0..=100.0`
    pub fn progress_percent(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        (self.processed_count as f64 / self.total_count as f64) * 100.0
    }

    /// The raw input at the next unprocessed index
    pub fn next_input(&self) -> Option<&str> {
        self.input_urls
            .get(self.processed_count)
            .map(String::as_str)
    }

    /// Records a successfully resolved input
    pub fn record_success(&mut self, sitemap_url: &str, pages: &[String], cached: bool) {
        self.output_rows
            .extend(pages.iter().map(|page| OutputRow::new(sitemap_url, page.as_str())));
        self.log.push(format!(
            "Extracted {} URLs from {}{}",
            pages.len(),
            sitemap_url,
            if cached { " (cached)" } else { "" }
        ));
    }

    /// Records a failed input; the batch continues
    pub fn record_error(&mut self, raw_url: &str, message: &str) {
        self.errors.push(message.to_string());
        self.log
            .push(format!("Error processing {}: {}", raw_url, message));
    }

    /// Marks the current item as handled
    pub fn advance(&mut self) {
        self.processed_count = (self.processed_count + 1).min(self.total_count);
        self.updated_at = Utc::now();
    }

    /// Appends a line to the result log
    pub fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }
}
