//! Sitemap-Harvest: a resumable sitemap URL extractor
//!
//! This crate pulls page URLs out of XML sitemaps for a list of sites. Fetches go
//! through CORS-style relay proxies with retry, are throttled by a rolling rate
//! window, and are cached for a day. A batch of inputs is processed strictly in
//! order and its progress is persisted after every item so an interrupted run
//! can be resumed.

pub mod cache;
pub mod config;
pub mod extractor;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sitemap-Harvest operations
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Validation(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while resolving a single input URL
///
/// Every variant is caught at the batch item boundary and recorded against
/// that item; none of them abort a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("Request timed out after {timeout_ms}ms: {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error in {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Cache error: {0}")]
    Cache(String),
}

/// Result type alias for Sitemap-Harvest operations
pub type Result<T> = std::result::Result<T, SitemapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for per-item extraction
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

// Re-export commonly used types
pub use config::Config;
pub use extractor::{BatchJob, JobOutcome, StopHandle};
pub use state::BatchState;
pub use url::{normalize_sitemap_url, NormalizedUrl};
