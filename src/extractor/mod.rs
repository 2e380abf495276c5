//! Extraction pipeline
//!
//! This module contains everything between a raw input line and the rows
//! written to CSV:
//! - `RateLimiter`: rolling-window request budget
//! - `ProxyFetcher`: proxy fallthrough with per-attempt timeout and retry
//! - `parse_sitemap`: sitemap / sitemap index XML parsing
//! - `SitemapResolver`: one-level index expansion with filename fallback
//! - `BatchJob`: the resumable sequential batch over all inputs

mod control;
mod fetcher;
mod job;
mod parser;
mod rate_limiter;
mod resolver;

#[cfg(test)]
mod mock;

pub use control::StopHandle;
pub use fetcher::{build_http_client, proxy_request_url, ProxyFetcher, SitemapSource};
pub use job::{
    request_stop, BatchJob, JobOutcome, JobSummary, EMPTY_INPUT_MESSAGE,
    NOTHING_EXTRACTED_MESSAGE, STOPPED_MESSAGE,
};
pub use parser::{parse_sitemap, SitemapDocument};
pub use rate_limiter::RateLimiter;
pub use resolver::{Attempt, Resolution, SitemapResolver};
