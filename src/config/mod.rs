//! Configuration module for Sitemap-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so running without a config file is supported.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitemap-harvest.toml")).unwrap();
//! println!("Proxies: {:?}", config.fetcher.proxies);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BatchConfig, CacheConfig, Config, FetcherConfig, OutputConfig, RateLimitConfig,
    DEFAULT_PROXIES, DEFAULT_USER_AGENT, MAX_TTL_HOURS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, default_config_hash, load_config, load_config_with_hash};
