use serde::Deserialize;

/// Relay proxies tried in priority order; the encoded target URL is appended
pub const DEFAULT_PROXIES: &[&str] = &["https://api.allorigins.win/raw?url=", "https://corsproxy.io/?"];

/// Longest allowed cache TTL (one year)
pub const MAX_TTL_HOURS: u64 = 24 * 365;

/// Browser-identifying user agent sent with every sitemap request
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/118.0.0.0 Safari/537.36";

/// Main configuration structure for Sitemap-Harvest
///
/// Every section is optional; a missing section falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(rename = "rate-limit", default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Proxy fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Proxy base URLs, in priority order
    #[serde(default = "default_proxies")]
    pub proxies: Vec<String>,

    /// Total attempts per proxy
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Timeout for a single attempt (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Fixed delay between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// User-Agent header value
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Outbound request budget
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window
    #[serde(rename = "max-requests", default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length (seconds)
    #[serde(rename = "window-secs", default = "default_window_secs")]
    pub window_secs: u64,
}

/// Sitemap cache behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// How long an extracted URL list stays valid (hours)
    #[serde(rename = "ttl-hours", default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

/// Batch job limits
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Inputs beyond this count are dropped
    #[serde(rename = "max-inputs", default = "default_max_inputs")]
    pub max_inputs: usize,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database holding batch state and the cache
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Path the extracted URLs are exported to
    #[serde(rename = "csv-path", default = "default_csv_path")]
    pub csv_path: String,
}

fn default_proxies() -> Vec<String> {
    DEFAULT_PROXIES.iter().map(|p| p.to_string()).collect()
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_max_requests() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    60
}

fn default_ttl_hours() -> u64 {
    24
}

fn default_max_inputs() -> usize {
    100
}

fn default_database_path() -> String {
    "./sitemap-harvest.db".to_string()
}

fn default_csv_path() -> String {
    "./sitemap_urls.csv".to_string()
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            proxies: default_proxies(),
            max_retries: default_max_retries(),
            timeout_ms: default_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_inputs: default_max_inputs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            csv_path: default_csv_path(),
        }
    }
}
