//! Shared fixtures for the integration tests

use sitemap_harvest::config::{Config, FetcherConfig, OutputConfig};
use std::path::Path;

pub const TEST_USER_AGENT: &str = "TestAgent/1.0";

/// Fetcher settings with short timings for tests
pub fn fetcher_config(proxies: Vec<String>) -> FetcherConfig {
    FetcherConfig {
        proxies,
        max_retries: 3,
        timeout_ms: 2000,
        retry_delay_ms: 10,
        user_agent: TEST_USER_AGENT.to_string(),
    }
}

/// Full configuration writing its database and CSV under `dir`
pub fn create_test_config(proxies: Vec<String>, dir: &Path) -> Config {
    Config {
        fetcher: fetcher_config(proxies),
        output: OutputConfig {
            database_path: dir.join("harvest.db").to_string_lossy().into_owned(),
            csv_path: dir.join("sitemap_urls.csv").to_string_lossy().into_owned(),
        },
        ..Config::default()
    }
}

pub fn urlset(urls: &[String]) -> String {
    let entries: String = urls
        .iter()
        .map(|u| format!("  <url><loc>{}</loc></url>\n", u))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>\n",
        entries
    )
}

pub fn sitemap_index(sitemaps: &[&str]) -> String {
    let entries: String = sitemaps
        .iter()
        .map(|u| format!("  <sitemap><loc>{}</loc></sitemap>\n", u))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</sitemapindex>\n",
        entries
    )
}

pub fn pages(base: &str, prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{}/{}/{}", base, prefix, i)).collect()
}
