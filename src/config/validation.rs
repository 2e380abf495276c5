use crate::config::types::{
    BatchConfig, CacheConfig, Config, FetcherConfig, OutputConfig, RateLimitConfig,
    MAX_TTL_HOURS,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_cache_config(&config.cache)?;
    validate_batch_config(&config.batch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates proxy fetch configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.proxies.is_empty() {
        return Err(ConfigError::Validation(
            "at least one proxy must be configured".to_string(),
        ));
    }

    for proxy in &config.proxies {
        let url = Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Proxy '{}' must use HTTP or HTTPS",
                proxy
            )));
        }
    }

    if config.max_retries < 1 || config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be between 1 and 10, got {}",
            config.max_retries
        )));
    }

    if config.timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "timeout_ms must be >= 100ms, got {}ms",
            config.timeout_ms
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the request budget
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.max_requests < 1 {
        return Err(ConfigError::Validation(format!(
            "max_requests must be >= 1, got {}",
            config.max_requests
        )));
    }

    if config.window_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "window_secs must be >= 1, got {}",
            config.window_secs
        )));
    }

    Ok(())
}

fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.ttl_hours < 1 || config.ttl_hours > MAX_TTL_HOURS {
        return Err(ConfigError::Validation(format!(
            "ttl_hours must be between 1 and {}, got {}",
            MAX_TTL_HOURS, config.ttl_hours
        )));
    }
    Ok(())
}

fn validate_batch_config(config: &BatchConfig) -> Result<(), ConfigError> {
    if config.max_inputs < 1 || config.max_inputs > 1000 {
        return Err(ConfigError::Validation(format!(
            "max_inputs must be between 1 and 1000, got {}",
            config.max_inputs
        )));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
