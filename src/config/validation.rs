use crate::config::types::{Config, CrawlerConfig, FrontierConfig, StoreConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_store_config(&config.store)?;
    validate_seeds(&config.frontier)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_tasks < 1 || config.max_concurrent_tasks > 1000 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_tasks must be between 1 and 1000, got {}",
            config.max_concurrent_tasks
        )));
    }

    if config.fetch_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_ms must be >= 100ms, got {}ms",
            config.fetch_timeout_ms
        )));
    }

    // Tasks renew their claim on start and after the fetch, so the lease only
    // has to outlast one fetch or one page's ingest
    if config.claim_lease_secs > 0
        && config.claim_lease_secs.saturating_mul(1000) <= config.fetch_timeout_ms
    {
        return Err(ConfigError::Validation(format!(
            "claim_lease_secs ({}s) must exceed fetch_timeout_ms ({}ms)",
            config.claim_lease_secs, config.fetch_timeout_ms
        )));
    }

    if config.idle_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "idle_interval_ms must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates seed addresses
fn validate_seeds(config: &FrontierConfig) -> Result<(), ConfigError> {
    for seed in &config.seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidSeed(format!("'{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidSeed(format!(
                "'{}' must use the http or https scheme",
                seed
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidSeed(format!("'{}' has no host", seed)));
        }
    }

    Ok(())
}
