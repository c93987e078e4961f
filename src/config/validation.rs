use crate::config::types::{CatalogConfig, Config, CrawlConfig, HttpConfig, OutputConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_output_config(&config.output)?;
    validate_catalog_config(&config.catalog)?;
    validate_crawl_config(&config.crawl)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// The output directory is the only setting without a usable default
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    match config.directory.as_deref() {
        Some(dir) if !dir.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::Validation(
            "output directory not specified (use --outdir or [output] directory)".to_string(),
        )),
    }
}

fn validate_catalog_config(config: &CatalogConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", config.base_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    if config.id_param.is_empty() {
        return Err(ConfigError::Validation("id-param cannot be empty".to_string()));
    }

    if config.listing_selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "listing-selector cannot be empty".to_string(),
        ));
    }

    if scraper::Selector::parse(&config.listing_selector).is_err() {
        return Err(ConfigError::Validation(format!(
            "listing-selector '{}' is not a valid CSS selector",
            config.listing_selector
        )));
    }

    Ok(())
}

fn validate_crawl_config(config: &CrawlConfig) -> ConfigResult<()> {
    // start-page > max-page is allowed: the crawl simply visits no pages.
    if config.min_id > config.max_id {
        return Err(ConfigError::Validation(format!(
            "min-id ({}) must not exceed max-id ({})",
            config.min_id, config.max_id
        )));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> ConfigResult<()> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation("user-agent cannot be empty".to_string()));
    }

    Ok(())
}
