use crate::config::types::{Config, CrawlerConfig, InputConfig, OutputConfig};
use crate::fields::FieldRegistry;
use crate::url::{normalize_url, ScopeManager};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Runs once at startup. Every failure here is fatal and reported before any
/// request is sent.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_input_config(&config.input)?;
    validate_crawler_config(&config.crawler)?;
    ScopeManager::new(&config.scope)?;
    let registry = FieldRegistry::new(&config.custom_fields)?;
    validate_output_config(&config.output, &registry)?;
    Ok(())
}

/// Validates seed URLs
fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    for seed in &config.seeds {
        normalize_url(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 1000 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 1000, got {}",
            config.concurrency
        )));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1 second, got {}",
            config.timeout
        )));
    }

    if config.max_response_size < 1 {
        return Err(ConfigError::Validation(
            "max_response_size must be >= 1 byte".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let Some(proxy) = &config.proxy {
        let url = Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;
        if !matches!(url.scheme(), "http" | "https" | "socks5" | "socks5h") {
            return Err(ConfigError::InvalidUrl(format!(
                "Proxy '{}' must use http, https or socks5",
                proxy
            )));
        }
    }

    for header in &config.headers {
        parse_header(header)?;
    }

    Ok(())
}

/// Validates output configuration against the known fields
fn validate_output_config(
    config: &OutputConfig,
    registry: &FieldRegistry,
) -> Result<(), ConfigError> {
    if let Some(fields) = &config.fields {
        registry.parse(fields)?;
    }

    if let Some(store_fields) = &config.store_fields {
        registry.parse(store_fields)?;
        if config.store_fields_directory.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store_fields_directory cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Splits a `Name: value` header into its parts
pub fn parse_header(header: &str) -> Result<(String, String), ConfigError> {
    let (name, value) = header.split_once(':').ok_or_else(|| {
        ConfigError::Validation(format!("Header '{}' must be in 'Name: value' form", header))
    })?;

    let name = name.trim();
    if name.is_empty() || name.chars().any(|c| c.is_whitespace()) {
        return Err(ConfigError::Validation(format!(
            "Header '{}' has an invalid name",
            header
        )));
    }

    Ok((name.to_string(), value.trim().to_string()))
}
