use crate::config::types::{BackendConfig, CatalogConfig, Config, HttpConfig, WorkerConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_backend_config(&config.backend)?;
    validate_worker_config(&config.workers)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates catalog traversal configuration
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    validate_http_url("base-url", &config.base_url)?;

    if config.tags.is_empty() {
        return Err(ConfigError::Validation(
            "at least one tag must be configured".to_string(),
        ));
    }

    for tag in &config.tags {
        validate_tag(tag)?;
    }

    if config.max_page < 1 {
        return Err(ConfigError::Validation(format!(
            "max-page must be >= 1, got {}",
            config.max_page
        )));
    }

    Ok(())
}

/// Validates ingestion endpoint configuration
fn validate_backend_config(config: &BackendConfig) -> Result<(), ConfigError> {
    validate_http_url("backend url", &config.url)?;

    if config.token_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "token-env cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_worker_config(config: &WorkerConfig) -> Result<(), ConfigError> {
    if config.capacity < 1 || config.capacity > 256 {
        return Err(ConfigError::Validation(format!(
            "worker capacity must be between 1 and 256, got {}",
            config.capacity
        )));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeouts must be at least one second".to_string(),
        ));
    }

    Ok(())
}

/// Tags go into the URL path verbatim, so they must already be encoded
fn validate_tag(tag: &str) -> Result<(), ConfigError> {
    if tag.is_empty() {
        return Err(ConfigError::Validation("Tag cannot be empty".to_string()));
    }

    if tag
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#'))
    {
        return Err(ConfigError::Validation(format!(
            "Tag '{}' must be pre-encoded (use '+' for spaces, no '/', '?' or '#')",
            tag
        )));
    }

    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
