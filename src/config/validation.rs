use crate::config::types::{Config, FetchConfig, OutputConfig, SourceConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the article source settings
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    validate_url_template(&config.url_template)?;

    if config.id_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "id_prefix cannot be empty".to_string(),
        ));
    }

    if !config.id_prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "id_prefix must contain only ASCII letters and digits, got '{}'",
            config.id_prefix
        )));
    }

    // Identifiers are uppercased before the prefix check.
    if config.id_prefix != config.id_prefix.to_ascii_uppercase() {
        return Err(ConfigError::Validation(format!(
            "id_prefix must be uppercase, got '{}'",
            config.id_prefix
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates retry settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min_delay_ms ({}) cannot exceed max_delay_ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation("root cannot be empty".to_string()));
    }

    if config.wrap_width < 1 {
        return Err(ConfigError::Validation(
            "wrap_width must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Checks that the template has an `{id}` slot and renders to an HTTP(S) URL
fn validate_url_template(template: &str) -> Result<(), ConfigError> {
    if !template.contains("{id}") {
        return Err(ConfigError::InvalidTemplate(format!(
            "'{}' has no {{id}} placeholder",
            template
        )));
    }

    let sample = template.replace("{id}", "PMC1");
    let url = Url::parse(&sample)
        .map_err(|e| ConfigError::InvalidTemplate(format!("'{}': {}", template, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidTemplate(format!(
            "'{}' must use http or https",
            template
        )));
    }

    Ok(())
}
