use crate::config::types::{
    CategoryEntry, Config, EditionsConfig, FetcherConfig, OutputConfig, UserAgentConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_editions_config(&config.editions)?;
    validate_output_config(&config.output)?;
    validate_categories(&config.categories)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "delay_ms must be >= 100ms, got {}ms",
            config.delay_ms
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if !config.backoff_multiplier.is_finite() || config.backoff_multiplier < 1.0 {
        return Err(ConfigError::Validation(format!(
            "backoff_multiplier must be >= 1.0, got {}",
            config.backoff_multiplier
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_editions_config(config: &EditionsConfig) -> Result<(), ConfigError> {
    if config.count == 0 {
        return Err(ConfigError::Validation(
            "editions.count must be >= 1".to_string(),
        ));
    }

    if !config.ceremony_url_template.contains("{ordinal}") {
        return Err(ConfigError::Validation(format!(
            "ceremony_url_template must contain '{{ordinal}}', got '{}'",
            config.ceremony_url_template
        )));
    }

    let sample = config.ceremony_url_template.replace("{ordinal}", "1st");
    validate_http_url(&sample, "ceremony_url_template")?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.summary_file.is_empty() {
        return Err(ConfigError::Validation(
            "summary_file cannot be empty".to_string(),
        ));
    }

    let mut chars = config.delimiter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && !matches!(c, '"' | '\r' | '\n') => {}
        _ => {
            return Err(ConfigError::Validation(format!(
                "delimiter must be a single ASCII character other than a quote or newline, got {:?}",
                config.delimiter
            )));
        }
    }

    Ok(())
}

/// Validates the category list
fn validate_categories(categories: &[CategoryEntry]) -> Result<(), ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[category]] must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in categories {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "category name cannot be empty".to_string(),
            ));
        }

        if !seen.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "category '{}' is configured more than once",
                name
            )));
        }

        if entry.urls.is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' must have at least one URL",
                name
            )));
        }

        for url in &entry.urls {
            validate_http_url(url, name)?;
        }
    }

    Ok(())
}

fn validate_http_url(raw: &str, context: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid URL '{}' ({}): {}", raw, context, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "URL '{}' ({}) must use HTTP or HTTPS",
            raw, context
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
