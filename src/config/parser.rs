use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is recorded in the run summary so that two output directories
/// can be traced back to the configuration that produced them.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"
[fetcher]
delay-ms = 1000
max-retries = 3

[user-agent]
crawler-name = "OscarLedger"
crawler-version = "0.1"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[editions]
first-year = 1929
count = 96

[output]
directory = "./data"

[[category]]
name = "Best Picture"
urls = [
    "https://en.wikipedia.org/wiki/Academy_Award_for_Best_Picture",
    "https://en.wikipedia.org/wiki/List_of_Academy_Award_winners_and_nominees_for_Best_Picture",
]

[[category]]
name = "Best Director"
urls = ["https://en.wikipedia.org/wiki/Academy_Award_for_Best_Director"]
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.fetcher.delay_ms, 1000);
        assert_eq!(config.fetcher.backoff_ms, 2000);
        assert_eq!(config.user_agent.crawler_name, "OscarLedger");
        assert_eq!(config.editions.count, 96);
        assert!(config.editions.fetch_ceremonies);
        assert_eq!(config.output.delimiter, ",");
        assert_eq!(config.output.summary_file, "run_summary.md");
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[0].urls.len(), 2);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = VALID.replace("delay-ms = 1000", "delay-ms = 10");
        let result = parse_config(&content);
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_missing_categories_rejected() {
        let content = VALID.split("[[category]]").next().unwrap().to_string();
        assert!(matches!(
            parse_config(&content),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        assert_ne!(
            compute_config_hash(file1.path()).unwrap(),
            compute_config_hash(file2.path()).unwrap()
        );
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let config = parse_config(include_str!("../../oscar-ledger.toml")).unwrap();
        assert_eq!(config.categories.len(), 20);
        assert_eq!(config.editions.count, 96);
        assert_eq!(config.output.delimiter, ",");
    }
}
