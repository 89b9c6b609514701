use crate::config::types::{Config, CrawlerConfig, ExtractionConfig, OutputConfig, SearchConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_crawler_config(&config.crawler)?;
    validate_extraction_config(&config.extraction)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.base_url.is_empty() {
        return Err(ConfigError::Validation(
            "base_url cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(&config.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.detail_link_pattern.is_empty() {
        return Err(ConfigError::Validation(
            "detail_link_pattern cannot be empty".to_string(),
        ));
    }

    // Empty cities or keyword tables are valid: they produce an empty run
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.max_detail_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_detail_pages must be >= 1, got {}",
            config.max_detail_pages
        )));
    }

    if config.crawl_depth < 1 || config.crawl_depth > 10 {
        return Err(ConfigError::Validation(format!(
            "crawl_depth must be between 1 and 10, got {}",
            config.crawl_depth
        )));
    }

    if let Some(agent) = &config.user_agent {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent cannot be blank".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates extraction configuration
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.primary_field.is_empty() {
        return Err(ConfigError::Validation(
            "primary_field cannot be empty".to_string(),
        ));
    }

    if config.rules.is_empty() {
        return Err(ConfigError::Validation(
            "extraction must define at least one rule".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for rule in &config.rules {
        if rule.field.is_empty() {
            return Err(ConfigError::Validation(
                "rule field name cannot be empty".to_string(),
            ));
        }

        if rule.selector.is_empty() {
            return Err(ConfigError::Validation(format!(
                "rule '{}' has an empty selector",
                rule.field
            )));
        }

        if !seen.insert(rule.field.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate rule field '{}'",
                rule.field
            )));
        }
    }

    if !config.rules.iter().any(|r| r.field == config.primary_field) {
        return Err(ConfigError::Validation(format!(
            "primary_field '{}' does not match any rule",
            config.primary_field
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_dir.is_empty() {
        return Err(ConfigError::Validation(
            "csv_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
