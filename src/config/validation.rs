use crate::config::types::{
    Config, CrawlerConfig, GeminiConfig, KeywordConfig, OutputConfig, RetryConfig, ScorerConfig,
    ScorerKind,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_seeds(&config.seeds)?;
    validate_seeds(&config.test_mode.seeds)?;
    validate_crawler_config(&config.crawler)?;
    validate_retry_config(&config.retry)?;
    validate_keywords(&config.keywords)?;
    validate_scorer_config(&config.scorer)?;
    validate_output_config(&config.output)?;

    if config.test_mode.max_pages < 1 || config.test_mode.max_links_per_page < 1 {
        return Err(ConfigError::Validation(
            "test-mode max-pages and max-links-per-page must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Seeds must be absolute http(s) URLs
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Seed URL '{}' must use http or https",
                seed
            )));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    if config.max_links_per_page < 1 {
        return Err(ConfigError::Validation(format!(
            "max-links-per-page must be >= 1, got {}",
            config.max_links_per_page
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.base_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "base-delay-ms ({}) cannot exceed max-delay-ms ({})",
            config.base_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}

fn validate_keywords(config: &KeywordConfig) -> Result<(), ConfigError> {
    let blank = config
        .high
        .iter()
        .chain(config.medium.iter())
        .any(|k| k.trim().is_empty());

    if blank {
        return Err(ConfigError::Validation(
            "keywords cannot be blank".to_string(),
        ));
    }

    Ok(())
}

fn validate_scorer_config(config: &ScorerConfig) -> Result<(), ConfigError> {
    match config.kind {
        ScorerKind::Keyword => return Ok(()),
        ScorerKind::OpenAi => validate_backend(&config.endpoint, &config.model)?,
        ScorerKind::Gemini => validate_gemini_config(&config.gemini)?,
    }

    if config.calls_per_minute < 1 {
        return Err(ConfigError::Validation(
            "calls-per-minute must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_gemini_config(config: &GeminiConfig) -> Result<(), ConfigError> {
    validate_backend(&config.endpoint, &config.model)?;

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(
            "gemini batch-size must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_backend(endpoint: &str, model: &str) -> Result<(), ConfigError> {
    Url::parse(endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid scorer endpoint: {}", e)))?;

    if model.trim().is_empty() {
        return Err(ConfigError::Validation("model cannot be empty".to_string()));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
