use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - TMDB API key is present
/// - Search tuning values are positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.tmdb.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "tmdb.api_key is required (set it in the config file or MARQUEE_TMDB__API_KEY)"
                .to_string(),
        ));
    }

    if config.search.debounce_ms == 0 {
        return Err(ConfigError::ValidationError(
            "search.debounce_ms must be greater than 0".to_string(),
        ));
    }

    if config.search.trending_limit == 0 {
        return Err(ConfigError::ValidationError(
            "search.trending_limit must be greater than 0".to_string(),
        ));
    }

    if config.search.report_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "search.report_buffer must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
