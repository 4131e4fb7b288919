use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Required sections exist (enforced by serde)
/// - Search concurrency cap is not 0
/// - Trip length is not 0
/// - Origin code is not blank
/// - Endpoints are set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let tracker = &config.tracker;

    if tracker.max_concurrent_searches == 0 {
        return Err(ConfigError::ValidationError(
            "tracker.max_concurrent_searches cannot be 0".to_string(),
        ));
    }

    if tracker.trip_length_days == 0 {
        return Err(ConfigError::ValidationError(
            "tracker.trip_length_days cannot be 0".to_string(),
        ));
    }

    if tracker.origin.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "tracker.origin cannot be empty".to_string(),
        ));
    }

    let endpoints = [
        ("directory.prices_endpoint", &config.directory.prices_endpoint),
        ("directory.users_endpoint", &config.directory.users_endpoint),
        ("search.token_endpoint", &config.search.token_endpoint),
        ("search.city_endpoint", &config.search.city_endpoint),
        ("search.flight_endpoint", &config.search.flight_endpoint),
    ];
    for (name, value) in endpoints {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}
