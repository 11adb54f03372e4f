use crate::application::config::models::Config;
use crate::common::error::{Result, ServerError};
use crate::common::logger;

/// Validate configuration for correctness and consistency
pub fn validate_config(config: &Config) -> Result<()> {
    if config.bind_address.trim().is_empty() {
        return Err(ServerError::Config("bind_address cannot be empty".to_string()));
    }

    validate_limits(config)?;
    validate_timeouts(config)?;

    if !logger::is_valid_level(&config.log_level) {
        return Err(ServerError::Config(format!(
            "log_level '{}' is not one of trace, debug, info, warn, error, off",
            config.log_level
        )));
    }

    Ok(())
}

fn validate_limits(config: &Config) -> Result<()> {
    if config.max_header_size == 0 {
        return Err(ServerError::Config(
            "max_header_size must be greater than 0".to_string(),
        ));
    }

    if config.max_body_size == 0 {
        return Err(ServerError::Config(
            "max_body_size must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_timeouts(config: &Config) -> Result<()> {
    let timeouts = [
        ("read_timeout_secs", config.read_timeout_secs),
        ("write_timeout_secs", config.write_timeout_secs),
    ];

    // Zero is refused by the socket layer; leave the key unset to disable
    for (name, value) in timeouts {
        if value == Some(0) {
            return Err(ServerError::Config(format!(
                "{} must be greater than 0 (omit it to disable)",
                name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_zero_limits() {
        let config = Config {
            max_body_size: 0,
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());

        let config = Config {
            max_header_size: 0,
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = Config {
            read_timeout_secs: Some(0),
            ..Config::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("read_timeout_secs"));
    }

    #[test]
    fn test_rejects_bad_fields() {
        let config = Config {
            bind_address: "  ".to_string(),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());

        let config = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
