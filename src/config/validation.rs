//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{Result, RollcallError};

/// Shortest code length accepted; below this the code space per event gets crowded
pub const MIN_CODE_LENGTH: usize = 6;
/// Longest code length accepted; matches the `registration_code` column width
pub const MAX_CODE_LENGTH: usize = 16;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_logging_config(&settings.logging)?;
    validate_registration_config(&settings.registration)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(RollcallError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(RollcallError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(RollcallError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(RollcallError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(RollcallError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}

/// Validate registration engine configuration
pub fn validate_registration_config(config: &super::RegistrationConfig) -> Result<()> {
    if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&config.code_length) {
        return Err(RollcallError::Config(format!(
            "Code length must be between {} and {}, got {}",
            MIN_CODE_LENGTH, MAX_CODE_LENGTH, config.code_length
        )));
    }

    if config.max_code_attempts == 0 {
        return Err(RollcallError::Config(
            "At least one registration attempt must be allowed".to_string(),
        ));
    }

    Ok(())
}
