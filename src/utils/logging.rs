//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for registration and attendance transitions.

use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::models::{EventId, RegistrationId, UserId};
use crate::utils::errors::{Result, RollcallError};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the rolling log file on drop and must be kept
/// alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| RollcallError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let (file_layer, guard) = match &config.file_path {
        Some(directory) => {
            std::fs::create_dir_all(directory)?;
            let file_appender = tracing_appender::rolling::daily(directory, "rollcall.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    let initialized = if config.json {
        registry.with(fmt::layer().json().with_writer(std::io::stdout)).try_init()
    } else {
        registry.with(fmt::layer().with_writer(std::io::stdout)).try_init()
    };
    initialized.map_err(|e| RollcallError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a registration lifecycle transition
pub fn log_registration_action(
    event_id: EventId,
    user_id: UserId,
    registration_id: RegistrationId,
    action: &str,
) {
    info!(
        event_id = %event_id,
        user_id = %user_id,
        registration_id = %registration_id,
        action = action,
        "Registration action performed"
    );
}

/// Log a registration request refused by a business rule
pub fn log_registration_rejected(event_id: EventId, user_id: UserId, reason: &str) {
    info!(
        event_id = %event_id,
        user_id = %user_id,
        reason = reason,
        "Registration request rejected"
    );
}

/// Log a successful check-in
pub fn log_check_in(event_id: EventId, registration_id: RegistrationId, user_id: UserId) {
    info!(
        event_id = %event_id,
        registration_id = %registration_id,
        user_id = %user_id,
        "Attendance recorded"
    );
}

/// Log a refused check-in. The presented code is never logged.
pub fn log_check_in_rejected(event_id: EventId, reason: &str) {
    warn!(event_id = %event_id, reason = reason, "Check-in rejected");
}

/// Log a conditional write that lost a race and will be retried
pub fn log_conflict_retry(attempt: u32, max_attempts: u32, conflict: &str) {
    debug!(
        attempt = attempt,
        max_attempts = max_attempts,
        conflict = conflict,
        "Conflicting write, retrying"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_unusable_log_directory_is_an_io_error() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let config = LoggingConfig {
            file_path: Some(blocker.path().join("logs").to_string_lossy().into_owned()),
            ..LoggingConfig::default()
        };

        let result = init_logging(&config);
        assert_matches!(result.err(), Some(RollcallError::Io(_)));
    }
}
