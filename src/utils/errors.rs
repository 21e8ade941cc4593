//! Error handling for Rollcall
//!
//! This module defines the main error type used throughout the engine. Domain
//! rejections (deadline, capacity, duplicate registration) are ordinary variants
//! so callers can render a corrective message; storage faults wrap the driver error.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{EventId, UserId};

/// Main error type for Rollcall
#[derive(Error, Debug)]
pub enum RollcallError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: EventId },

    #[error("No active registration for user {user_id} on event {event_id}")]
    RegistrationNotFound { event_id: EventId, user_id: UserId },

    #[error("Registration for event {event_id} closed at {deadline}")]
    DeadlinePassed {
        event_id: EventId,
        deadline: DateTime<Utc>,
    },

    #[error("User {user_id} is already registered for event {event_id}")]
    AlreadyRegistered { event_id: EventId, user_id: UserId },

    #[error("Event {event_id} is full ({capacity} places)")]
    CapacityFull { event_id: EventId, capacity: i32 },

    #[error("Registration failed after {attempts} attempts, please try again")]
    RegistrationFailed { attempts: u32 },
}

/// Result type alias for Rollcall operations
pub type Result<T> = std::result::Result<T, RollcallError>;

impl RollcallError {
    /// Check if the caller may retry the same request unchanged
    pub fn is_recoverable(&self) -> bool {
        match self {
            RollcallError::RegistrationFailed { .. } => true,
            RollcallError::Database(err) => matches!(
                err,
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed
            ),
            RollcallError::Io(_) => false,
            RollcallError::Migration(_) => false,
            RollcallError::Config(_) => false,
            RollcallError::Settings(_) => false,
            RollcallError::InvalidInput(_) => false,
            RollcallError::EventNotFound { .. } => false,
            RollcallError::RegistrationNotFound { .. } => false,
            RollcallError::DeadlinePassed { .. } => false,
            RollcallError::AlreadyRegistered { .. } => false,
            RollcallError::CapacityFull { .. } => false,
        }
    }

    /// Whether this is an expected business outcome rather than an infrastructure fault
    pub fn is_domain_rejection(&self) -> bool {
        matches!(
            self,
            RollcallError::EventNotFound { .. }
                | RollcallError::RegistrationNotFound { .. }
                | RollcallError::DeadlinePassed { .. }
                | RollcallError::AlreadyRegistered { .. }
                | RollcallError::CapacityFull { .. }
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RollcallError::Database(_) => ErrorSeverity::Critical,
            RollcallError::Migration(_) => ErrorSeverity::Critical,
            RollcallError::Config(_) => ErrorSeverity::Critical,
            RollcallError::Settings(_) => ErrorSeverity::Critical,
            RollcallError::RegistrationFailed { .. } => ErrorSeverity::Warning,
            RollcallError::InvalidInput(_) => ErrorSeverity::Info,
            err if err.is_domain_rejection() => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
