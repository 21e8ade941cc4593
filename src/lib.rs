//! Rollcall registration engine
//!
//! Admits registrations for capacity-limited events under concurrent requests,
//! issues one-time check-in codes and records attendance exactly once. All
//! coordination happens in the store's conditional writes, so any number of
//! engine instances may serve the same database.

pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{Result, RollcallError};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::{CheckInOutcome, CheckInRejection, RegistrationEngine};
pub use store::{MemoryStore, RegistrationStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
