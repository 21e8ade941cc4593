//! Data models module
//!
//! This module contains all data structures used throughout the engine

pub mod code;
pub mod event;
pub mod ids;
pub mod registration;
pub mod user;

// Re-export commonly used models
pub use code::{CodeFormatError, RegistrationCode, CODE_ALPHABET};
pub use event::{CreateEventRequest, Event};
pub use ids::{EventId, RegistrationId, UserId};
pub use registration::{
    AttendanceStatus, AttendanceSummary, Attendee, NewRegistration, Registration,
    RegistrationStatus, RosterEntry,
};
pub use user::{User, UserRole};
