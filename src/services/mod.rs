//! Services module
//!
//! This module contains the registration and attendance business logic

pub mod admission;
pub mod attendance;
pub mod codes;
pub mod registration;
pub mod retry;

// Re-export commonly used services
pub use admission::{Admission, AdmissionController, AdmissionRequest};
pub use attendance::{AttendanceService, CheckInOutcome, CheckInRejection};
pub use codes::{generate_code, CodeSource, RandomCodes};
pub use registration::RegistrationService;
pub use retry::{retry_on_conflict, Attempt};

use chrono::{DateTime, Utc};

use crate::config::validation::validate_registration_config;
use crate::config::RegistrationConfig;
use crate::models::{AttendanceSummary, EventId, Registration, RegistrationStatus, RosterEntry, UserId};
use crate::store::RegistrationStore;
use crate::utils::errors::Result;

/// Registration and attendance engine: the complete programmatic surface.
///
/// Holds no in-process state across requests, so any number of engines may
/// share one store.
#[derive(Clone)]
pub struct RegistrationEngine<S, C = RandomCodes> {
    pub registrations: RegistrationService<S, C>,
    pub attendance: AttendanceService<S>,
}

impl<S> RegistrationEngine<S, RandomCodes>
where
    S: RegistrationStore + Clone,
{
    /// Create an engine issuing cryptographically random codes
    pub fn new(store: S, config: RegistrationConfig) -> Result<Self> {
        Self::with_code_source(store, RandomCodes, config)
    }
}

impl<S, C> RegistrationEngine<S, C>
where
    S: RegistrationStore + Clone,
    C: CodeSource,
{
    /// Create an engine drawing codes from `codes`.
    ///
    /// Fails with [`RollcallError::Config`](crate::RollcallError::Config) when the
    /// code length or attempt budget is out of range.
    pub fn with_code_source(store: S, codes: C, config: RegistrationConfig) -> Result<Self> {
        validate_registration_config(&config)?;

        Ok(Self {
            attendance: AttendanceService::new(store.clone(), config.code_length),
            registrations: RegistrationService::new(store, codes, config),
        })
    }

    pub async fn register(&self, event_id: EventId, user_id: UserId, now: DateTime<Utc>) -> Result<Registration> {
        self.registrations.register(event_id, user_id, now).await
    }

    pub async fn deregister(&self, event_id: EventId, user_id: UserId, now: DateTime<Utc>) -> Result<Registration> {
        self.registrations.deregister(event_id, user_id, now).await
    }

    pub async fn check_in(&self, event_id: EventId, presented_code: &str, now: DateTime<Utc>) -> Result<CheckInOutcome> {
        self.attendance.check_in(event_id, presented_code, now).await
    }

    pub async fn roster(&self, event_id: EventId) -> Result<Vec<RosterEntry>> {
        self.attendance.roster(event_id).await
    }

    pub async fn registrations_for_user(&self, user_id: UserId, status: RegistrationStatus) -> Result<Vec<Registration>> {
        self.registrations.registrations_for_user(user_id, status).await
    }

    pub async fn attendance_summary(&self, event_id: EventId) -> Result<AttendanceSummary> {
        self.attendance.attendance_summary(event_id).await
    }
}
