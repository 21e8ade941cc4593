//! Attendance verification service
//!
//! Check-in is a single conditional transition keyed by event, code, status and
//! attendance status. The registration row is the only record of attendance.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{AttendanceSummary, Attendee, EventId, RegistrationCode, RosterEntry};
use crate::store::RegistrationStore;
use crate::utils::errors::{Result, RollcallError};
use crate::utils::logging::{log_check_in, log_check_in_rejected};

/// Why a check-in was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckInRejection {
    #[error("event not found")]
    EventNotFound,

    #[error("event is not currently running")]
    EventNotLive,

    #[error("code is not in the expected format")]
    MalformedCode,

    /// Wrong, cancelled and already-used codes are deliberately indistinguishable
    #[error("code is invalid or has already been used")]
    InvalidOrAlreadyAttended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CheckInOutcome {
    Attended(Attendee),
    Rejected(CheckInRejection),
}

impl CheckInOutcome {
    pub fn is_attended(&self) -> bool {
        matches!(self, CheckInOutcome::Attended(_))
    }
}

#[derive(Clone)]
pub struct AttendanceService<S> {
    store: S,
    code_length: usize,
}

impl<S: RegistrationStore> AttendanceService<S> {
    pub fn new(store: S, code_length: usize) -> Self {
        Self { store, code_length }
    }

    /// Verify a presented code and mark its registration attended, at most once
    pub async fn check_in(&self, event_id: EventId, presented_code: &str, now: DateTime<Utc>) -> Result<CheckInOutcome> {
        let outcome = self.verify(event_id, presented_code, now).await?;

        match &outcome {
            CheckInOutcome::Attended(attendee) => {
                log_check_in(event_id, attendee.registration_id, attendee.user_id);
            }
            CheckInOutcome::Rejected(reason) => {
                log_check_in_rejected(event_id, &reason.to_string());
            }
        }

        Ok(outcome)
    }

    async fn verify(&self, event_id: EventId, presented_code: &str, now: DateTime<Utc>) -> Result<CheckInOutcome> {
        let Some(event) = self.store.find_event(event_id).await? else {
            return Ok(CheckInOutcome::Rejected(CheckInRejection::EventNotFound));
        };

        if !event.is_live(now) {
            return Ok(CheckInOutcome::Rejected(CheckInRejection::EventNotLive));
        }

        let code = match RegistrationCode::parse(presented_code, self.code_length) {
            Ok(code) => code,
            Err(err) => {
                debug!(event_id = %event_id, error = %err, "Presented code is malformed");
                return Ok(CheckInOutcome::Rejected(CheckInRejection::MalformedCode));
            }
        };

        Ok(match self.store.mark_attended(event_id, code).await? {
            Some(attendee) => CheckInOutcome::Attended(attendee),
            None => CheckInOutcome::Rejected(CheckInRejection::InvalidOrAlreadyAttended),
        })
    }

    /// Registered attendees of an event with their attendance state
    pub async fn roster(&self, event_id: EventId) -> Result<Vec<RosterEntry>> {
        self.require_event(event_id).await?;
        self.store.roster(event_id).await
    }

    /// Capacity, registered and attended counts for an event
    pub async fn attendance_summary(&self, event_id: EventId) -> Result<AttendanceSummary> {
        self.store
            .attendance_summary(event_id)
            .await?
            .ok_or(RollcallError::EventNotFound { event_id })
    }

    async fn require_event(&self, event_id: EventId) -> Result<()> {
        match self.store.find_event(event_id).await? {
            Some(_) => Ok(()),
            None => Err(RollcallError::EventNotFound { event_id }),
        }
    }
}
