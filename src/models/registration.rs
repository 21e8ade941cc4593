//! Registration model
//!
//! One document per (user, event) pair. Cancelling and re-registering toggle the
//! same row; the code is present only while the row is `REGISTERED`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{EventId, RegistrationCode, RegistrationId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Registered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "attendance_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Pending,
    Attended,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: RegistrationId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub status: RegistrationStatus,
    pub attendance_status: AttendanceStatus,
    pub registration_code: Option<RegistrationCode>,
    /// Start of the current registered spell; set on insert and on reactivation only
    pub registered_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    pub fn is_registered(&self) -> bool {
        self.status == RegistrationStatus::Registered
    }
}

/// Insert request for the first registration of a pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRegistration {
    pub event_id: EventId,
    pub user_id: UserId,
    pub code: RegistrationCode,
}

/// Identity returned by a successful check-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Attendee {
    pub registration_id: RegistrationId,
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
}

/// One line of an event's registration list
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RosterEntry {
    pub registration_id: RegistrationId,
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub attendance_status: AttendanceStatus,
    pub registered_at: DateTime<Utc>,
}

/// Head counts derived from registration rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub event_id: EventId,
    pub capacity: i32,
    pub registered: i64,
    pub attended: i64,
}

impl AttendanceSummary {
    /// Places still available for admission
    pub fn remaining(&self) -> i64 {
        (i64::from(self.capacity) - self.registered).max(0)
    }
}
