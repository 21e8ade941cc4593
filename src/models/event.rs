//! Event model
//!
//! Events are owned by the event-management collaborator; the engine only reads
//! capacity, deadline and the check-in window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::EventId;
use crate::utils::errors::{Result, RollcallError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub organiser: String,
    pub venue: String,
    pub description: Option<String>,
    pub capacity: i32,
    /// Last instant at which registration and cancellation are accepted
    pub deadline: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub organiser: String,
    pub venue: String,
    pub description: Option<String>,
    pub capacity: i32,
    pub deadline: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Event {
    /// Registration and cancellation stay open up to and including the deadline
    pub fn registration_open(&self, now: DateTime<Utc>) -> bool {
        now <= self.deadline
    }

    /// Check-in window, inclusive at both ends
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now <= self.end_time
    }

    /// Scheduling rules the event collaborator enforces on create/edit
    pub fn validate_schedule(&self) -> Result<()> {
        validate_schedule(self.capacity, self.deadline, self.start_time, self.end_time)
    }
}

impl CreateEventRequest {
    /// Materialise the request into an event with a fresh identity
    pub fn into_event(self, now: DateTime<Utc>) -> Result<Event> {
        validate_schedule(self.capacity, self.deadline, self.start_time, self.end_time)?;

        Ok(Event {
            id: EventId::generate(),
            title: self.title,
            organiser: self.organiser,
            venue: self.venue,
            description: self.description,
            capacity: self.capacity,
            deadline: self.deadline,
            start_time: self.start_time,
            end_time: self.end_time,
            created_at: now,
            updated_at: now,
        })
    }
}

fn validate_schedule(
    capacity: i32,
    deadline: DateTime<Utc>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<()> {
    if capacity <= 0 {
        return Err(RollcallError::InvalidInput(format!(
            "Capacity must be positive, got {}",
            capacity
        )));
    }

    if start_time >= end_time {
        return Err(RollcallError::InvalidInput(
            "Start time must be before end time".to_string(),
        ));
    }

    if deadline > start_time {
        return Err(RollcallError::InvalidInput(
            "Deadline must not be after start time".to_string(),
        ));
    }

    Ok(())
}
