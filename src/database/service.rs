//! Database service layer
//!
//! This module provides the PostgreSQL-backed [`RegistrationStore`].

use crate::database::{DatabasePool, EventRepository, RegistrationRepository};
use crate::models::{
    AttendanceSummary, Attendee, Event, EventId, NewRegistration, Registration, RegistrationCode,
    RegistrationId, RegistrationStatus, RosterEntry, UserId,
};
use crate::store::{RegistrationStore, Transition};
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub events: EventRepository,
    pub registrations: RegistrationRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool),
        }
    }
}

impl RegistrationStore for DatabaseService {
    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>> {
        self.events.find_by_id(event_id).await
    }

    async fn find_registration(&self, event_id: EventId, user_id: UserId) -> Result<Option<Registration>> {
        self.registrations.find_by_pair(event_id, user_id).await
    }

    async fn insert_registered(&self, registration: NewRegistration) -> Result<Transition<Registration>> {
        self.registrations.insert_registered(registration).await
    }

    async fn reactivate(
        &self,
        registration_id: RegistrationId,
        code: RegistrationCode,
    ) -> Result<Transition<Registration>> {
        self.registrations.reactivate(registration_id, &code).await
    }

    async fn cancel(&self, event_id: EventId, user_id: UserId) -> Result<Option<Registration>> {
        self.registrations.cancel(event_id, user_id).await
    }

    async fn mark_attended(&self, event_id: EventId, code: RegistrationCode) -> Result<Option<Attendee>> {
        self.registrations.mark_attended(event_id, &code).await
    }

    async fn roster(&self, event_id: EventId) -> Result<Vec<RosterEntry>> {
        self.registrations.roster(event_id).await
    }

    async fn registrations_for_user(
        &self,
        user_id: UserId,
        status: RegistrationStatus,
    ) -> Result<Vec<Registration>> {
        self.registrations.find_by_user(user_id, status).await
    }

    async fn attendance_summary(&self, event_id: EventId) -> Result<Option<AttendanceSummary>> {
        self.registrations.attendance_summary(event_id).await
    }
}
