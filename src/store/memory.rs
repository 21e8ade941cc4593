//! In-process registration store.
//!
//! Every conditional write runs under a single async mutex, which gives the same
//! all-or-nothing guarantees the PostgreSQL store gets from its transactions.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{ConflictKind, RegistrationStore, Transition};
use crate::models::{
    AttendanceStatus, AttendanceSummary, Attendee, CreateEventRequest, Event, EventId,
    NewRegistration, Registration, RegistrationCode, RegistrationId, RegistrationStatus,
    RosterEntry, User, UserId,
};
use crate::utils::errors::{Result, RollcallError};

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    events: HashMap<EventId, Event>,
    registrations: HashMap<RegistrationId, Registration>,
}

impl MemoryState {
    fn pair(&self, event_id: EventId, user_id: UserId) -> Option<&Registration> {
        self.registrations
            .values()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
    }

    fn registered_count(&self, event_id: EventId) -> i64 {
        self.registrations
            .values()
            .filter(|r| r.event_id == event_id && r.is_registered())
            .count() as i64
    }

    fn code_in_use(&self, event_id: EventId, code: &RegistrationCode) -> bool {
        self.registrations.values().any(|r| {
            r.event_id == event_id && r.is_registered() && r.registration_code.as_ref() == Some(code)
        })
    }

    fn has_room(&self, event: &Event) -> bool {
        self.registered_count(event.id) < i64::from(event.capacity)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a user known to the store
    pub async fn add_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }

    /// Add an event after checking its schedule
    pub async fn insert_event(&self, event: Event) -> Result<()> {
        event.validate_schedule()?;
        self.state.lock().await.events.insert(event.id, event);
        Ok(())
    }

    /// Create an event from a request, the way the event collaborator would
    pub async fn create_event(&self, request: CreateEventRequest, now: DateTime<Utc>) -> Result<Event> {
        let event = request.into_event(now)?;
        self.insert_event(event.clone()).await?;
        Ok(event)
    }

    /// Delete an event together with its registrations
    pub async fn remove_event(&self, event_id: EventId) -> bool {
        let mut state = self.state.lock().await;
        state.registrations.retain(|_, r| r.event_id != event_id);
        state.events.remove(&event_id).is_some()
    }

    /// Snapshot of every registration of an event, in any state
    pub async fn registrations_for_event(&self, event_id: EventId) -> Vec<Registration> {
        self.state
            .lock()
            .await
            .registrations
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect()
    }
}

impl RegistrationStore for MemoryStore {
    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>> {
        Ok(self.state.lock().await.events.get(&event_id).cloned())
    }

    async fn find_registration(&self, event_id: EventId, user_id: UserId) -> Result<Option<Registration>> {
        Ok(self.state.lock().await.pair(event_id, user_id).cloned())
    }

    async fn insert_registered(&self, registration: NewRegistration) -> Result<Transition<Registration>> {
        let mut state = self.state.lock().await;

        let event = state
            .events
            .get(&registration.event_id)
            .cloned()
            .ok_or(RollcallError::EventNotFound {
                event_id: registration.event_id,
            })?;
        if !state.users.contains_key(&registration.user_id) {
            return Err(RollcallError::InvalidInput(format!(
                "Unknown user {}",
                registration.user_id
            )));
        }

        if state.pair(registration.event_id, registration.user_id).is_some() {
            return Ok(Transition::Conflict(ConflictKind::Pair));
        }
        if !state.has_room(&event) {
            return Ok(Transition::CapacityFull);
        }
        if state.code_in_use(registration.event_id, &registration.code) {
            return Ok(Transition::Conflict(ConflictKind::Code));
        }

        let now = Utc::now();
        let created = Registration {
            id: RegistrationId::generate(),
            event_id: registration.event_id,
            user_id: registration.user_id,
            status: RegistrationStatus::Registered,
            attendance_status: AttendanceStatus::Pending,
            registration_code: Some(registration.code),
            registered_at: now,
            created_at: now,
            updated_at: now,
        };
        state.registrations.insert(created.id, created.clone());

        Ok(Transition::Applied(created))
    }

    async fn reactivate(
        &self,
        registration_id: RegistrationId,
        code: RegistrationCode,
    ) -> Result<Transition<Registration>> {
        let mut state = self.state.lock().await;

        let Some(current) = state.registrations.get(&registration_id) else {
            return Ok(Transition::Conflict(ConflictKind::Stale));
        };
        if current.status != RegistrationStatus::Cancelled {
            return Ok(Transition::Conflict(ConflictKind::Stale));
        }
        let event_id = current.event_id;

        let event = state
            .events
            .get(&event_id)
            .cloned()
            .ok_or(RollcallError::EventNotFound { event_id })?;
        if !state.has_room(&event) {
            return Ok(Transition::CapacityFull);
        }
        if state.code_in_use(event_id, &code) {
            return Ok(Transition::Conflict(ConflictKind::Code));
        }

        let Some(row) = state.registrations.get_mut(&registration_id) else {
            return Ok(Transition::Conflict(ConflictKind::Stale));
        };
        row.status = RegistrationStatus::Registered;
        row.attendance_status = AttendanceStatus::Pending;
        row.registration_code = Some(code);
        row.registered_at = Utc::now();
        row.updated_at = row.registered_at;

        Ok(Transition::Applied(row.clone()))
    }

    async fn cancel(&self, event_id: EventId, user_id: UserId) -> Result<Option<Registration>> {
        let mut state = self.state.lock().await;

        let row = state
            .registrations
            .values_mut()
            .find(|r| r.event_id == event_id && r.user_id == user_id && r.is_registered());

        Ok(row.map(|row| {
            row.status = RegistrationStatus::Cancelled;
            row.registration_code = None;
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    async fn mark_attended(&self, event_id: EventId, code: RegistrationCode) -> Result<Option<Attendee>> {
        let mut state = self.state.lock().await;
        let MemoryState {
            users,
            registrations,
            ..
        } = &mut *state;

        let row = registrations.values_mut().find(|r| {
            r.event_id == event_id
                && r.is_registered()
                && r.attendance_status == AttendanceStatus::Pending
                && r.registration_code.as_ref() == Some(&code)
        });
        let Some(row) = row else {
            return Ok(None);
        };
        let Some(user) = users.get(&row.user_id) else {
            return Err(RollcallError::InvalidInput(format!(
                "Unknown user {} on registration {}",
                row.user_id, row.id
            )));
        };

        row.attendance_status = AttendanceStatus::Attended;
        row.updated_at = Utc::now();

        Ok(Some(Attendee {
            registration_id: row.id,
            user_id: row.user_id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
        }))
    }

    async fn roster(&self, event_id: EventId) -> Result<Vec<RosterEntry>> {
        let state = self.state.lock().await;

        let mut entries: Vec<RosterEntry> = state
            .registrations
            .values()
            .filter(|r| r.event_id == event_id && r.is_registered())
            .filter_map(|r| {
                state.users.get(&r.user_id).map(|user| RosterEntry {
                    registration_id: r.id,
                    user_id: r.user_id,
                    full_name: user.full_name.clone(),
                    email: user.email.clone(),
                    attendance_status: r.attendance_status,
                    registered_at: r.registered_at,
                })
            })
            .collect();
        entries.sort_by_key(|e| (e.registered_at, e.registration_id));

        Ok(entries)
    }

    async fn registrations_for_user(
        &self,
        user_id: UserId,
        status: RegistrationStatus,
    ) -> Result<Vec<Registration>> {
        let state = self.state.lock().await;

        let mut rows: Vec<Registration> = state
            .registrations
            .values()
            .filter(|r| r.user_id == user_id && r.status == status)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.updated_at);

        Ok(rows)
    }

    async fn attendance_summary(&self, event_id: EventId) -> Result<Option<AttendanceSummary>> {
        let state = self.state.lock().await;

        Ok(state.events.get(&event_id).map(|event| {
            let attended = state
                .registrations
                .values()
                .filter(|r| {
                    r.event_id == event_id
                        && r.is_registered()
                        && r.attendance_status == AttendanceStatus::Attended
                })
                .count() as i64;

            AttendanceSummary {
                event_id,
                capacity: event.capacity,
                registered: state.registered_count(event_id),
                attended,
            }
        }))
    }
}
