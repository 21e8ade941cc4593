//! Persistent store seam
//!
//! The engine holds no locks of its own. Every state change goes through one of
//! the conditional writes below, and the store is the only place where capacity,
//! pair uniqueness and code uniqueness are enforced.
//!
//! # Implementations
//!
//! **Production**: [`crate::database::DatabaseService`] over PostgreSQL
//! **Testing / single node**: [`MemoryStore`]

pub mod memory;

use std::fmt;
use std::future::Future;

use crate::models::{
    AttendanceSummary, Attendee, Event, EventId, NewRegistration, Registration, RegistrationCode,
    RegistrationId, RegistrationStatus, RosterEntry, UserId,
};
use crate::utils::errors::Result;

pub use memory::MemoryStore;

/// Which guard made a conditional write lose its race
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The code is already held by a registered row of the same event
    Code,
    /// A document for the (user, event) pair appeared concurrently
    Pair,
    /// The row no longer matches the state the caller observed
    Stale,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::Code => write!(f, "code"),
            ConflictKind::Pair => write!(f, "pair"),
            ConflictKind::Stale => write!(f, "stale"),
        }
    }
}

/// Result of a capacity-guarded transition into `REGISTERED`
#[derive(Debug, Clone)]
pub enum Transition<T> {
    Applied(T),
    CapacityFull,
    Conflict(ConflictKind),
}

/// Storage operations the engine depends on.
///
/// All writes are atomic with respect to concurrent callers, including callers in
/// other processes sharing the same database.
pub trait RegistrationStore: Send + Sync {
    /// Look up an event
    fn find_event(&self, event_id: EventId) -> impl Future<Output = Result<Option<Event>>> + Send;

    /// Look up the single document of a (user, event) pair, in any state
    fn find_registration(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Registration>>> + Send;

    /// Create the pair's document as `REGISTERED`/`PENDING`.
    ///
    /// Guards, checked atomically in this order: no document for the pair, fewer
    /// registered rows than capacity, code unused among the event's registered rows.
    fn insert_registered(
        &self,
        registration: NewRegistration,
    ) -> impl Future<Output = Result<Transition<Registration>>> + Send;

    /// Move a `CANCELLED` document back to `REGISTERED` with a fresh code and
    /// `PENDING` attendance, under the same capacity and code guards.
    fn reactivate(
        &self,
        registration_id: RegistrationId,
        code: RegistrationCode,
    ) -> impl Future<Output = Result<Transition<Registration>>> + Send;

    /// `REGISTERED` → `CANCELLED`, clearing the code. `None` when no registered
    /// document exists for the pair.
    fn cancel(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Registration>>> + Send;

    /// `PENDING` → `ATTENDED` for the registered row holding `code`. `None` when
    /// no pending registered row holds it. Leaves `registered_at` untouched.
    fn mark_attended(
        &self,
        event_id: EventId,
        code: RegistrationCode,
    ) -> impl Future<Output = Result<Option<Attendee>>> + Send;

    /// Registered attendees of an event, oldest registration first
    fn roster(&self, event_id: EventId) -> impl Future<Output = Result<Vec<RosterEntry>>> + Send;

    /// A user's documents in the given state
    fn registrations_for_user(
        &self,
        user_id: UserId,
        status: RegistrationStatus,
    ) -> impl Future<Output = Result<Vec<Registration>>> + Send;

    /// Counts derived from the registration rows; `None` for an unknown event
    fn attendance_summary(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Option<AttendanceSummary>>> + Send;
}
