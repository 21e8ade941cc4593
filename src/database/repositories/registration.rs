//! Registration repository implementation
//!
//! Admissions run in a transaction that first locks the event row, then checks
//! the pair, the live registered count and finally writes. Uniqueness of the pair
//! and of the code per event is additionally enforced by the schema, and the
//! resulting violations are reported as conflicts rather than errors.

use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use super::event::EventRepository;
use crate::models::{
    AttendanceSummary, Attendee, EventId, NewRegistration, Registration, RegistrationCode,
    RegistrationId, RegistrationStatus, RosterEntry, UserId,
};
use crate::store::{ConflictKind, Transition};
use crate::utils::errors::RollcallError;

/// Unique constraint on (user_id, event_id)
pub const USER_EVENT_CONSTRAINT: &str = "registrations_user_event_key";
/// Partial unique index on (event_id, registration_code) for registered rows
pub const EVENT_CODE_CONSTRAINT: &str = "registrations_event_code_key";

const REGISTRATION_COLUMNS: &str =
    "id, event_id, user_id, status, attendance_status, registration_code, registered_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the pair's document in any state
    pub async fn find_by_pair(&self, event_id: EventId, user_id: UserId) -> Result<Option<Registration>, RollcallError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {} FROM registrations WHERE event_id = $1 AND user_id = $2",
            REGISTRATION_COLUMNS
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Create the pair's document as registered, within capacity
    pub async fn insert_registered(&self, request: NewRegistration) -> Result<Transition<Registration>, RollcallError> {
        let mut tx = self.pool.begin().await?;

        let Some(capacity) = EventRepository::lock_capacity(&mut *tx, request.event_id).await? else {
            return Err(RollcallError::EventNotFound {
                event_id: request.event_id,
            });
        };

        let existing: Option<(RegistrationId,)> =
            sqlx::query_as("SELECT id FROM registrations WHERE event_id = $1 AND user_id = $2")
                .bind(request.event_id)
                .bind(request.user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            return Ok(Transition::Conflict(ConflictKind::Pair));
        }

        if !has_room(&mut *tx, request.event_id, capacity).await? {
            return Ok(Transition::CapacityFull);
        }

        let now = Utc::now();
        let inserted = sqlx::query_as::<_, Registration>(&format!(
            r#"
            INSERT INTO registrations (id, event_id, user_id, status, attendance_status, registration_code, registered_at, created_at, updated_at)
            VALUES ($1, $2, $3, 'REGISTERED', 'PENDING', $4, $5, $5, $5)
            RETURNING {}
            "#,
            REGISTRATION_COLUMNS
        ))
        .bind(RegistrationId::generate())
        .bind(request.event_id)
        .bind(request.user_id)
        .bind(&request.code)
        .bind(now)
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(registration) => {
                tx.commit().await?;
                Ok(Transition::Applied(registration))
            }
            Err(err) => match classify_unique_violation(&err) {
                Some(conflict) => Ok(Transition::Conflict(conflict)),
                None => Err(err.into()),
            },
        }
    }

    /// Revive a cancelled document with a fresh code, within capacity
    pub async fn reactivate(
        &self,
        registration_id: RegistrationId,
        code: &RegistrationCode,
    ) -> Result<Transition<Registration>, RollcallError> {
        let event_id: Option<(EventId,)> = sqlx::query_as("SELECT event_id FROM registrations WHERE id = $1")
            .bind(registration_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some((event_id,)) = event_id else {
            return Ok(Transition::Conflict(ConflictKind::Stale));
        };

        let mut tx = self.pool.begin().await?;

        let Some(capacity) = EventRepository::lock_capacity(&mut *tx, event_id).await? else {
            return Err(RollcallError::EventNotFound { event_id });
        };

        if !has_room(&mut *tx, event_id, capacity).await? {
            return Ok(Transition::CapacityFull);
        }

        let updated = sqlx::query_as::<_, Registration>(&format!(
            r#"
            UPDATE registrations
            SET status = 'REGISTERED',
                attendance_status = 'PENDING',
                registration_code = $2,
                registered_at = $3,
                updated_at = $3
            WHERE id = $1 AND status = 'CANCELLED'
            RETURNING {}
            "#,
            REGISTRATION_COLUMNS
        ))
        .bind(registration_id)
        .bind(code)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await;

        match updated {
            Ok(Some(registration)) => {
                tx.commit().await?;
                Ok(Transition::Applied(registration))
            }
            Ok(None) => Ok(Transition::Conflict(ConflictKind::Stale)),
            Err(err) => match classify_unique_violation(&err) {
                Some(conflict) => Ok(Transition::Conflict(conflict)),
                None => Err(err.into()),
            },
        }
    }

    /// Cancel the pair's registered document, clearing its code
    pub async fn cancel(&self, event_id: EventId, user_id: UserId) -> Result<Option<Registration>, RollcallError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            r#"
            UPDATE registrations
            SET status = 'CANCELLED',
                registration_code = NULL,
                updated_at = $3
            WHERE event_id = $1 AND user_id = $2 AND status = 'REGISTERED'
            RETURNING {}
            "#,
            REGISTRATION_COLUMNS
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Flip a pending registered row holding `code` to attended
    pub async fn mark_attended(&self, event_id: EventId, code: &RegistrationCode) -> Result<Option<Attendee>, RollcallError> {
        let attendee = sqlx::query_as::<_, Attendee>(
            r#"
            UPDATE registrations r
            SET attendance_status = 'ATTENDED',
                updated_at = $3
            FROM users u
            WHERE r.event_id = $1
              AND r.registration_code = $2
              AND r.status = 'REGISTERED'
              AND r.attendance_status = 'PENDING'
              AND u.id = r.user_id
            RETURNING r.id AS registration_id, r.user_id, u.full_name, u.email
            "#,
        )
        .bind(event_id)
        .bind(code)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendee)
    }

    /// Registered attendees of an event
    pub async fn roster(&self, event_id: EventId) -> Result<Vec<RosterEntry>, RollcallError> {
        let entries = sqlx::query_as::<_, RosterEntry>(
            r#"
            SELECT r.id AS registration_id, r.user_id, u.full_name, u.email,
                   r.attendance_status, r.registered_at
            FROM registrations r
            INNER JOIN users u ON u.id = r.user_id
            WHERE r.event_id = $1 AND r.status = 'REGISTERED'
            ORDER BY r.registered_at ASC, r.id ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// A user's documents in the given state
    pub async fn find_by_user(&self, user_id: UserId, status: RegistrationStatus) -> Result<Vec<Registration>, RollcallError> {
        let registrations = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {} FROM registrations WHERE user_id = $1 AND status = $2 ORDER BY updated_at ASC",
            REGISTRATION_COLUMNS
        ))
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Capacity and head counts for an event
    pub async fn attendance_summary(&self, event_id: EventId) -> Result<Option<AttendanceSummary>, RollcallError> {
        let row: Option<(i32, i64, i64)> = sqlx::query_as(
            r#"
            SELECT e.capacity,
                   COUNT(r.id) FILTER (WHERE r.status = 'REGISTERED'),
                   COUNT(r.id) FILTER (WHERE r.status = 'REGISTERED' AND r.attendance_status = 'ATTENDED')
            FROM events e
            LEFT JOIN registrations r ON r.event_id = e.id
            WHERE e.id = $1
            GROUP BY e.id, e.capacity
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(capacity, registered, attended)| AttendanceSummary {
            event_id,
            capacity,
            registered,
            attended,
        }))
    }
}

async fn has_room(conn: &mut PgConnection, event_id: EventId, capacity: i32) -> Result<bool, RollcallError> {
    let (registered,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status = 'REGISTERED'")
            .bind(event_id)
            .fetch_one(conn)
            .await?;

    Ok(registered < i64::from(capacity))
}

/// Map a unique violation on one of the registration guards to its conflict kind
fn classify_unique_violation(err: &sqlx::Error) -> Option<ConflictKind> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if !db_err.is_unique_violation() {
        return None;
    }

    match db_err.constraint() {
        Some(EVENT_CODE_CONSTRAINT) => Some(ConflictKind::Code),
        Some(USER_EVENT_CONSTRAINT) => Some(ConflictKind::Pair),
        _ => None,
    }
}
