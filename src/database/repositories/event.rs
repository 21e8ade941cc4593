//! Event repository implementation
//!
//! Events are read-only here; they are written by the event-management service.

use sqlx::{PgConnection, PgPool};

use crate::models::{Event, EventId};
use crate::utils::errors::RollcallError;

const EVENT_COLUMNS: &str =
    "id, title, organiser, venue, description, capacity, deadline, start_time, end_time, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, RollcallError> {
        let event = sqlx::query_as::<_, Event>(&format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Lock the event row for the rest of the transaction and return its capacity.
    ///
    /// Every admission to the same event takes this lock first, so the registered
    /// count read afterwards cannot change until the transaction ends.
    pub async fn lock_capacity(conn: &mut PgConnection, id: EventId) -> Result<Option<i32>, RollcallError> {
        let capacity: Option<(i32,)> = sqlx::query_as("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(capacity.map(|(capacity,)| capacity))
    }
}
