//! Test context for engine tests backed by the in-memory store

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use rollcall::config::RegistrationConfig;
use rollcall::models::{Event, User};
use rollcall::services::{CodeSource, RandomCodes};
use rollcall::{MemoryStore, RegistrationEngine};

use super::test_data::{create_test_event_request, create_test_student};

/// Engine, store and a fixed clock origin for one test
pub struct TestContext<C = RandomCodes> {
    pub store: MemoryStore,
    pub engine: Arc<RegistrationEngine<MemoryStore, C>>,
    pub origin: DateTime<Utc>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_codes(RandomCodes)
    }
}

impl<C: CodeSource> TestContext<C> {
    pub fn with_codes(codes: C) -> Self {
        Self::with_config(codes, RegistrationConfig::default())
    }

    pub fn with_config(codes: C, config: RegistrationConfig) -> Self {
        let store = MemoryStore::new();
        let engine = RegistrationEngine::with_code_source(store.clone(), codes, config)
            .expect("Failed to create test engine");

        Self {
            store,
            engine: Arc::new(engine),
            origin: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
        }
    }

    /// A moment while registration is still open
    pub fn before_deadline(&self) -> DateTime<Utc> {
        self.origin
    }

    /// The registration deadline itself
    pub fn at_deadline(&self) -> DateTime<Utc> {
        self.origin + Duration::hours(1)
    }

    /// A moment after the deadline but before the event starts
    pub fn after_deadline(&self) -> DateTime<Utc> {
        self.origin + Duration::minutes(90)
    }

    /// A moment inside the check-in window
    pub fn during_event(&self) -> DateTime<Utc> {
        self.origin + Duration::minutes(150)
    }

    pub fn after_event(&self) -> DateTime<Utc> {
        self.origin + Duration::hours(4)
    }

    /// Create an event on the context's schedule
    pub async fn event(&self, capacity: i32) -> Event {
        self.store
            .create_event(create_test_event_request(self.origin, capacity), self.origin)
            .await
            .expect("Failed to create test event")
    }

    /// Create a student known to the store
    pub async fn student(&self) -> User {
        let user = create_test_student();
        self.store.add_user(user.clone()).await;
        user
    }

    pub async fn students(&self, count: usize) -> Vec<User> {
        let mut users = Vec::with_capacity(count);
        for _ in 0..count {
            users.push(self.student().await);
        }
        users
    }
}
