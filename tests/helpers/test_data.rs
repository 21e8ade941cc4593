//! Test data helpers for creating people, events and codes

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;

use rollcall::models::{CreateEventRequest, RegistrationCode, User};
use rollcall::services::{CodeSource, RandomCodes};

/// Code length used by the default configuration
pub const CODE_LENGTH: usize = 9;

/// Build a student with a generated name and a unique address
pub fn create_test_student() -> User {
    let name: String = Name().fake();
    let email: String = SafeEmail().fake();
    let tag = Uuid::new_v4().simple().to_string();

    User::student(name, format!("{}.{}", &tag[..8], email))
}

/// Event with registration open until `origin + 1h` and running `origin + 2h ..= origin + 3h`
pub fn create_test_event_request(origin: DateTime<Utc>, capacity: i32) -> CreateEventRequest {
    CreateEventRequest {
        title: "Intro to Distributed Systems".to_string(),
        organiser: "Computing Society".to_string(),
        venue: "Lecture Hall B".to_string(),
        description: Some("Weekly seminar".to_string()),
        capacity,
        deadline: origin + Duration::hours(1),
        start_time: origin + Duration::hours(2),
        end_time: origin + Duration::hours(3),
    }
}

/// Parse a literal code the tests know to be well formed
pub fn code(symbols: &str) -> RegistrationCode {
    RegistrationCode::parse(symbols, CODE_LENGTH).expect("test code must be well formed")
}

/// Hands out queued codes first, then random ones
#[derive(Default)]
pub struct ScriptedCodes {
    queue: Mutex<VecDeque<RegistrationCode>>,
}

impl ScriptedCodes {
    pub fn new<'a>(codes: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            queue: Mutex::new(codes.into_iter().map(code).collect()),
        }
    }

    /// Queue the same code `times` times
    pub fn repeated(symbols: &str, times: usize) -> Self {
        Self::new(std::iter::repeat(symbols).take(times))
    }

    pub fn remaining(&self) -> usize {
        self.queue.lock().expect("queue lock poisoned").len()
    }
}

impl CodeSource for ScriptedCodes {
    fn next_code(&self, length: usize) -> RegistrationCode {
        let queued = self.queue.lock().expect("queue lock poisoned").pop_front();
        queued.unwrap_or_else(|| RandomCodes.next_code(length))
    }
}

/// Always hands out the same code
pub struct ConstantCodes(pub RegistrationCode);

impl CodeSource for ConstantCodes {
    fn next_code(&self, _length: usize) -> RegistrationCode {
        self.0.clone()
    }
}
