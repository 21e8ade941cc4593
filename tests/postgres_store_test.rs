//! Engine tests against PostgreSQL
//!
//! These need Docker (for a throwaway container) or `TEST_DATABASE_URL`:
//!
//! ```text
//! cargo test --test postgres_store_test -- --ignored
//! ```

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use serial_test::serial;

use helpers::*;
use rollcall::config::RegistrationConfig;
use rollcall::models::{AttendanceStatus, RegistrationStatus};
use rollcall::{CheckInOutcome, CheckInRejection, RegistrationEngine, RollcallError};

fn origin() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_single_seat_swap_then_check_in() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    let engine = RegistrationEngine::new(db.service(), RegistrationConfig::default()).unwrap();
    let event = db.insert_event(create_test_event_request(origin(), 1), origin()).await.unwrap();
    let users = db.insert_students(2).await.unwrap();
    let (alice, bob) = (&users[0], &users[1]);

    let first = engine.register(event.id, alice.id, origin()).await.unwrap();
    let c1 = first.registration_code.unwrap();

    let full = engine.register(event.id, bob.id, origin()).await;
    assert_matches!(full, Err(RollcallError::CapacityFull { capacity: 1, .. }));

    let cancelled = engine.deregister(event.id, alice.id, origin()).await.unwrap();
    assert_eq!(cancelled.status, RegistrationStatus::Cancelled);
    assert!(cancelled.registration_code.is_none());

    let second = engine.register(event.id, bob.id, origin()).await.unwrap();
    let c2 = second.registration_code.unwrap();
    assert_ne!(c1, c2);

    let now = origin() + Duration::minutes(150);
    let outcome = engine.check_in(event.id, &c2.display(), now).await.unwrap();
    assert_matches!(outcome, CheckInOutcome::Attended(a) if a.user_id == bob.id && a.full_name == bob.full_name);

    let repeat = engine.check_in(event.id, c2.as_str(), now).await.unwrap();
    assert_eq!(repeat, CheckInOutcome::Rejected(CheckInRejection::InvalidOrAlreadyAttended));
    let stale = engine.check_in(event.id, c1.as_str(), now).await.unwrap();
    assert_eq!(stale, CheckInOutcome::Rejected(CheckInRejection::InvalidOrAlreadyAttended));

    let summary = engine.attendance_summary(event.id).await.unwrap();
    assert_eq!((summary.registered, summary.attended), (1, 1));
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_reregistration_reuses_the_row() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    let codes = ScriptedCodes::new(["AAAAAAAAA", "BBBBBBBBB"]);
    let engine = RegistrationEngine::with_code_source(db.service(), codes, RegistrationConfig::default()).unwrap();
    let event = db.insert_event(create_test_event_request(origin(), 5), origin()).await.unwrap();
    let user = db.insert_student().await.unwrap();

    let first = engine.register(event.id, user.id, origin()).await.unwrap();
    engine.deregister(event.id, user.id, origin()).await.unwrap();
    let second = engine.register(event.id, user.id, origin()).await.unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.registration_code, Some(code("BBBBBBBBB")));
    assert_eq!(second.attendance_status, AttendanceStatus::Pending);
    assert_eq!(db.count_registrations(event.id).await.unwrap(), 1);

    let err = engine.register(event.id, user.id, origin()).await.unwrap_err();
    assert_matches!(err, RollcallError::AlreadyRegistered { .. });
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_code_index_conflict_is_retried() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    let codes = ScriptedCodes::new(["AAAAAAAAA", "AAAAAAAAA", "DDDDDDDDD"]);
    let engine = RegistrationEngine::with_code_source(db.service(), codes, RegistrationConfig::default()).unwrap();
    let event = db.insert_event(create_test_event_request(origin(), 5), origin()).await.unwrap();
    let users = db.insert_students(2).await.unwrap();

    let first = engine.register(event.id, users[0].id, origin()).await.unwrap();
    let second = engine.register(event.id, users[1].id, origin()).await.unwrap();

    assert_eq!(first.registration_code, Some(code("AAAAAAAAA")));
    assert_eq!(second.registration_code, Some(code("DDDDDDDDD")));
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_exhausted_attempts_leave_no_row() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    let config = RegistrationConfig {
        max_code_attempts: 4,
        ..RegistrationConfig::default()
    };
    let engine = RegistrationEngine::with_code_source(db.service(), ConstantCodes(code("AAAAAAAAA")), config).unwrap();
    let event = db.insert_event(create_test_event_request(origin(), 5), origin()).await.unwrap();
    let users = db.insert_students(2).await.unwrap();

    engine.register(event.id, users[0].id, origin()).await.unwrap();
    let err = engine.register(event.id, users[1].id, origin()).await.unwrap_err();

    assert_matches!(err, RollcallError::RegistrationFailed { attempts: 4 });
    assert_eq!(db.count_registrations(event.id).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_concurrent_registrations_never_exceed_capacity() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    let engine = Arc::new(RegistrationEngine::new(db.service(), RegistrationConfig::default()).unwrap());
    let event = db.insert_event(create_test_event_request(origin(), 5), origin()).await.unwrap();
    let users = db.insert_students(30).await.unwrap();

    let handles: Vec<_> = users
        .iter()
        .map(|user| {
            let engine = Arc::clone(&engine);
            let (event_id, user_id) = (event.id, user.id);
            tokio::spawn(async move { engine.register(event_id, user_id, origin()).await })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => admitted += 1,
            Err(err) => assert_matches!(err, RollcallError::CapacityFull { .. }),
        }
    }

    assert_eq!(admitted, 5);
    let summary = engine.attendance_summary(event.id).await.unwrap();
    assert_eq!(summary.registered, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_concurrent_registrations_for_one_pair() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    let engine = Arc::new(RegistrationEngine::new(db.service(), RegistrationConfig::default()).unwrap());
    let event = db.insert_event(create_test_event_request(origin(), 5), origin()).await.unwrap();
    let user = db.insert_student().await.unwrap();

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let (event_id, user_id) = (event.id, user.id);
            tokio::spawn(async move { engine.register(event_id, user_id, origin()).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => winners += 1,
            Err(err) => assert_matches!(err, RollcallError::AlreadyRegistered { .. }),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(db.count_registrations(event.id).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_concurrent_check_ins_record_attendance_once() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    let engine = Arc::new(RegistrationEngine::new(db.service(), RegistrationConfig::default()).unwrap());
    let event = db.insert_event(create_test_event_request(origin(), 5), origin()).await.unwrap();
    let user = db.insert_student().await.unwrap();
    let registration = engine.register(event.id, user.id, origin()).await.unwrap();
    let presented = registration.registration_code.unwrap().display();
    let now = origin() + Duration::minutes(150);

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let presented = presented.clone();
            let event_id = event.id;
            tokio::spawn(async move { engine.check_in(event_id, &presented, now).await })
        })
        .collect();

    let mut attended = 0;
    for handle in handles {
        if handle.await.expect("task panicked").unwrap().is_attended() {
            attended += 1;
        }
    }

    assert_eq!(attended, 1);
    let roster = engine.roster(event.id).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].attendance_status, AttendanceStatus::Attended);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_registrations_for_user_and_event_removal() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    let engine = RegistrationEngine::new(db.service(), RegistrationConfig::default()).unwrap();
    let first = db.insert_event(create_test_event_request(origin(), 5), origin()).await.unwrap();
    let second = db.insert_event(create_test_event_request(origin(), 5), origin()).await.unwrap();
    let user = db.insert_student().await.unwrap();

    engine.register(first.id, user.id, origin()).await.unwrap();
    engine.register(second.id, user.id, origin()).await.unwrap();

    let active = engine
        .registrations_for_user(user.id, RegistrationStatus::Registered)
        .await
        .unwrap();
    let events: HashSet<_> = active.iter().map(|r| r.event_id).collect();
    assert_eq!(events, HashSet::from([first.id, second.id]));

    db.delete_event(first.id).await.unwrap();
    let remaining = engine
        .registrations_for_user(user.id, RegistrationStatus::Registered)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].event_id, second.id);

    let err = engine.attendance_summary(first.id).await.unwrap_err();
    assert_matches!(err, RollcallError::EventNotFound { .. });
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_check_in_does_not_reorder_roster() {
    let db = TestDatabase::new().await.expect("Failed to create test database");
    let engine = RegistrationEngine::new(db.service(), RegistrationConfig::default()).unwrap();
    let event = db.insert_event(create_test_event_request(origin(), 5), origin()).await.unwrap();
    let users = db.insert_students(2).await.unwrap();

    let early = engine.register(event.id, users[0].id, origin()).await.unwrap();
    engine.register(event.id, users[1].id, origin()).await.unwrap();

    let code = early.registration_code.unwrap();
    let now = origin() + Duration::minutes(150);
    assert!(engine.check_in(event.id, code.as_str(), now).await.unwrap().is_attended());

    let roster = engine.roster(event.id).await.unwrap();
    assert_eq!(roster[0].user_id, users[0].id);
    assert_eq!(roster[0].registered_at, early.registered_at);
    assert_eq!(roster[0].attendance_status, AttendanceStatus::Attended);
    assert_eq!(roster[1].user_id, users[1].id);
}
