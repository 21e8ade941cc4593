//! Test helpers module
//!
//! Shared fixtures for the integration tests: generated people and events,
//! deterministic code sources, an in-memory test context and a PostgreSQL
//! test database.

#![allow(dead_code)]

pub mod database_helper;
pub mod test_context;
pub mod test_data;

pub use database_helper::*;
pub use test_context::*;
pub use test_data::*;
