//! Optimistic transition loop.
//!
//! An operation derives its input from current state, attempts one conditional
//! write and reports whether it lost a race. Lost races are re-derived and retried
//! up to a fixed budget; any error ends the loop immediately.
//!
//! # Example
//!
//! ```rust
//! use rollcall::services::retry::{retry_on_conflict, Attempt};
//! use rollcall::store::ConflictKind;
//!
//! # async fn example() -> rollcall::Result<()> {
//! let value = retry_on_conflict(10, |attempt| async move {
//!     if attempt < 3 {
//!         Ok(Attempt::Retry(ConflictKind::Code))
//!     } else {
//!         Ok(Attempt::Done(attempt))
//!     }
//! })
//! .await?;
//! assert_eq!(value, 3);
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use tracing::warn;

use crate::store::ConflictKind;
use crate::utils::errors::{Result, RollcallError};
use crate::utils::logging::log_conflict_retry;

/// Outcome of one optimistic attempt
#[derive(Debug, Clone)]
pub enum Attempt<T> {
    Done(T),
    Retry(ConflictKind),
}

/// Run `op` with attempt numbers `1..=max_attempts` until it completes.
///
/// Exhausting the budget yields [`RollcallError::RegistrationFailed`].
pub async fn retry_on_conflict<T, F, Fut>(max_attempts: u32, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Attempt<T>>>,
{
    for attempt in 1..=max_attempts {
        match op(attempt).await? {
            Attempt::Done(value) => return Ok(value),
            Attempt::Retry(conflict) => {
                log_conflict_retry(attempt, max_attempts, &conflict.to_string());
            }
        }
    }

    warn!(max_attempts = max_attempts, "Retry budget exhausted");
    Err(RollcallError::RegistrationFailed {
        attempts: max_attempts,
    })
}
