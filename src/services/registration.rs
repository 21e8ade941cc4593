//! Registration lifecycle service
//!
//! Owns the per-pair state machine `NONE → REGISTERED ↔ CANCELLED`. Registration
//! and cancellation both close once the event deadline has passed.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::admission::{Admission, AdmissionController, AdmissionRequest};
use super::codes::CodeSource;
use super::retry::{retry_on_conflict, Attempt};
use crate::config::RegistrationConfig;
use crate::models::{
    Event, EventId, NewRegistration, Registration, RegistrationStatus, UserId,
};
use crate::store::RegistrationStore;
use crate::utils::errors::{Result, RollcallError};
use crate::utils::logging::{log_registration_action, log_registration_rejected};

#[derive(Clone)]
pub struct RegistrationService<S, C> {
    store: S,
    admission: AdmissionController<S>,
    codes: C,
    config: RegistrationConfig,
}

impl<S, C> RegistrationService<S, C>
where
    S: RegistrationStore + Clone,
    C: CodeSource,
{
    pub fn new(store: S, codes: C, config: RegistrationConfig) -> Self {
        Self {
            admission: AdmissionController::new(store.clone()),
            store,
            codes,
            config,
        }
    }

    /// Register `user_id` for `event_id`, creating the pair's document or
    /// reviving a cancelled one with a fresh code.
    pub async fn register(&self, event_id: EventId, user_id: UserId, now: DateTime<Utc>) -> Result<Registration> {
        debug!(event_id = %event_id, user_id = %user_id, "Registration requested");

        let result = self.try_register(event_id, user_id, now).await;
        match &result {
            Ok((registration, action)) => {
                log_registration_action(event_id, user_id, registration.id, action);
            }
            Err(err) if err.is_domain_rejection() => {
                log_registration_rejected(event_id, user_id, &err.to_string());
            }
            Err(_) => {}
        }
        result.map(|(registration, _)| registration)
    }

    async fn try_register(
        &self,
        event_id: EventId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<(Registration, &'static str)> {
        let event = self.open_event(event_id, now).await?;
        let capacity = event.capacity;

        retry_on_conflict(self.config.max_code_attempts, |attempt| async move {
            let code = self.codes.next_code(self.config.code_length);

            let request = match self.store.find_registration(event_id, user_id).await? {
                Some(existing) if existing.status == RegistrationStatus::Registered => {
                    return Err(RollcallError::AlreadyRegistered { event_id, user_id });
                }
                Some(existing) => AdmissionRequest::Returning {
                    registration_id: existing.id,
                    code,
                },
                None => AdmissionRequest::New(NewRegistration {
                    event_id,
                    user_id,
                    code,
                }),
            };

            let action = request.action();
            match self.admission.admit(request).await? {
                Admission::Admitted(registration) => {
                    debug!(attempt = attempt, registration_id = %registration.id, "Admission granted");
                    Ok(Attempt::Done((registration, action)))
                }
                Admission::CapacityFull => Err(RollcallError::CapacityFull { event_id, capacity }),
                Admission::Conflict(kind) => Ok(Attempt::Retry(kind)),
            }
        })
        .await
    }

    /// Cancel the pair's registration, freeing its place and its code
    pub async fn deregister(&self, event_id: EventId, user_id: UserId, now: DateTime<Utc>) -> Result<Registration> {
        debug!(event_id = %event_id, user_id = %user_id, "Cancellation requested");

        let result = self.try_deregister(event_id, user_id, now).await;
        match &result {
            Ok(registration) => {
                log_registration_action(event_id, user_id, registration.id, "cancelled");
            }
            Err(err) if err.is_domain_rejection() => {
                log_registration_rejected(event_id, user_id, &err.to_string());
            }
            Err(_) => {}
        }
        result
    }

    async fn try_deregister(&self, event_id: EventId, user_id: UserId, now: DateTime<Utc>) -> Result<Registration> {
        self.open_event(event_id, now).await?;

        self.store
            .cancel(event_id, user_id)
            .await?
            .ok_or(RollcallError::RegistrationNotFound { event_id, user_id })
    }

    /// A user's registrations in the given state
    pub async fn registrations_for_user(&self, user_id: UserId, status: RegistrationStatus) -> Result<Vec<Registration>> {
        self.store.registrations_for_user(user_id, status).await
    }

    async fn open_event(&self, event_id: EventId, now: DateTime<Utc>) -> Result<Event> {
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(RollcallError::EventNotFound { event_id })?;

        if !event.registration_open(now) {
            return Err(RollcallError::DeadlinePassed {
                event_id,
                deadline: event.deadline,
            });
        }

        Ok(event)
    }
}
