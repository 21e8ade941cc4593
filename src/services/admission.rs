//! Capacity admission.
//!
//! Admission is never decided from a count read earlier in the request. The
//! decision is the store's capacity-guarded write itself, so two requests racing
//! for the last place cannot both be admitted.

use tracing::debug;

use crate::models::{NewRegistration, Registration, RegistrationCode, RegistrationId};
use crate::store::{ConflictKind, RegistrationStore, Transition};
use crate::utils::errors::Result;

/// What the caller wants to turn into a `REGISTERED` row
#[derive(Debug, Clone)]
pub enum AdmissionRequest {
    /// First registration of the pair
    New(NewRegistration),
    /// Pair registered before and later cancelled
    Returning {
        registration_id: RegistrationId,
        code: RegistrationCode,
    },
}

impl AdmissionRequest {
    /// Lifecycle action recorded when this request is admitted
    pub fn action(&self) -> &'static str {
        match self {
            AdmissionRequest::New(_) => "registered",
            AdmissionRequest::Returning { .. } => "re-registered",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Admission {
    Admitted(Registration),
    CapacityFull,
    /// Lost a race on a uniqueness or state guard; re-derive and retry
    Conflict(ConflictKind),
}

#[derive(Clone)]
pub struct AdmissionController<S> {
    store: S,
}

impl<S: RegistrationStore> AdmissionController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Attempt the guarded transition into `REGISTERED`
    pub async fn admit(&self, request: AdmissionRequest) -> Result<Admission> {
        let transition = match request {
            AdmissionRequest::New(registration) => {
                debug!(event_id = %registration.event_id, user_id = %registration.user_id, "Admitting new registration");
                self.store.insert_registered(registration).await?
            }
            AdmissionRequest::Returning {
                registration_id,
                code,
            } => {
                debug!(registration_id = %registration_id, "Admitting returning registration");
                self.store.reactivate(registration_id, code).await?
            }
        };

        Ok(match transition {
            Transition::Applied(registration) => Admission::Admitted(registration),
            Transition::CapacityFull => Admission::CapacityFull,
            Transition::Conflict(kind) => Admission::Conflict(kind),
        })
    }
}
