//! Wiring of Diesel repositories into the services behind the HTTP ports.

use std::sync::Arc;

use mockable::DefaultClock;

use crate::domain::{AccountService, ConsultationService, CredentialHasher, UserProfileService};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::persistence::{DbPool, DieselConsultationRepository, DieselUserRepository};

/// Build the HTTP state over PostgreSQL-backed repositories sharing `pool`.
pub fn build_http_state(pool: &DbPool) -> HttpState {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let consultations = Arc::new(DieselConsultationRepository::new(pool.clone()));

    let accounts = Arc::new(AccountService::new(users.clone(), CredentialHasher::default()));
    let profiles = Arc::new(UserProfileService::new(users.clone(), consultations.clone()));
    let consultation_service = Arc::new(ConsultationService::new(
        consultations,
        users,
        Arc::new(DefaultClock),
    ));

    HttpState::new(HttpStatePorts {
        login: accounts.clone(),
        registration: accounts,
        users: profiles,
        consultations: consultation_service.clone(),
        consultations_query: consultation_service,
    })
}
