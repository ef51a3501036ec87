//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ConsultationCommand, ConsultationQuery, LoginService, RegistrationService, UserProfileQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub users: Arc<dyn UserProfileQuery>,
    pub consultations: Arc<dyn ConsultationCommand>,
    pub consultations_query: Arc<dyn ConsultationQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub users: Arc<dyn UserProfileQuery>,
    pub consultations: Arc<dyn ConsultationCommand>,
    pub consultations_query: Arc<dyn ConsultationQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use medlink::test_support::InMemoryApp;
    ///
    /// let app = InMemoryApp::new();
    /// let _login = app.state.login.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            registration,
            users,
            consultations,
            consultations_query,
        } = ports;
        Self {
            login,
            registration,
            users,
            consultations,
            consultations_query,
        }
    }
}
