//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod consultation_command;
mod consultation_query;
mod consultation_repository;
mod login_service;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use consultation_command::MockConsultationCommand;
pub use consultation_command::{ChatView, ConsultationCommand};
#[cfg(test)]
pub use consultation_query::MockConsultationQuery;
pub use consultation_query::ConsultationQuery;
#[cfg(test)]
pub use consultation_repository::MockConsultationRepository;
pub use consultation_repository::{
    ConsultationListing, ConsultationPersistenceError, ConsultationRepository,
};
#[cfg(test)]
pub use login_service::{MockLoginService, MockRegistrationService};
pub use login_service::{INVALID_CREDENTIALS_MESSAGE, LoginService, RegistrationService};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::{UserProfile, UserProfileQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserCredentials, UserPersistenceError, UserRepository};
