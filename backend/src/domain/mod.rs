//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define strongly typed entities used by the HTTP and persistence
//! adapters, plus the use-case services behind the driving ports. Types keep
//! their invariants in constructors and document serialisation contracts in
//! their Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport agnostic failure payload.
//! - User, Role and their validated components.
//! - Consultation, ConsultationMessage and the chat access policy.
//! - AccountService, UserProfileService, ConsultationService.

pub mod account_service;
pub mod auth;
pub mod consultation;
pub mod consultation_service;
pub mod error;
pub mod password;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::account_service::{AccountService, UserProfileService};
pub use self::auth::{
    ClaimedIdentity, DUPLICATE_EMAIL_MESSAGE, DUPLICATE_USERNAME_MESSAGE, LoginCredentials,
    LoginValidationError, PASSWORD_MISMATCH_MESSAGE, REQUIRED_MESSAGE, Registration,
    RegistrationForm, RejectedRegistration,
};
pub use self::consultation::{
    ChatAccess, Consultation, ConsultationBody, ConsultationId, ConsultationMessage,
    ConsultationValidationError, NewConsultation, ResponseText, TEXT_MAX,
};
pub use self::consultation_service::ConsultationService;
pub use self::error::{Error, ErrorCode};
pub use self::password::{CredentialHasher, PasswordHash};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, Email, Role, USERNAME_MAX, User, UserId, UserValidationError, Username,
};
pub use self::validation::{FieldError, FieldErrors};

/// Convenient result alias for domain operations.
///
/// # Examples
/// ```
/// use medlink::domain::{DomainResult, Error};
///
/// fn refuse() -> DomainResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(refuse().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
