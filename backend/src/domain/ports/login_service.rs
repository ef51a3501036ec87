//! Driving ports for login and registration use-cases.
//!
//! In hexagonal terms these are *driving* ports: inbound adapters call them
//! to authenticate or create accounts without knowing the backing
//! infrastructure, so HTTP handler tests can substitute a test double.

use async_trait::async_trait;

use crate::domain::{ClaimedIdentity, Error, FieldErrors, LoginCredentials, Registration, User};

/// Message returned for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    ///
    /// Unknown usernames and wrong passwords fail identically with
    /// [`crate::domain::ErrorCode::Unauthorized`].
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

/// Domain use-case port for account creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create an account. A taken username or email fails with
    /// [`crate::domain::ErrorCode::InvalidRequest`] and field details.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Duplicate-field failures for whichever of the username and email are
    /// already registered. Lets a form that failed other checks report
    /// clashes in the same response.
    async fn taken_fields(&self, identity: &ClaimedIdentity) -> Result<FieldErrors, Error>;
}
