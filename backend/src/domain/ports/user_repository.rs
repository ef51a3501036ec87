//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Email, PasswordHash, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A uniqueness constraint rejected the insert; `field` is the form
        /// field it guards (`username` or `email`).
        UniqueViolation { field: String } => "user repository unique constraint violated on {field}",
    }
}

/// A user together with the stored password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: PasswordHash,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Fails with
    /// [`UserPersistenceError::UniqueViolation`] when the username or email
    /// is taken.
    async fn insert(&self, record: &UserCredentials) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and password hash by exact username.
    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// True when an account already uses `username`.
    async fn username_exists(&self, username: &Username) -> Result<bool, UserPersistenceError>;

    /// True when an account already uses `email`.
    async fn email_exists(&self, email: &Email) -> Result<bool, UserPersistenceError>;
}
