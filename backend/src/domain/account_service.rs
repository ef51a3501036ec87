//! Account services: login, registration and profile reads.
//!
//! These services implement the account driving ports on top of the user and
//! consultation repositories.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    ConsultationPersistenceError, ConsultationRepository, INVALID_CREDENTIALS_MESSAGE,
    LoginService, RegistrationService, UserCredentials, UserPersistenceError, UserProfile,
    UserProfileQuery, UserRepository,
};
use crate::domain::{
    ClaimedIdentity, CredentialHasher, DUPLICATE_EMAIL_MESSAGE, DUPLICATE_USERNAME_MESSAGE, Error, FieldErrors,
    LoginCredentials, Registration, User, UserId,
};

pub(crate) fn map_user_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::UniqueViolation { field } => duplicate_field(&field).into(),
    }
}

pub(crate) fn map_consultation_repository_error(error: ConsultationPersistenceError) -> Error {
    match error {
        ConsultationPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("consultation repository unavailable: {message}"))
        }
        ConsultationPersistenceError::Query { message } => {
            Error::internal(format!("consultation repository error: {message}"))
        }
    }
}

fn duplicate_field(field: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if field == "email" {
        errors.push("email", "duplicate_email", DUPLICATE_EMAIL_MESSAGE);
    } else {
        errors.push("username", "duplicate_username", DUPLICATE_USERNAME_MESSAGE);
    }
    errors
}

/// Account service implementing the login and registration ports.
#[derive(Clone)]
pub struct AccountService<U> {
    user_repo: Arc<U>,
    hasher: CredentialHasher,
}

impl<U> AccountService<U> {
    /// Create a new service over the user repository.
    pub fn new(user_repo: Arc<U>, hasher: CredentialHasher) -> Self {
        Self { user_repo, hasher }
    }
}

#[async_trait]
impl<U> LoginService for AccountService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let record = self
            .user_repo
            .find_credentials_by_username(credentials.username())
            .await
            .map_err(map_user_repository_error)?;

        let (user, stored) = match record {
            Some(UserCredentials {
                user,
                password_hash,
            }) => (Some(user), Some(password_hash)),
            None => (None, None),
        };
        let verified = self.hasher.check(credentials.password(), stored).await?;

        match user {
            Some(user) if verified => {
                info!(user_id = %user.id(), "login succeeded");
                Ok(user)
            }
            _ => {
                warn!(username = credentials.username(), "login rejected");
                Err(Error::unauthorized(INVALID_CREDENTIALS_MESSAGE))
            }
        }
    }
}

#[async_trait]
impl<U> RegistrationService for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        self.taken_fields(&registration.identity())
            .await?
            .into_result()?;

        let password_hash = self.hasher.hash_blocking(registration.password()).await?;
        let user = User::new(
            UserId::random(),
            registration.username().clone(),
            registration.email().clone(),
            registration.role(),
        );
        self.user_repo
            .insert(&UserCredentials {
                user: user.clone(),
                password_hash,
            })
            .await
            .map_err(map_user_repository_error)?;

        info!(user_id = %user.id(), role = %user.role(), "account registered");
        Ok(user)
    }

    async fn taken_fields(&self, identity: &ClaimedIdentity) -> Result<FieldErrors, Error> {
        let mut errors = FieldErrors::new();
        if let Some(username) = &identity.username {
            let taken = self
                .user_repo
                .username_exists(username)
                .await
                .map_err(map_user_repository_error)?;
            if taken {
                errors.push("username", "duplicate_username", DUPLICATE_USERNAME_MESSAGE);
            }
        }
        if let Some(email) = &identity.email {
            let taken = self
                .user_repo
                .email_exists(email)
                .await
                .map_err(map_user_repository_error)?;
            if taken {
                errors.push("email", "duplicate_email", DUPLICATE_EMAIL_MESSAGE);
            }
        }
        Ok(errors)
    }
}

/// Profile service implementing [`UserProfileQuery`].
#[derive(Clone)]
pub struct UserProfileService<U, C> {
    user_repo: Arc<U>,
    consultation_repo: Arc<C>,
}

impl<U, C> UserProfileService<U, C> {
    /// Create a new service over the user and consultation repositories.
    pub fn new(user_repo: Arc<U>, consultation_repo: Arc<C>) -> Self {
        Self {
            user_repo,
            consultation_repo,
        }
    }
}

#[async_trait]
impl<U, C> UserProfileQuery for UserProfileService<U, C>
where
    U: UserRepository,
    C: ConsultationRepository,
{
    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(map_user_repository_error)
    }

    async fn fetch_profile(&self, user: &User) -> Result<UserProfile, Error> {
        let consultations = self
            .consultation_repo
            .list_by_requester(user.id())
            .await
            .map_err(map_consultation_repository_error)?;
        let responses = self
            .consultation_repo
            .list_by_responder(user.id())
            .await
            .map_err(map_consultation_repository_error)?;
        Ok(UserProfile {
            user: user.clone(),
            consultations,
            responses,
        })
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
