//! Driving port for loading the signed-in user and their profile.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, User, UserId};

use super::ConsultationListing;

/// The profile page: a user and both sides of their consultations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user: User,
    /// Consultations the user submitted.
    pub consultations: Vec<ConsultationListing>,
    /// Consultations the user is assigned to answer.
    pub responses: Vec<ConsultationListing>,
}

/// Domain use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Resolve a session's user id; `None` when the account no longer exists.
    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, Error>;

    /// Return the profile for the authenticated user.
    async fn fetch_profile(&self, user: &User) -> Result<UserProfile, Error>;
}
