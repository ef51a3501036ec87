//! Driving port for the doctors' queue of open consultations.

use async_trait::async_trait;

use crate::domain::{Error, User};

use super::ConsultationListing;

/// Domain use-case port for consultation reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsultationQuery: Send + Sync {
    /// Open consultations, oldest first. Only doctors may look; anyone else
    /// gets `Forbidden`.
    async fn list_open(&self, viewer: &User) -> Result<Vec<ConsultationListing>, Error>;
}
