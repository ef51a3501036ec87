//! Port for consultation persistence, assignment and the chat log.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    Consultation, ConsultationId, ConsultationMessage, NewConsultation, UserId, Username,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by consultation repository adapters.
    pub enum ConsultationPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "consultation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "consultation repository query failed: {message}",
    }
}

/// A consultation joined with its requester's username, for list pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationListing {
    #[serde(flatten)]
    pub consultation: Consultation,
    #[schema(value_type = String, example = "alice")]
    pub requester_username: Username,
}

/// Port for reading and mutating consultations.
///
/// Consultation lists are ordered by `(created_at, id)`; the chat log keeps
/// the order messages were recorded in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsultationRepository: Send + Sync {
    /// Store a new, unassigned consultation.
    async fn insert(
        &self,
        consultation: &NewConsultation,
    ) -> Result<(), ConsultationPersistenceError>;

    /// Fetch a consultation by identifier.
    async fn find_by_id(
        &self,
        id: &ConsultationId,
    ) -> Result<Option<Consultation>, ConsultationPersistenceError>;

    /// Every consultation without a responder.
    async fn list_open(&self) -> Result<Vec<ConsultationListing>, ConsultationPersistenceError>;

    /// Consultations submitted by `requester`.
    async fn list_by_requester(
        &self,
        requester: &UserId,
    ) -> Result<Vec<ConsultationListing>, ConsultationPersistenceError>;

    /// Consultations assigned to `responder`.
    async fn list_by_responder(
        &self,
        responder: &UserId,
    ) -> Result<Vec<ConsultationListing>, ConsultationPersistenceError>;

    /// Assign `doctor` as responder if, and only if, nobody holds the
    /// consultation yet. Returns `true` when this call made the assignment.
    ///
    /// Implementations must make the check and the write one atomic step so
    /// that exactly one of several concurrent claims wins.
    async fn try_claim(
        &self,
        id: &ConsultationId,
        doctor: &UserId,
    ) -> Result<bool, ConsultationPersistenceError>;

    /// Append `message` to the chat log and, when its author is the assigned
    /// responder, overwrite the consultation's `response` with its text.
    /// Both writes happen in one transaction.
    async fn record_message(
        &self,
        message: &ConsultationMessage,
    ) -> Result<(), ConsultationPersistenceError>;

    /// The chat log of a consultation, in the order it was recorded.
    async fn list_messages(
        &self,
        id: &ConsultationId,
    ) -> Result<Vec<ConsultationMessage>, ConsultationPersistenceError>;
}
