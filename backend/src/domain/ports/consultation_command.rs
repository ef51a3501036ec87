//! Driving port for consultation submission and the chat workflow.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    Consultation, ConsultationBody, ConsultationId, ConsultationMessage, Error, ResponseText, User,
};

/// Everything the chat page shows for one consultation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub consultation: Consultation,
    pub requester: User,
    pub responder: Option<User>,
    /// Chat log, oldest first.
    pub messages: Vec<ConsultationMessage>,
    /// True when this request assigned the viewer as responder.
    pub claimed: bool,
}

/// Domain use-case port for consultation mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsultationCommand: Send + Sync {
    /// Store a new open consultation on behalf of `requester`.
    async fn submit(
        &self,
        requester: &User,
        body: ConsultationBody,
    ) -> Result<Consultation, Error>;

    /// Show the chat for `id`, claiming it first when `viewer` is a doctor
    /// and nobody holds it yet.
    ///
    /// Fails with `NotFound` for unknown ids and `Forbidden` for users who are
    /// neither participants nor an eligible claimant.
    async fn open_chat(&self, viewer: &User, id: &ConsultationId) -> Result<ChatView, Error>;

    /// Claim as [`ConsultationCommand::open_chat`] does, then append `text`
    /// to the chat log. A post by the assigned responder also becomes the
    /// consultation's response.
    async fn respond(
        &self,
        author: &User,
        id: &ConsultationId,
        text: ResponseText,
    ) -> Result<ChatView, Error>;
}
