//! Consultation domain services.
//!
//! Submission, the doctors' queue, and the chat workflow with its
//! first-doctor-wins claim.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::account_service::{
    map_consultation_repository_error, map_user_repository_error,
};
use crate::domain::ports::{
    ChatView, ConsultationCommand, ConsultationListing, ConsultationQuery,
    ConsultationRepository, UserRepository,
};
use crate::domain::{
    ChatAccess, Consultation, ConsultationBody, ConsultationId, ConsultationMessage, Error,
    NewConsultation, ResponseText, User, UserId,
};

/// Consultation service implementing the command and query driving ports.
#[derive(Clone)]
pub struct ConsultationService<C, U> {
    consultation_repo: Arc<C>,
    user_repo: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<C, U> ConsultationService<C, U> {
    /// Create a new service over the consultation and user repositories.
    pub fn new(consultation_repo: Arc<C>, user_repo: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            consultation_repo,
            user_repo,
            clock,
        }
    }
}

impl<C, U> ConsultationService<C, U>
where
    C: ConsultationRepository,
    U: UserRepository,
{
    async fn load(&self, id: &ConsultationId) -> Result<Consultation, Error> {
        self.consultation_repo
            .find_by_id(id)
            .await
            .map_err(map_consultation_repository_error)?
            .ok_or_else(|| Error::not_found("consultation not found"))
    }

    async fn load_user(&self, id: &UserId) -> Result<User, Error> {
        self.user_repo
            .find_by_id(id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::internal(format!("consultation references missing user {id}")))
    }

    /// Apply the chat access policy, claiming the consultation when the
    /// viewer is eligible. Returns the current state and whether this call
    /// won the claim.
    async fn enter_chat(
        &self,
        viewer: &User,
        id: &ConsultationId,
    ) -> Result<(Consultation, bool), Error> {
        let consultation = self.load(id).await?;
        match ChatAccess::decide(&consultation, viewer) {
            ChatAccess::Participant => Ok((consultation, false)),
            ChatAccess::Denied => Err(Error::forbidden(
                "you are not a participant in this consultation",
            )),
            ChatAccess::Claimable => {
                let won = self
                    .consultation_repo
                    .try_claim(id, viewer.id())
                    .await
                    .map_err(map_consultation_repository_error)?;
                let consultation = self.load(id).await?;
                if won {
                    info!(consultation_id = %id, doctor_id = %viewer.id(), "consultation claimed");
                    return Ok((consultation, true));
                }
                debug!(consultation_id = %id, doctor_id = %viewer.id(), "claim lost");
                match ChatAccess::decide(&consultation, viewer) {
                    ChatAccess::Participant => Ok((consultation, false)),
                    ChatAccess::Denied => Err(Error::forbidden(
                        "consultation is already assigned to another doctor",
                    )),
                    ChatAccess::Claimable => Err(Error::conflict(
                        "consultation could not be claimed, try again",
                    )),
                }
            }
        }
    }

    async fn chat_view(&self, consultation: Consultation, claimed: bool) -> Result<ChatView, Error> {
        let requester = self.load_user(&consultation.requester_id).await?;
        let responder = match consultation.responder_id.as_ref() {
            Some(id) => Some(self.load_user(id).await?),
            None => None,
        };
        let messages = self
            .consultation_repo
            .list_messages(&consultation.id)
            .await
            .map_err(map_consultation_repository_error)?;
        Ok(ChatView {
            consultation,
            requester,
            responder,
            messages,
            claimed,
        })
    }
}

#[async_trait]
impl<C, U> ConsultationCommand for ConsultationService<C, U>
where
    C: ConsultationRepository,
    U: UserRepository,
{
    async fn submit(
        &self,
        requester: &User,
        body: ConsultationBody,
    ) -> Result<Consultation, Error> {
        let record = NewConsultation {
            id: ConsultationId::random(),
            body,
            created_at: self.clock.utc(),
            requester_id: requester.id().clone(),
        };
        self.consultation_repo
            .insert(&record)
            .await
            .map_err(map_consultation_repository_error)?;

        info!(consultation_id = %record.id, requester_id = %record.requester_id, "consultation submitted");
        Ok(Consultation {
            id: record.id,
            body: record.body,
            created_at: record.created_at,
            requester_id: record.requester_id,
            responder_id: None,
            response: None,
        })
    }

    async fn open_chat(&self, viewer: &User, id: &ConsultationId) -> Result<ChatView, Error> {
        let (consultation, claimed) = self.enter_chat(viewer, id).await?;
        self.chat_view(consultation, claimed).await
    }

    async fn respond(
        &self,
        author: &User,
        id: &ConsultationId,
        text: ResponseText,
    ) -> Result<ChatView, Error> {
        let (consultation, claimed) = self.enter_chat(author, id).await?;
        let message = ConsultationMessage {
            id: Uuid::new_v4(),
            consultation_id: consultation.id,
            author_id: author.id().clone(),
            body: text,
            created_at: self.clock.utc(),
        };
        self.consultation_repo
            .record_message(&message)
            .await
            .map_err(map_consultation_repository_error)?;
        debug!(
            consultation_id = %id,
            author_id = %author.id(),
            is_response = consultation.is_responder(author.id()),
            "chat message recorded"
        );

        let consultation = self.load(id).await?;
        self.chat_view(consultation, claimed).await
    }
}

#[async_trait]
impl<C, U> ConsultationQuery for ConsultationService<C, U>
where
    C: ConsultationRepository,
    U: UserRepository,
{
    async fn list_open(&self, viewer: &User) -> Result<Vec<ConsultationListing>, Error> {
        if !viewer.is_doctor() {
            return Err(Error::forbidden("only doctors may view open consultations"));
        }
        self.consultation_repo
            .list_open()
            .await
            .map_err(map_consultation_repository_error)
    }
}

#[cfg(test)]
#[path = "consultation_service_tests.rs"]
mod tests;
