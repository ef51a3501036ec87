//! Internal Diesel row structs.
//!
//! These types never leave the persistence layer. Conversions into domain
//! types validate every column so a corrupt row surfaces as a query error
//! instead of a panic.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::UserCredentials;
use crate::domain::{
    Consultation, ConsultationBody, ConsultationId, ConsultationMessage, Email, PasswordHash,
    ResponseText, Role, User, UserId, Username,
};

use super::schema::{consultation_messages, consultations, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

impl UserRow {
    /// Validate the row into a domain user, dropping the hash.
    pub(crate) fn into_user(self) -> Result<User, String> {
        self.into_credentials().map(|record| record.user)
    }

    /// Validate the row into a user plus stored hash.
    pub(crate) fn into_credentials(self) -> Result<UserCredentials, String> {
        let invalid = |err: &dyn std::fmt::Display| format!("invalid user row {}: {err}", self.id);
        let username = Username::new(&self.username).map_err(|err| invalid(&err))?;
        let email = Email::new(&self.email).map_err(|err| invalid(&err))?;
        let role = self.role.parse::<Role>().map_err(|err| invalid(&err))?;
        Ok(UserCredentials {
            user: User::new(UserId::from_uuid(self.id), username, email, role),
            password_hash: PasswordHash::from_stored(self.password_hash),
        })
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

impl<'a> From<&'a UserCredentials> for NewUserRow<'a> {
    fn from(record: &'a UserCredentials) -> Self {
        Self {
            id: *record.user.id().as_uuid(),
            username: record.user.username().as_ref(),
            email: record.user.email().as_ref(),
            password_hash: record.password_hash.as_ref(),
            role: record.user.role().as_str(),
        }
    }
}

/// Row struct for reading from the consultations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = consultations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConsultationRow {
    pub id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub requester_id: Uuid,
    pub responder_id: Option<Uuid>,
    pub response: Option<String>,
}

impl TryFrom<ConsultationRow> for Consultation {
    type Error = String;

    fn try_from(row: ConsultationRow) -> Result<Self, Self::Error> {
        let invalid = |err: &dyn std::fmt::Display| format!("invalid consultation row {}: {err}", row.id);
        let body = ConsultationBody::new(&row.body).map_err(|err| invalid(&err))?;
        let response = row
            .response
            .as_deref()
            .map(ResponseText::new)
            .transpose()
            .map_err(|err| invalid(&err))?;
        Ok(Self {
            id: ConsultationId::from_uuid(row.id),
            body,
            created_at: row.created_at,
            requester_id: UserId::from_uuid(row.requester_id),
            responder_id: row.responder_id.map(UserId::from_uuid),
            response,
        })
    }
}

/// Insertable struct for creating consultation records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = consultations)]
pub(crate) struct NewConsultationRow<'a> {
    pub id: Uuid,
    pub body: &'a str,
    pub created_at: DateTime<Utc>,
    pub requester_id: Uuid,
}

/// Row struct for the chat log.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = consultation_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub consultation_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ConsultationMessage> for MessageRow {
    fn from(message: &ConsultationMessage) -> Self {
        Self {
            id: message.id,
            consultation_id: *message.consultation_id.as_uuid(),
            author_id: *message.author_id.as_uuid(),
            body: message.body.as_ref().to_owned(),
            created_at: message.created_at,
        }
    }
}

impl TryFrom<MessageRow> for ConsultationMessage {
    type Error = String;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let body = ResponseText::new(&row.body)
            .map_err(|err| format!("invalid message row {}: {err}", row.id))?;
        Ok(Self {
            id: row.id,
            consultation_id: ConsultationId::from_uuid(row.consultation_id),
            author_id: UserId::from_uuid(row.author_id),
            body,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversions.
    use super::*;
    use rstest::rstest;

    fn user_row(role: &str) -> UserRow {
        UserRow {
            id: Uuid::nil(),
            username: "alice".to_owned(),
            email: "a@x.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            role: role.to_owned(),
        }
    }

    #[rstest]
    fn user_row_converts_known_role() {
        let record = user_row("doctor").into_credentials().expect("valid row");
        assert!(record.user.is_doctor());
        assert_eq!(record.password_hash.as_ref(), "$argon2id$stub");
    }

    #[rstest]
    fn user_row_rejects_unknown_role() {
        let err = user_row("admin").into_user().expect_err("bad role");
        assert!(err.contains("invalid user row"));
    }

    #[rstest]
    fn consultation_row_rejects_oversize_response() {
        let row = ConsultationRow {
            id: Uuid::nil(),
            body: "need help".to_owned(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            requester_id: Uuid::nil(),
            responder_id: None,
            response: Some("x".repeat(141)),
        };
        assert!(Consultation::try_from(row).is_err());
    }
}
