//! Consultation requests, their chat log, and who may take part in a chat.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{User, UserId};

/// Maximum length of a consultation body or chat message, in characters.
pub const TEXT_MAX: usize = 140;

/// Validation errors for consultation components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsultationValidationError {
    InvalidId,
    EmptyText,
    TextTooLong { max: usize },
}

impl fmt::Display for ConsultationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "consultation id must be a valid UUID"),
            Self::EmptyText => write!(f, "This field is required."),
            Self::TextTooLong { max } => {
                write!(f, "Field cannot be longer than {max} characters.")
            }
        }
    }
}

impl std::error::Error for ConsultationValidationError {}

impl ConsultationValidationError {
    /// Stable machine-readable reason used in form field errors.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid",
            Self::EmptyText => "required",
            Self::TextTooLong { .. } => "too_long",
        }
    }
}

/// Stable consultation identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConsultationId(Uuid);

impl ConsultationId {
    /// Parse an identifier from its string form, e.g. a path segment.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ConsultationValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| ConsultationValidationError::InvalidId)
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConsultationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ConsultationId> for String {
    fn from(value: ConsultationId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for ConsultationId {
    type Error = ConsultationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn bounded_text(raw: &str) -> Result<String, ConsultationValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConsultationValidationError::EmptyText);
    }
    if trimmed.chars().count() > TEXT_MAX {
        return Err(ConsultationValidationError::TextTooLong { max: TEXT_MAX });
    }
    Ok(trimmed.to_owned())
}

macro_rules! bounded_text_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Trim and validate the text.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, ConsultationValidationError> {
                bounded_text(raw.as_ref()).map(Self)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConsultationValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

bounded_text_type! {
    /// Text of a consultation request.
    ///
    /// ## Invariants
    /// - trimmed, non-empty, at most [`TEXT_MAX`] characters.
    ConsultationBody
}

bounded_text_type! {
    /// Text of a chat post, and of the latest doctor response.
    ///
    /// ## Invariants
    /// - trimmed, non-empty, at most [`TEXT_MAX`] characters.
    ResponseText
}

/// A consultation request and its assignment state.
///
/// `responder_id` is `None` while the request is open. Once a doctor claims
/// it the responder never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    #[schema(value_type = String, example = "6f1c1a3e-2c7e-4d8b-9c1a-0d2e3f4a5b6c")]
    pub id: ConsultationId,
    #[schema(value_type = String, example = "need help")]
    pub body: ConsultationBody,
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub requester_id: UserId,
    #[schema(value_type = Option<String>)]
    pub responder_id: Option<UserId>,
    #[schema(value_type = Option<String>, example = "see a specialist")]
    pub response: Option<ResponseText>,
}

impl Consultation {
    /// True while no doctor has claimed the request.
    pub fn is_open(&self) -> bool {
        self.responder_id.is_none()
    }

    /// True when `user` is the assigned responder.
    pub fn is_responder(&self, user: &UserId) -> bool {
        self.responder_id.as_ref() == Some(user)
    }
}

/// A consultation about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConsultation {
    pub id: ConsultationId,
    pub body: ConsultationBody,
    pub created_at: DateTime<Utc>,
    pub requester_id: UserId,
}

/// One entry of a consultation's append-only chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationMessage {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub consultation_id: ConsultationId,
    #[schema(value_type = String)]
    pub author_id: UserId,
    #[schema(value_type = String, example = "see a specialist")]
    pub body: ResponseText,
    pub created_at: DateTime<Utc>,
}

/// What a user may do on a consultation's chat page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAccess {
    /// Requester or assigned responder: may view and post.
    Participant,
    /// A doctor looking at an open request: viewing claims it.
    Claimable,
    /// Anybody else.
    Denied,
}

impl ChatAccess {
    /// Decide access for `user` on `consultation`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use medlink::domain::{ChatAccess, Consultation, ConsultationBody, ConsultationId, User};
    ///
    /// let alice = User::try_from_strings(
    ///     "3fa85f64-5717-4562-b3fc-2c963f66afa6", "alice", "a@x.com", "military",
    /// ).unwrap();
    /// let bob = User::try_from_strings(
    ///     "7b0f6d3a-1c2e-4f5a-8b9c-0d1e2f3a4b5c", "bob", "b@x.com", "doctor",
    /// ).unwrap();
    /// let consultation = Consultation {
    ///     id: ConsultationId::random(),
    ///     body: ConsultationBody::new("need help").unwrap(),
    ///     created_at: Utc::now(),
    ///     requester_id: alice.id().clone(),
    ///     responder_id: None,
    ///     response: None,
    /// };
    /// assert_eq!(ChatAccess::decide(&consultation, &alice), ChatAccess::Participant);
    /// assert_eq!(ChatAccess::decide(&consultation, &bob), ChatAccess::Claimable);
    /// ```
    pub fn decide(consultation: &Consultation, user: &User) -> Self {
        if consultation.requester_id == *user.id() || consultation.is_responder(user.id()) {
            Self::Participant
        } else if consultation.is_open() && user.is_doctor() {
            Self::Claimable
        } else {
            Self::Denied
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    const ALICE: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
    const BOB: &str = "7b0f6d3a-1c2e-4f5a-8b9c-0d1e2f3a4b5c";
    const CAROL: &str = "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d";
    const DAVE: &str = "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d";

    fn user(id: &str, name: &str, role: &str) -> User {
        User::try_from_strings(id, name, format!("{name}@x.com"), role).expect("valid user")
    }

    #[fixture]
    fn open_consultation() -> Consultation {
        Consultation {
            id: ConsultationId::random(),
            body: ConsultationBody::new("need help").expect("valid body"),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            requester_id: UserId::new(ALICE).expect("valid id"),
            responder_id: None,
            response: None,
        }
    }

    #[rstest]
    #[case("", ConsultationValidationError::EmptyText)]
    #[case("  \t ", ConsultationValidationError::EmptyText)]
    fn blank_text_is_rejected(#[case] raw: &str, #[case] expected: ConsultationValidationError) {
        assert_eq!(ConsultationBody::new(raw).expect_err("blank"), expected);
        assert_eq!(ResponseText::new(raw).expect_err("blank"), expected);
    }

    #[rstest]
    fn text_length_is_bounded_in_characters() {
        let at_limit = "é".repeat(TEXT_MAX);
        assert!(ConsultationBody::new(&at_limit).is_ok());
        let over = "é".repeat(TEXT_MAX + 1);
        assert_eq!(
            ResponseText::new(&over).expect_err("too long"),
            ConsultationValidationError::TextTooLong { max: TEXT_MAX }
        );
    }

    #[rstest]
    fn text_is_trimmed() {
        let body = ConsultationBody::new("  need help \n").expect("valid body");
        assert_eq!(body.as_ref(), "need help");
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    fn consultation_id_rejects_garbage(#[case] raw: &str) {
        assert_eq!(
            ConsultationId::new(raw).expect_err("invalid id"),
            ConsultationValidationError::InvalidId
        );
    }

    #[rstest]
    #[case(user(ALICE, "alice", "military"), ChatAccess::Participant)]
    #[case(user(BOB, "bob", "doctor"), ChatAccess::Claimable)]
    #[case(user(CAROL, "carol", "military"), ChatAccess::Denied)]
    fn open_consultation_access(
        open_consultation: Consultation,
        #[case] viewer: User,
        #[case] expected: ChatAccess,
    ) {
        assert_eq!(ChatAccess::decide(&open_consultation, &viewer), expected);
    }

    #[rstest]
    #[case(user(ALICE, "alice", "military"), ChatAccess::Participant)]
    #[case(user(BOB, "bob", "doctor"), ChatAccess::Participant)]
    #[case(user(DAVE, "dave", "doctor"), ChatAccess::Denied)]
    #[case(user(CAROL, "carol", "military"), ChatAccess::Denied)]
    fn assigned_consultation_access(
        mut open_consultation: Consultation,
        #[case] viewer: User,
        #[case] expected: ChatAccess,
    ) {
        open_consultation.responder_id = Some(UserId::new(BOB).expect("valid id"));
        assert!(!open_consultation.is_open());
        assert_eq!(ChatAccess::decide(&open_consultation, &viewer), expected);
    }
}
