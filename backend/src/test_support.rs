//! Test utilities for the medlink crate.
//!
//! In-memory repositories, a fixed clock and cheap password hashing shared by
//! unit tests (in `src/`) and integration tests (in `tests/`). Compiled for
//! tests and behind the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    ConsultationListing, ConsultationPersistenceError, ConsultationRepository, UserCredentials,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccountService, Consultation, ConsultationId, ConsultationMessage, ConsultationService,
    CredentialHasher, Email, NewConsultation, User, UserId, UserProfileService, Username,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Argon2id with the smallest parameters the crate accepts.
pub fn cheap_hasher() -> CredentialHasher {
    // 8 KiB, one pass, one lane: valid for argon2 0.5.
    CredentialHasher::with_params(8, 1, 1).unwrap_or_default()
}

/// Clock that advances one second on every reading, starting at a fixed
/// instant, so consecutive records get distinct ordered timestamps.
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    /// Start at 2025-06-01T09:00:00Z.
    pub fn new() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).single().unwrap_or_default())
    }

    /// Start at `instant`.
    pub fn starting_at(instant: DateTime<Utc>) -> Self {
        Self {
            next: Mutex::new(instant),
        }
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut next = lock(&self.next);
        let now = *next;
        *next = now + Duration::seconds(1);
        now
    }
}

/// User repository backed by a vector, enforcing the same uniqueness rules
/// as the database.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<UserCredentials>>,
}

impl InMemoryUserRepository {
    /// Empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn username_of(&self, id: &UserId) -> Option<Username> {
        lock(&self.users)
            .iter()
            .find(|record| record.user.id() == id)
            .map(|record| record.user.username().clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, record: &UserCredentials) -> Result<(), UserPersistenceError> {
        let mut users = lock(&self.users);
        if users
            .iter()
            .any(|existing| existing.user.username() == record.user.username())
        {
            return Err(UserPersistenceError::unique_violation("username"));
        }
        if users
            .iter()
            .any(|existing| existing.user.email() == record.user.email())
        {
            return Err(UserPersistenceError::unique_violation("email"));
        }
        users.push(record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.users)
            .iter()
            .find(|record| record.user.id() == id)
            .map(|record| record.user.clone()))
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        Ok(lock(&self.users)
            .iter()
            .find(|record| record.user.username().as_ref() == username)
            .cloned())
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserPersistenceError> {
        Ok(lock(&self.users)
            .iter()
            .any(|record| record.user.username() == username))
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, UserPersistenceError> {
        Ok(lock(&self.users)
            .iter()
            .any(|record| record.user.email() == email))
    }
}

#[derive(Debug, Default)]
struct ConsultationTables {
    consultations: Vec<Consultation>,
    messages: Vec<ConsultationMessage>,
}

/// Consultation repository backed by vectors. Claims are checked and written
/// under one lock, mirroring the conditional `UPDATE` of the Diesel adapter.
#[derive(Debug)]
pub struct InMemoryConsultationRepository {
    users: Arc<InMemoryUserRepository>,
    tables: Mutex<ConsultationTables>,
}

impl InMemoryConsultationRepository {
    /// Empty repository resolving requester names through `users`.
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            users,
            tables: Mutex::new(ConsultationTables::default()),
        }
    }

    fn listings(
        &self,
        filter: impl Fn(&Consultation) -> bool,
    ) -> Result<Vec<ConsultationListing>, ConsultationPersistenceError> {
        let mut matching: Vec<Consultation> = lock(&self.tables)
            .consultations
            .iter()
            .filter(|consultation| filter(consultation))
            .cloned()
            .collect();
        matching.sort_by(|a, b| (a.created_at, a.id.as_uuid()).cmp(&(b.created_at, b.id.as_uuid())));
        matching
            .into_iter()
            .map(|consultation| {
                let requester_username =
                    self.users.username_of(&consultation.requester_id).ok_or_else(|| {
                        ConsultationPersistenceError::query(format!(
                            "requester {} missing",
                            consultation.requester_id
                        ))
                    })?;
                Ok(ConsultationListing {
                    consultation,
                    requester_username,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ConsultationRepository for InMemoryConsultationRepository {
    async fn insert(
        &self,
        consultation: &NewConsultation,
    ) -> Result<(), ConsultationPersistenceError> {
        lock(&self.tables).consultations.push(Consultation {
            id: consultation.id,
            body: consultation.body.clone(),
            created_at: consultation.created_at,
            requester_id: consultation.requester_id.clone(),
            responder_id: None,
            response: None,
        });
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ConsultationId,
    ) -> Result<Option<Consultation>, ConsultationPersistenceError> {
        Ok(lock(&self.tables)
            .consultations
            .iter()
            .find(|consultation| consultation.id == *id)
            .cloned())
    }

    async fn list_open(&self) -> Result<Vec<ConsultationListing>, ConsultationPersistenceError> {
        self.listings(Consultation::is_open)
    }

    async fn list_by_requester(
        &self,
        requester: &UserId,
    ) -> Result<Vec<ConsultationListing>, ConsultationPersistenceError> {
        self.listings(|consultation| consultation.requester_id == *requester)
    }

    async fn list_by_responder(
        &self,
        responder: &UserId,
    ) -> Result<Vec<ConsultationListing>, ConsultationPersistenceError> {
        self.listings(|consultation| consultation.is_responder(responder))
    }

    async fn try_claim(
        &self,
        id: &ConsultationId,
        doctor: &UserId,
    ) -> Result<bool, ConsultationPersistenceError> {
        let mut tables = lock(&self.tables);
        match tables
            .consultations
            .iter_mut()
            .find(|consultation| consultation.id == *id && consultation.is_open())
        {
            Some(consultation) => {
                consultation.responder_id = Some(doctor.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn record_message(
        &self,
        message: &ConsultationMessage,
    ) -> Result<(), ConsultationPersistenceError> {
        let mut tables = lock(&self.tables);
        if let Some(consultation) = tables.consultations.iter_mut().find(|consultation| {
            consultation.id == message.consultation_id
                && consultation.is_responder(&message.author_id)
        }) {
            consultation.response = Some(message.body.clone());
        }
        tables.messages.push(message.clone());
        Ok(())
    }

    async fn list_messages(
        &self,
        id: &ConsultationId,
    ) -> Result<Vec<ConsultationMessage>, ConsultationPersistenceError> {
        // The log vector is append-only, so its order is insertion order.
        Ok(lock(&self.tables)
            .messages
            .iter()
            .filter(|message| message.consultation_id == *id)
            .cloned()
            .collect())
    }
}

/// Shared in-memory stores plus the services built over them.
pub struct InMemoryApp {
    pub users: Arc<InMemoryUserRepository>,
    pub consultations: Arc<InMemoryConsultationRepository>,
    pub state: HttpState,
}

impl InMemoryApp {
    /// Fresh empty stores wired into an [`HttpState`].
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let consultations = Arc::new(InMemoryConsultationRepository::new(users.clone()));
        let clock: Arc<dyn Clock> = Arc::new(SteppingClock::new());

        let accounts = Arc::new(AccountService::new(users.clone(), cheap_hasher()));
        let profiles = Arc::new(UserProfileService::new(users.clone(), consultations.clone()));
        let consultation_service = Arc::new(ConsultationService::new(
            consultations.clone(),
            users.clone(),
            clock,
        ));

        let state = HttpState::new(HttpStatePorts {
            login: accounts.clone(),
            registration: accounts,
            users: profiles,
            consultations: consultation_service.clone(),
            consultations_query: consultation_service,
        });

        Self {
            users,
            consultations,
            state,
        }
    }
}

impl Default for InMemoryApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResponseText;
    use uuid::Uuid;

    #[tokio::test]
    async fn chat_log_keeps_append_order_on_equal_timestamps() {
        let repo = InMemoryConsultationRepository::new(Arc::new(InMemoryUserRepository::new()));
        let consultation_id = ConsultationId::random();
        let at = Utc
            .with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        for (raw_id, text) in [(u128::MAX, "first"), (0, "second")] {
            repo.record_message(&ConsultationMessage {
                id: Uuid::from_u128(raw_id),
                consultation_id,
                author_id: UserId::random(),
                body: ResponseText::new(text).expect("valid text"),
                created_at: at,
            })
            .await
            .expect("recorded");
        }

        let log = repo.list_messages(&consultation_id).await.expect("log");
        let texts: Vec<&str> = log.iter().map(|m| m.body.as_ref()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }
}
