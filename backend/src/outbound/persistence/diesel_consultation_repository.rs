//! PostgreSQL-backed `ConsultationRepository` implementation using Diesel ORM.
//!
//! The claim is a single conditional `UPDATE ... WHERE responder_id IS NULL`,
//! so PostgreSQL row locking decides races: the first committed update wins
//! and every later one matches zero rows.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    ConsultationListing, ConsultationPersistenceError, ConsultationRepository,
};
use crate::domain::{
    Consultation, ConsultationId, ConsultationMessage, NewConsultation, UserId, Username,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{ConsultationRow, MessageRow, NewConsultationRow};
use super::pool::{DbPool, PoolError};
use super::schema::{consultation_messages, consultations, users};

/// Diesel-backed implementation of the [`ConsultationRepository`] port.
#[derive(Clone)]
pub struct DieselConsultationRepository {
    pool: DbPool,
}

impl DieselConsultationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn list_where(
        &self,
        filter: ListingFilter,
    ) -> Result<Vec<ConsultationListing>, ConsultationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let query = consultations::table
            .inner_join(users::table)
            .select((ConsultationRow::as_select(), users::username))
            .order((consultations::created_at.asc(), consultations::id.asc()))
            .into_boxed();
        let query = match filter {
            ListingFilter::Open => query.filter(consultations::responder_id.is_null()),
            ListingFilter::Requester(id) => query.filter(consultations::requester_id.eq(id)),
            ListingFilter::Responder(id) => query.filter(consultations::responder_id.eq(id)),
        };
        let rows: Vec<(ConsultationRow, String)> = query
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, filter.operation()))?;
        rows.into_iter().map(into_listing).collect()
    }
}

/// Which consultations a listing query returns.
#[derive(Debug, Clone, Copy)]
enum ListingFilter {
    Open,
    Requester(Uuid),
    Responder(Uuid),
}

impl ListingFilter {
    fn operation(self) -> &'static str {
        match self {
            Self::Open => "list open consultations",
            Self::Requester(_) => "list consultations by requester",
            Self::Responder(_) => "list consultations by responder",
        }
    }
}

fn map_pool_error(error: PoolError) -> ConsultationPersistenceError {
    ConsultationPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(
    error: diesel::result::Error,
    operation: &'static str,
) -> ConsultationPersistenceError {
    match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => ConsultationPersistenceError::connection(message),
        DieselFailure::Query(message) => ConsultationPersistenceError::query(message),
        DieselFailure::UniqueViolation { constraint } => ConsultationPersistenceError::query(
            format!(
                "unexpected unique violation on {}",
                constraint.as_deref().unwrap_or("unknown constraint")
            ),
        ),
    }
}

fn into_consultation(row: ConsultationRow) -> Result<Consultation, ConsultationPersistenceError> {
    Consultation::try_from(row).map_err(ConsultationPersistenceError::query)
}

fn into_listing(
    (row, username): (ConsultationRow, String),
) -> Result<ConsultationListing, ConsultationPersistenceError> {
    let requester_username = Username::new(&username).map_err(|err| {
        ConsultationPersistenceError::query(format!("invalid requester username: {err}"))
    })?;
    Ok(ConsultationListing {
        consultation: into_consultation(row)?,
        requester_username,
    })
}

#[async_trait]
impl ConsultationRepository for DieselConsultationRepository {
    async fn insert(
        &self,
        consultation: &NewConsultation,
    ) -> Result<(), ConsultationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(consultations::table)
            .values(NewConsultationRow {
                id: *consultation.id.as_uuid(),
                body: consultation.body.as_ref(),
                created_at: consultation.created_at,
                requester_id: *consultation.requester_id.as_uuid(),
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "insert consultation"))
    }

    async fn find_by_id(
        &self,
        id: &ConsultationId,
    ) -> Result<Option<Consultation>, ConsultationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        consultations::table
            .find(id.as_uuid())
            .select(ConsultationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find consultation"))?
            .map(into_consultation)
            .transpose()
    }

    async fn list_open(&self) -> Result<Vec<ConsultationListing>, ConsultationPersistenceError> {
        self.list_where(ListingFilter::Open).await
    }

    async fn list_by_requester(
        &self,
        requester: &UserId,
    ) -> Result<Vec<ConsultationListing>, ConsultationPersistenceError> {
        self.list_where(ListingFilter::Requester(*requester.as_uuid()))
            .await
    }

    async fn list_by_responder(
        &self,
        responder: &UserId,
    ) -> Result<Vec<ConsultationListing>, ConsultationPersistenceError> {
        self.list_where(ListingFilter::Responder(*responder.as_uuid()))
            .await
    }

    async fn try_claim(
        &self,
        id: &ConsultationId,
        doctor: &UserId,
    ) -> Result<bool, ConsultationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            consultations::table
                .filter(consultations::id.eq(id.as_uuid()))
                .filter(consultations::responder_id.is_null()),
        )
        .set(consultations::responder_id.eq(Some(*doctor.as_uuid())))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "claim consultation"))?;
        debug!(consultation_id = %id, updated, "claim update executed");
        Ok(updated == 1)
    }

    async fn record_message(
        &self,
        message: &ConsultationMessage,
    ) -> Result<(), ConsultationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = MessageRow::from(message);
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(consultation_messages::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                diesel::update(
                    consultations::table
                        .filter(consultations::id.eq(row.consultation_id))
                        .filter(consultations::responder_id.eq(row.author_id)),
                )
                .set(consultations::response.eq(Some(row.body.as_str())))
                .execute(conn)
                .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, "record chat message"))
    }

    async fn list_messages(
        &self,
        id: &ConsultationId,
    ) -> Result<Vec<ConsultationMessage>, ConsultationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MessageRow> = consultation_messages::table
            .filter(consultation_messages::consultation_id.eq(id.as_uuid()))
            .order(consultation_messages::seq.asc())
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list chat messages"))?;
        rows.into_iter()
            .map(|row| {
                ConsultationMessage::try_from(row).map_err(ConsultationPersistenceError::query)
            })
            .collect()
    }
}
