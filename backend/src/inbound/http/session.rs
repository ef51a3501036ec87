//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix session so handlers deal in domain terms: the signed-in
//! user's id and one-shot flash messages shown on the next page view.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const FLASHES_KEY: &str = "_flashes";

/// Severity attached to a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Info,
    Error,
}

/// One-shot message stored in the session until a page consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

fn session_error(action: &str, error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to {action} session: {error}"))
}

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the authenticated user's id, rotating the session first.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| session_error("persist", error))
    }

    /// Fetch the current user id, treating a tampered value as signed out.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let Some(raw) = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| session_error("read", error))?
        else {
            return Ok(None);
        };
        match UserId::new(raw) {
            Ok(id) => Ok(Some(id)),
            Err(error) => {
                tracing::warn!(%error, "invalid user id in session cookie");
                Ok(None)
            }
        }
    }

    /// Drop everything in the session and expire its cookie.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Queue a message for the next page view.
    pub fn push_flash(
        &self,
        category: FlashCategory,
        message: impl Into<String>,
    ) -> Result<(), Error> {
        let mut flashes = self.read_flashes()?;
        flashes.push(Flash {
            category,
            message: message.into(),
        });
        self.0
            .insert(FLASHES_KEY, flashes)
            .map_err(|error| session_error("persist", error))
    }

    /// Return and clear the queued messages.
    pub fn take_flashes(&self) -> Result<Vec<Flash>, Error> {
        let flashes = self.read_flashes()?;
        if !flashes.is_empty() {
            self.0.remove(FLASHES_KEY);
        }
        Ok(flashes)
    }

    fn read_flashes(&self) -> Result<Vec<Flash>, Error> {
        self.0
            .get::<Vec<Flash>>(FLASHES_KEY)
            .map(Option::unwrap_or_default)
            .map_err(|error| session_error("read", error))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    const USER: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route(
                "/set",
                web::get().to(|session: SessionContext| async move {
                    session.persist_user(&UserId::new(USER).expect("fixture id"))?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/get",
                web::get().to(|session: SessionContext| async move {
                    let id = session.user_id()?;
                    Ok::<_, Error>(
                        HttpResponse::Ok().body(id.map(|id| id.to_string()).unwrap_or_default()),
                    )
                }),
            )
            .route(
                "/flash",
                web::get().to(|session: SessionContext| async move {
                    session.push_flash(FlashCategory::Info, "first")?;
                    session.push_flash(FlashCategory::Error, "second")?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/take",
                web::get().to(|session: SessionContext| async move {
                    let flashes = session.take_flashes()?;
                    Ok::<_, Error>(HttpResponse::Ok().json(flashes))
                }),
            )
    }

    #[actix_web::test]
    async fn round_trips_user_id() {
        let app = test::init_service(session_test_app()).await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = session_cookie(&set_res).expect("session cookie set");

        let get_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        let body = test::read_body(get_res).await;
        assert_eq!(body, USER);
    }

    #[actix_web::test]
    async fn missing_user_reads_as_signed_out() {
        let app = test::init_service(session_test_app()).await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/get").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(test::read_body(res).await.is_empty());
    }

    #[actix_web::test]
    async fn tampered_user_id_reads_as_signed_out() {
        let app = test::init_service(session_test_app().route(
            "/set-invalid",
            web::get().to(|session: Session| async move {
                session
                    .insert(USER_ID_KEY, "not-a-uuid")
                    .expect("set invalid user id");
                HttpResponse::Ok()
            }),
        ))
        .await;

        let set_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = session_cookie(&set_res).expect("session cookie set");

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert!(test::read_body(res).await.is_empty());
    }

    #[actix_web::test]
    async fn flashes_are_consumed_once_in_order() {
        let app = test::init_service(session_test_app()).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/flash").to_request()).await;
        let cookie = session_cookie(&res).expect("session cookie set");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/take")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let cleared = session_cookie(&res).expect("session rewritten");
        let flashes: Vec<Flash> = test::read_body_json(res).await;
        let messages: Vec<&str> = flashes.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(flashes[1].category, FlashCategory::Error);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/take").cookie(cleared).to_request(),
        )
        .await;
        let flashes: Vec<Flash> = test::read_body_json(res).await;
        assert!(flashes.is_empty());
    }
}
