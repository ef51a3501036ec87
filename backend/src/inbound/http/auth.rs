//! Authentication extractors used by HTTP handlers.
//!
//! [`CurrentUser`] resolves the session's user id against the user store;
//! [`AuthenticatedUser`] additionally insists on a signed-in user and
//! otherwise redirects the browser to the login page with a `next`
//! parameter pointing back at the original path.

use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::warn;
use url::{Url, form_urlencoded};

use crate::domain::{Error, User};

use super::pages::{HOME_PATH, LOGIN_PATH};
use super::session::{FlashCategory, SessionContext};
use super::state::HttpState;

/// Flash shown when a protected page bounces to the login form.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";

const LOCAL_ORIGIN: &str = "http://medlink.invalid/";

/// The signed-in user, if any.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

/// A signed-in user; extraction fails with [`LoginRequired`] otherwise.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Redirect (`303 See Other`) to the login form.
#[derive(Debug, thiserror::Error)]
#[error("login required for {next}")]
pub struct LoginRequired {
    next: String,
}

impl LoginRequired {
    /// Send the user back to `next` after they sign in.
    pub fn new(next: impl Into<String>) -> Self {
        Self { next: next.into() }
    }

    /// Target of the redirect, e.g. `/login?next=%2Fprofile`.
    pub fn location(&self) -> String {
        login_url(&self.next)
    }
}

impl ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header((LOCATION, self.location()))
            .finish()
    }
}

/// Login page URL carrying `next` as a query parameter.
///
/// # Examples
/// ```
/// use medlink::inbound::http::auth::login_url;
///
/// assert_eq!(login_url("/chat/1?x=2"), "/login?next=%2Fchat%2F1%3Fx%3D2");
/// ```
pub fn login_url(next: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

/// Redirect target after login: `candidate` when it is a same-site relative
/// path, the home page otherwise.
///
/// # Examples
/// ```
/// use medlink::inbound::http::auth::safe_next;
///
/// assert_eq!(safe_next(Some("/profile")), "/profile");
/// assert_eq!(safe_next(Some("https://evil.example/")), "/index");
/// assert_eq!(safe_next(Some("//evil.example/")), "/index");
/// assert_eq!(safe_next(None), "/index");
/// ```
pub fn safe_next(candidate: Option<&str>) -> String {
    candidate
        .filter(|path| is_local_path(path))
        .map_or_else(|| HOME_PATH.to_owned(), str::to_owned)
}

fn is_local_path(candidate: &str) -> bool {
    if !candidate.starts_with('/')
        || candidate.starts_with("//")
        || candidate.contains('\\')
        || candidate.chars().any(char::is_control)
    {
        return false;
    }
    let Ok(base) = Url::parse(LOCAL_ORIGIN) else {
        return false;
    };
    base.join(candidate)
        .is_ok_and(|joined| joined.origin() == base.origin())
}

fn requested_path(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned())
}

async fn resolve_user(session: &SessionContext, state: &HttpState) -> Result<Option<User>, Error> {
    let Some(user_id) = session.user_id()? else {
        return Ok(None);
    };
    let user = state.users.find_user(&user_id).await?;
    if user.is_none() {
        warn!(%user_id, "session refers to an unknown user; signing out");
        session.purge();
    }
    Ok(user)
}

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = SessionContext::from_request(req, payload);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let session = session.await?;
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let user = resolve_user(&session, &state).await?;
            Ok(Self(user))
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let current = CurrentUser::from_request(req, payload);
        let session = SessionContext::from_request(req, payload);
        let next = requested_path(req);
        Box::pin(async move {
            if let CurrentUser(Some(user)) = current.await? {
                return Ok(Self(user));
            }
            session
                .await?
                .push_flash(FlashCategory::Info, LOGIN_REQUIRED_MESSAGE)?;
            Err(LoginRequired::new(next).into())
        })
    }
}
