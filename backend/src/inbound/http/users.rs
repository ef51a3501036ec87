//! Account pages: sign in, sign out, registration and the profile.
//!
//! ```text
//! GET  /login                 form view (redirects home when signed in)
//! POST /login?next=/profile   username=alice&password=...&remember_me=y
//! GET  /logout
//! GET  /register
//! POST /register              username=...&email=...&password=...&password2=...&role=doctor
//! GET  /profile
//! ```

use actix_web::{HttpMessage, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, ErrorCode, FieldErrors, LoginCredentials, Registration, RegistrationForm,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, CurrentUser, login_url, safe_next};
use crate::inbound::http::pages::{HOME_PATH, LOGIN_PATH, render, see_other};
use crate::inbound::http::session::{FlashCategory, SessionContext};
use crate::inbound::http::state::HttpState;
use crate::middleware::{ForgetLogin, RememberLogin};

/// Flash queued after a successful registration.
pub const REGISTERED_MESSAGE: &str = "Congratulations, you are now a registered user!";

/// Form posted to `POST /login`. Missing fields arrive as empty strings so
/// they fail validation with a field message rather than a parse error.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Any value other than an explicit "off" spelling ticks the box.
    #[serde(default)]
    pub remember_me: Option<String>,
}

impl LoginForm {
    fn remember(&self) -> bool {
        self.remember_me.as_deref().is_some_and(|value| {
            !matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "" | "0" | "n" | "no" | "off" | "false"
            )
        })
    }
}

/// Form posted to `POST /register`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
    /// `military` or `doctor`.
    #[serde(default)]
    pub role: String,
}

/// Redirect target after login.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Content of the form pages: where the form posts and what it asks for.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub action: String,
    pub fields: &'static [&'static str],
}

const LOGIN_FIELDS: &[&str] = &["username", "password", "remember_me"];
const REGISTER_FIELDS: &[&str] = &["username", "email", "password", "password2", "role"];

/// Sign-in form.
#[utoipa::path(
    get,
    path = "/login",
    params(NextQuery),
    responses(
        (status = 200, description = "Sign-in page view model"),
        (status = 303, description = "Already signed in; redirect home")
    ),
    tags = ["users"],
    operation_id = "loginForm",
    security([])
)]
#[get("/login")]
pub async fn login_form(
    session: SessionContext,
    current: CurrentUser,
    query: web::Query<NextQuery>,
) -> ApiResult<HttpResponse> {
    if current.0.is_some() {
        return Ok(see_other(HOME_PATH));
    }
    let action = match query.next.as_deref() {
        Some(next) => login_url(next),
        None => LOGIN_PATH.to_owned(),
    };
    render(
        &session,
        "Sign In",
        None,
        FormView {
            action,
            fields: LOGIN_FIELDS,
        },
    )
}

/// Authenticate and start a session.
///
/// Wrong credentials never say which half was wrong: the user gets one
/// generic flash and is sent back to the form.
#[utoipa::path(
    post,
    path = "/login",
    params(NextQuery),
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in (redirect to `next` or home), or rejected (redirect to the form)", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Blank username or password", body = Error),
        (status = 503, description = "User store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    current: CurrentUser,
    query: web::Query<NextQuery>,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    if current.0.is_some() {
        return Ok(see_other(HOME_PATH));
    }
    let form = form.into_inner();
    let credentials = LoginCredentials::try_from_parts(&form.username, &form.password)
        .map_err(|err| Error::from(FieldErrors::from(err)))?;

    let user = match state.login.authenticate(&credentials).await {
        Ok(user) => user,
        Err(error) if error.code() == ErrorCode::Unauthorized => {
            session.push_flash(FlashCategory::Error, error.message())?;
            return Ok(see_other(LOGIN_PATH));
        }
        Err(error) => return Err(error),
    };

    session.persist_user(user.id())?;
    let mut response = see_other(safe_next(query.next.as_deref()));
    if form.remember() {
        response.extensions_mut().insert(RememberLogin);
    } else {
        response.extensions_mut().insert(ForgetLogin);
    }
    Ok(response)
}

/// End the session. Signed-out visitors are simply redirected.
#[utoipa::path(
    get,
    path = "/logout",
    responses((status = 303, description = "Session cleared; redirect home")),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[get("/logout")]
pub async fn logout(session: SessionContext, current: CurrentUser) -> HttpResponse {
    if let Some(user) = current.0 {
        info!(user_id = %user.id(), "logout");
    }
    session.purge();
    let mut response = see_other(HOME_PATH);
    response.extensions_mut().insert(ForgetLogin);
    response
}

/// Registration form.
#[utoipa::path(
    get,
    path = "/register",
    responses(
        (status = 200, description = "Registration page view model"),
        (status = 303, description = "Already signed in; redirect home")
    ),
    tags = ["users"],
    operation_id = "registerForm",
    security([])
)]
#[get("/register")]
pub async fn register_form(session: SessionContext, current: CurrentUser) -> ApiResult<HttpResponse> {
    if current.0.is_some() {
        return Ok(see_other(HOME_PATH));
    }
    render(
        &session,
        "Register",
        None,
        FormView {
            action: "/register".to_owned(),
            fields: REGISTER_FIELDS,
        },
    )
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/register",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created; redirect to the sign-in form"),
        (status = 400, description = "One entry per failing field in `details.fields`", body = Error),
        (status = 503, description = "User store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    current: CurrentUser,
    form: web::Form<RegisterForm>,
) -> ApiResult<HttpResponse> {
    if current.0.is_some() {
        return Ok(see_other(HOME_PATH));
    }
    let submitted = Registration::validate(RegistrationForm {
        username: &form.username,
        email: &form.email,
        password: &form.password,
        password2: &form.password2,
        role: &form.role,
    });
    let registration = match submitted {
        Ok(registration) => registration,
        Err(rejected) => {
            let mut errors = rejected.errors;
            errors.append(state.registration.taken_fields(&rejected.identity).await?);
            return Err(errors.into());
        }
    };
    state.registration.register(registration).await?;
    session.push_flash(FlashCategory::Info, REGISTERED_MESSAGE)?;
    Ok(see_other(LOGIN_PATH))
}

/// The signed-in user with the consultations they asked and answer.
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Profile page view model"),
        (status = 303, description = "Not signed in; redirect to the sign-in form")
    ),
    tags = ["users"],
    operation_id = "profile"
)]
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let AuthenticatedUser(user) = user;
    let view = state.users.fetch_profile(&user).await?;
    render(&session, "Profile", Some(user), view)
}
