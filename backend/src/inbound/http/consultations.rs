//! Consultation pages: submission, the doctors' queue and the chat.
//!
//! ```text
//! GET  /consultation_request
//! POST /consultation_request   body=need+help
//! GET  /consultations          doctors only
//! GET  /chat/{id}              views, and for a doctor on an open request, claims
//! POST /chat/{id}              response=see+a+specialist
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::ports::ChatView;
use crate::domain::{
    ConsultationBody, ConsultationId, ConsultationValidationError, Error, ErrorCode, FieldErrors,
    ResponseText,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::pages::{HOME_PATH, render, see_other};
use crate::inbound::http::session::{FlashCategory, SessionContext};
use crate::inbound::http::state::HttpState;

/// Flash queued after a consultation is stored.
pub const SUBMITTED_MESSAGE: &str = "Your consultation request has been submitted.";

/// Form posted to `POST /consultation_request`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ConsultationForm {
    #[serde(default)]
    pub body: String,
}

/// Form posted to `POST /chat/{id}`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ChatForm {
    #[serde(default)]
    pub response: String,
}

/// Content of the submission page.
#[derive(Debug, Serialize)]
pub struct RequestView {
    pub action: &'static str,
    pub fields: &'static [&'static str],
}

fn field_error(field: &'static str, error: &ConsultationValidationError) -> Error {
    let mut errors = FieldErrors::new();
    errors.push(field, error.code(), error.to_string());
    errors.into()
}

fn parse_id(raw: &str) -> Result<ConsultationId, Error> {
    ConsultationId::new(raw).map_err(|_| Error::not_found("consultation not found"))
}

/// Consultation submission form.
#[utoipa::path(
    get,
    path = "/consultation_request",
    responses(
        (status = 200, description = "Submission page view model"),
        (status = 303, description = "Not signed in; redirect to the sign-in form")
    ),
    tags = ["consultations"],
    operation_id = "consultationForm"
)]
#[get("/consultation_request")]
pub async fn consultation_form(
    session: SessionContext,
    user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    render(
        &session,
        "Consultation Request",
        Some(user.0),
        RequestView {
            action: "/consultation_request",
            fields: &["body"],
        },
    )
}

/// Submit a consultation request.
#[utoipa::path(
    post,
    path = "/consultation_request",
    request_body(content = ConsultationForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Stored; redirect home with a confirmation flash"),
        (status = 400, description = "Blank or over-long body", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["consultations"],
    operation_id = "submitConsultation"
)]
#[post("/consultation_request")]
pub async fn submit_consultation(
    state: web::Data<HttpState>,
    session: SessionContext,
    user: AuthenticatedUser,
    form: web::Form<ConsultationForm>,
) -> ApiResult<HttpResponse> {
    let body = ConsultationBody::new(&form.body).map_err(|err| field_error("body", &err))?;
    state.consultations.submit(&user.0, body).await?;
    session.push_flash(FlashCategory::Info, SUBMITTED_MESSAGE)?;
    Ok(see_other(HOME_PATH))
}

/// Unassigned consultations, oldest first. Non-doctors are sent home.
#[utoipa::path(
    get,
    path = "/consultations",
    responses(
        (status = 200, description = "Queue page view model"),
        (status = 303, description = "Not a doctor (redirect home) or not signed in")
    ),
    tags = ["consultations"],
    operation_id = "consultationQueue"
)]
#[get("/consultations")]
pub async fn queue(
    state: web::Data<HttpState>,
    session: SessionContext,
    user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let AuthenticatedUser(user) = user;
    match state.consultations_query.list_open(&user).await {
        Ok(open) => render(&session, "Consultations", Some(user), open),
        Err(error) if error.code() == ErrorCode::Forbidden => {
            debug!(user_id = %user.id(), "queue requested by non-doctor");
            Ok(see_other(HOME_PATH))
        }
        Err(error) => Err(error),
    }
}

/// Chat page. A doctor opening an unassigned consultation claims it.
#[utoipa::path(
    get,
    path = "/chat/{id}",
    params(("id" = String, Path, description = "Consultation id")),
    responses(
        (status = 200, description = "Chat page view model", body = ChatView),
        (status = 303, description = "Not signed in; redirect to the sign-in form"),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "No such consultation", body = Error),
        (status = 409, description = "Lost a claim race", body = Error)
    ),
    tags = ["consultations"],
    operation_id = "openChat"
)]
#[get("/chat/{id}")]
pub async fn chat(
    state: web::Data<HttpState>,
    session: SessionContext,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path)?;
    let AuthenticatedUser(user) = user;
    let view = state.consultations.open_chat(&user, &id).await?;
    render(&session, "Chat", Some(user), view)
}

/// Post to the chat. The assigned doctor's post becomes the response.
///
/// Access is checked (and an open request claimed) before the text is
/// validated, so a rejected post still leaves the claim in place.
#[utoipa::path(
    post,
    path = "/chat/{id}",
    params(("id" = String, Path, description = "Consultation id")),
    request_body(content = ChatForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Posted; redirect back to the chat"),
        (status = 400, description = "Blank or over-long text", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "No such consultation", body = Error)
    ),
    tags = ["consultations"],
    operation_id = "respond"
)]
#[post("/chat/{id}")]
pub async fn respond(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    form: web::Form<ChatForm>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path)?;
    let AuthenticatedUser(user) = user;
    match ResponseText::new(&form.response) {
        Ok(text) => {
            state.consultations.respond(&user, &id, text).await?;
            Ok(see_other(format!("/chat/{id}")))
        }
        Err(error) => {
            state.consultations.open_chat(&user, &id).await?;
            Err(field_error("response", &error))
        }
    }
}

#[cfg(test)]
mod tests;
