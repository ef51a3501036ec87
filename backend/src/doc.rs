//! OpenAPI documentation.
//!
//! [`ApiDoc`] lists every page, form and probe route together with the page
//! content and error schemas. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{ChatView, ConsultationListing, UserProfile};
use crate::domain::{Consultation, ConsultationMessage, Error, ErrorCode, Role, User};
use crate::inbound::http::consultations::{ChatForm, ConsultationForm};
use crate::inbound::http::session::{Flash, FlashCategory};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::users::{LoginForm, RegisterForm};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE_NAME,
                "Private session cookie issued by POST /login.",
            ))),
        );
    }
}

/// OpenAPI document for the page and form routes.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Medlink consultation service",
        description = "Session-authenticated pages through which military users ask doctors for consultations."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::home::index,
        crate::inbound::http::users::login_form,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::register_form,
        crate::inbound::http::users::register,
        crate::inbound::http::users::profile,
        crate::inbound::http::consultations::consultation_form,
        crate::inbound::http::consultations::submit_consultation,
        crate::inbound::http::consultations::queue,
        crate::inbound::http::consultations::chat,
        crate::inbound::http::consultations::respond,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Role,
        Consultation,
        ConsultationListing,
        ConsultationMessage,
        ChatView,
        UserProfile,
        Flash,
        FlashCategory,
        LoginForm,
        RegisterForm,
        ConsultationForm,
        ChatForm,
    )),
    tags(
        (name = "pages", description = "Home page"),
        (name = "users", description = "Sign in, sign out, registration and profile"),
        (name = "consultations", description = "Consultation requests, the doctors' queue and chat"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;
