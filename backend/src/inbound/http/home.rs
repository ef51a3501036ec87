//! Home page.

use actix_web::HttpResponse;
use serde::Serialize;

use crate::domain::Role;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::pages::render;
use crate::inbound::http::session::SessionContext;

/// Navigation offered on the home page, by role.
#[derive(Debug, Serialize)]
pub struct HomeView {
    pub links: Vec<&'static str>,
}

impl HomeView {
    fn for_role(role: Role) -> Self {
        let workflow = match role {
            Role::Military => "/consultation_request",
            Role::Doctor => "/consultations",
        };
        Self {
            links: vec![workflow, "/profile", "/logout"],
        }
    }
}

/// Home page for the signed-in user. Served on `/` and `/index`.
#[utoipa::path(
    get,
    path = "/index",
    responses(
        (status = 200, description = "Home page view model"),
        (status = 303, description = "Not signed in; redirect to the sign-in form")
    ),
    tags = ["pages"],
    operation_id = "home"
)]
pub async fn index(session: SessionContext, user: AuthenticatedUser) -> ApiResult<HttpResponse> {
    let AuthenticatedUser(user) = user;
    let view = HomeView::for_role(user.role());
    render(&session, "Home", Some(user), view)
}
