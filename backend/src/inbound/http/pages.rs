//! Page view models.
//!
//! Every page answers with the same envelope: a title, the flash messages
//! queued for this view (consumed on read), the signed-in user and the
//! page-specific content. Successful form posts answer `303 See Other`.

use actix_web::HttpResponse;
use actix_web::http::header::{CACHE_CONTROL, LOCATION};
use serde::Serialize;

use crate::domain::User;

use super::ApiResult;
use super::session::{Flash, SessionContext};

/// Landing page after login, logout and consultation submission.
pub const HOME_PATH: &str = "/index";
/// Login form.
pub const LOGIN_PATH: &str = "/login";

/// Pages mix per-user content and flashes, so caches must never keep them.
const PAGE_CACHE_CONTROL: &str = "private, no-store";

/// Envelope shared by every page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub title: &'static str,
    pub flashes: Vec<Flash>,
    pub current_user: Option<User>,
    pub content: T,
}

/// Render `content` as a page, draining the session's flashes.
pub fn render<T: Serialize>(
    session: &SessionContext,
    title: &'static str,
    current_user: Option<User>,
    content: T,
) -> ApiResult<HttpResponse> {
    let page = Page {
        title,
        flashes: session.take_flashes()?,
        current_user,
        content,
    };
    Ok(HttpResponse::Ok()
        .insert_header((CACHE_CONTROL, PAGE_CACHE_CONTROL))
        .json(page))
}

/// `303 See Other` to `location`.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use medlink::inbound::http::pages::see_other;
///
/// let response = see_other("/index");
/// assert_eq!(response.status(), StatusCode::SEE_OTHER);
/// ```
pub fn see_other(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location.as_ref()))
        .finish()
}
