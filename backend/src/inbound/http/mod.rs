//! HTTP inbound adapter: page handlers, sessions and error mapping.

use actix_web::web;

use crate::domain::Error;

pub mod auth;
pub mod consultations;
pub mod error;
pub mod health;
pub mod home;
pub mod pages;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

/// Register every page and probe route.
///
/// Expects `web::Data<HttpState>` and `web::Data<HealthState>` in app data
/// and a session middleware around the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed form submission: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|_err, _req| {
        Error::not_found("page not found").into()
    }))
    .service(web::resource(["/", "/index"]).route(web::get().to(home::index)))
    .service(users::login_form)
    .service(users::login)
    .service(users::logout)
    .service(users::register_form)
    .service(users::register)
    .service(users::profile)
    .service(consultations::consultation_form)
    .service(consultations::submit_consultation)
    .service(consultations::queue)
    .service(consultations::chat)
    .service(consultations::respond)
    .service(health::ready)
    .service(health::live);
}
