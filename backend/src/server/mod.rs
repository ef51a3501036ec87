//! Server construction and middleware wiring.

mod config;
pub mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::{AppSettings, SettingsError};
pub use state_builders::build_http_state;

use actix_web::cookie::time::Duration;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::configure;
use crate::inbound::http::health::HealthState;
use crate::inbound::http::session_config::{SESSION_COOKIE_NAME, SessionSettings};
use crate::inbound::http::state::HttpState;
use crate::middleware::{RememberMe, Trace};

/// Shared pieces each worker's `App` is built from.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub session: SessionSettings,
    pub remember_for: Duration,
}

/// Assemble the application: routes, state and middleware.
///
/// Middleware order, outermost first: trace id, remember-me, session.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
        remember_for,
    } = deps;

    let remember = RememberMe::new(SESSION_COOKIE_NAME, remember_for)
        .with_cookie_attributes(session.cookie_secure, session.same_site);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(session.middleware())
        .wrap(remember)
        .wrap(Trace)
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    app
}

/// Bind and start the HTTP server; the returned [`Server`] must be awaited.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        session,
        remember_for,
        bind_addr,
    } = config;
    let deps = AppDependencies {
        health_state,
        http_state: web::Data::new(http_state),
        session,
        remember_for,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();
    Ok(server)
}
