//! Service entry point: settings, migrations, pool, services, HTTP server.

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use medlink::inbound::http::health::HealthState;
use medlink::inbound::http::session_config::fingerprint::key_fingerprint;
use medlink::inbound::http::session_config::{BuildMode, session_settings_from_env};
use medlink::outbound::persistence::{DbPool, PoolConfig, migrate};
use medlink::server::{AppSettings, ServerConfig, build_http_state, create_server};

fn startup_error(context: &str, error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {error}"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| startup_error("failed to load settings", e))?;
    let database_url = settings
        .database_url()
        .map_err(|e| startup_error("invalid settings", e))?
        .to_owned();
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| startup_error("invalid settings", e))?;
    let remember_days = settings
        .remember_days()
        .map_err(|e| startup_error("invalid settings", e))?;

    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| startup_error("invalid session configuration", e))?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    migrate(database_url.clone())
        .await
        .map_err(|e| startup_error("database migration failed", e))?;
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_size()))
        .await
        .map_err(|e| startup_error("database pool unavailable", e))?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        build_http_state(&pool),
        ServerConfig::new(session, remember_days, bind_addr),
    )?;
    health_state.mark_ready();
    info!(%bind_addr, remember_days, "server started");

    let handle = server.handle();
    let draining = health_state.clone();
    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            draining.mark_unhealthy();
            info!("shutdown requested; draining");
            handle.stop(true).await;
        }
    });

    server.await
}
