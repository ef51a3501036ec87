//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::time::Duration;

use crate::inbound::http::session_config::SessionSettings;

/// Everything the server needs besides the application state.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) remember_for: Duration,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Remembered logins last `remember_days`.
    #[must_use]
    pub fn new(session: SessionSettings, remember_days: u32, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            remember_for: Duration::days(i64::from(remember_days)),
            bind_addr,
        }
    }
}
