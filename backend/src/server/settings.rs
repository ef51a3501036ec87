//! Process settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `APP_*` environment variables over an optional
//! configuration file.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `APP_DATABASE_URL` (or `--database-url`) is required.
    #[error("database url is not configured; set APP_DATABASE_URL")]
    MissingDatabaseUrl,
    /// The bind address does not parse as `host:port`.
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// A zero remember duration would make "remember me" meaningless.
    #[error("remember_days must be at least 1")]
    ZeroRememberDays,
}

/// Application settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APP")]
pub struct AppSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Lifetime of a remembered login, in days.
    #[ortho_config(default = 30)]
    pub remember_days: u32,
    /// Maximum number of pooled database connections.
    pub pool_size: Option<u32>,
}

impl AppSettings {
    /// Connection string, which has no default.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Listen address, `0.0.0.0:8080` unless configured.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Remembered-login lifetime in days, 30 unless configured.
    pub fn remember_days(&self) -> Result<u32, SettingsError> {
        match self.remember_days {
            0 => Err(SettingsError::ZeroRememberDays),
            days => Ok(days),
        }
    }

    /// Pool size, 10 unless configured.
    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE).max(1)
    }
}
