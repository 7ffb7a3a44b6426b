//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `ACCOUNTS_*` environment variables, an optional
//! configuration file, or matching CLI flags. Defaults are declared on the
//! fields so the service starts with no configuration at all; the accessors
//! validate what was loaded.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use rand::RngCore;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroizing;

use crate::outbound::password::DEFAULT_ITERATIONS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ISSUER: &str = "user-accounts";
const DEFAULT_TOKEN_TTL_MINUTES: u32 = 60;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const EPHEMERAL_SECRET_LEN: usize = 32;

fn default_bind_addr() -> String {
    String::from(DEFAULT_BIND_ADDR)
}

fn default_issuer() -> String {
    String::from(DEFAULT_ISSUER)
}

/// Configuration problems detected after loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    InvalidBindAddr { value: String, message: String },

    #[error("ACCOUNTS_JWT_SECRET must be set in release builds")]
    MissingJwtSecret,

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
}

#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACCOUNTS")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    #[ortho_config(default = default_bind_addr())]
    pub bind_addr: String,
    /// PostgreSQL URL. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// HMAC key for signing bearer tokens.
    pub jwt_secret: Option<String>,
    /// `iss` claim written to and required from tokens.
    #[ortho_config(default = default_issuer())]
    pub jwt_issuer: String,
    /// Token lifetime in minutes.
    #[ortho_config(default = DEFAULT_TOKEN_TTL_MINUTES)]
    pub token_ttl_minutes: u32,
    /// PBKDF2 rounds for new password digests.
    #[ortho_config(default = DEFAULT_ITERATIONS)]
    pub password_iterations: u32,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = DEFAULT_DB_MAX_CONNECTIONS)]
    pub db_max_connections: u32,
}

fn positive(value: u32, field: &'static str) -> Result<u32, SettingsError> {
    if value == 0 {
        return Err(SettingsError::NotPositive { field });
    }
    Ok(value)
}

impl AppSettings {
    /// Parsed bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
                value: self.bind_addr.clone(),
                message: err.to_string(),
            })
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn jwt_issuer(&self) -> &str {
        &self.jwt_issuer
    }

    pub fn token_ttl(&self) -> Result<chrono::Duration, SettingsError> {
        let minutes = positive(self.token_ttl_minutes, "token_ttl_minutes")?;
        Ok(chrono::Duration::minutes(i64::from(minutes)))
    }

    pub fn password_iterations(&self) -> Result<u32, SettingsError> {
        positive(self.password_iterations, "password_iterations")
    }

    pub fn db_max_connections(&self) -> Result<u32, SettingsError> {
        positive(self.db_max_connections, "db_max_connections")
    }

    /// Token signing key.
    ///
    /// Debug builds fall back to a random per-process key, so tokens do not
    /// survive a restart. Release builds refuse to start without one.
    pub fn jwt_secret(&self) -> Result<Zeroizing<Vec<u8>>, SettingsError> {
        self.resolve_secret(cfg!(debug_assertions))
    }

    fn resolve_secret(&self, allow_ephemeral: bool) -> Result<Zeroizing<Vec<u8>>, SettingsError> {
        match self.jwt_secret.as_deref().filter(|secret| !secret.is_empty()) {
            Some(secret) => Ok(Zeroizing::new(secret.as_bytes().to_vec())),
            None if allow_ephemeral => {
                warn!("ACCOUNTS_JWT_SECRET unset; using an ephemeral signing key (dev only)");
                let mut key = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
                rand::thread_rng().fill_bytes(key.as_mut_slice());
                Ok(key)
            }
            None => Err(SettingsError::MissingJwtSecret),
        }
    }
}
