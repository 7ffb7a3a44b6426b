//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use accounts::outbound::persistence::DbPool;
use accounts::settings::{AppSettings, SettingsError};
use zeroize::Zeroizing;

/// Token codec parameters resolved from settings.
pub struct TokenConfig {
    pub(crate) secret: Zeroizing<Vec<u8>>,
    pub(crate) issuer: String,
    pub(crate) ttl: chrono::Duration,
}

/// Everything `create_server` needs, resolved up front so bad settings
/// fail before the socket is bound.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) tokens: TokenConfig,
    pub(crate) password_iterations: u32,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Resolve settings into a configuration without a database pool.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for an unparsable bind address, a zero
    /// numeric setting, or a missing signing key in release builds.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            tokens: TokenConfig {
                secret: settings.jwt_secret()?,
                issuer: settings.jwt_issuer().to_owned(),
                ttl: settings.token_ttl()?,
            },
            password_iterations: settings.password_iterations()?,
            db_pool: None,
        })
    }

    /// Back the credential store with PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
