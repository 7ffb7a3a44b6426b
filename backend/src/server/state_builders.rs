//! Assemble the driven adapters and the account service behind `HttpState`.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use accounts::domain::AccountsService;
use accounts::domain::ports::{CredentialStore, UserAccounts};
use accounts::inbound::http::state::HttpState;
use accounts::outbound::persistence::DieselCredentialStore;
use accounts::outbound::{InMemoryCredentialStore, JwtTokenCodec, Pbkdf2PasswordHasher};

use super::ServerConfig;

fn build_store(config: &ServerConfig, clock: &Arc<dyn Clock>) -> Arc<dyn CredentialStore> {
    match &config.db_pool {
        Some(pool) => {
            info!(store = "postgres", "credential store selected");
            Arc::new(DieselCredentialStore::new(pool.clone(), Arc::clone(clock)))
        }
        None => {
            info!(store = "memory", "credential store selected");
            Arc::new(InMemoryCredentialStore::new(Arc::clone(clock)))
        }
    }
}

/// Build the shared handler state from resolved configuration.
pub fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let store = build_store(config, &clock);
    let tokens = Arc::new(JwtTokenCodec::new(
        config.tokens.secret.as_slice(),
        config.tokens.issuer.clone(),
        config.tokens.ttl,
        clock,
    ));
    let hasher = Arc::new(Pbkdf2PasswordHasher::new(config.password_iterations));

    let accounts: Arc<dyn UserAccounts> = Arc::new(AccountsService::new(store, tokens, hasher));
    web::Data::new(HttpState::new(accounts))
}
