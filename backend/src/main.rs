//! Service entry-point: loads settings, prepares the credential store and
//! serves the account endpoints.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use accounts::inbound::http::health::HealthState;
use accounts::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use accounts::settings::AppSettings;
use server::{ServerConfig, create_server};

async fn attach_database(config: ServerConfig, settings: &AppSettings) -> Result<ServerConfig> {
    let Some(url) = settings.database_url() else {
        warn!("ACCOUNTS_DATABASE_URL unset; users are kept in memory only");
        return Ok(config);
    };

    run_migrations(url)
        .await
        .wrap_err("failed to migrate the database schema")?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_max_connections()?))
        .await
        .wrap_err("failed to build the database pool")?;
    Ok(config.with_db_pool(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let config = ServerConfig::from_settings(&settings)?;
    let config = attach_database(config, &settings).await?;
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "accounts service listening");

    let handle = server.handle();
    actix_web::rt::spawn(async move {
        if actix_web::rt::signal::ctrl_c().await.is_ok() {
            health_state.mark_draining();
            handle.stop(true).await;
        }
    });

    server.await?;
    Ok(())
}
