//! Backend entry-point: loads settings, migrates the database and serves the
//! REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use contactbook::inbound::http::health::HealthState;
use contactbook::outbound::persistence::{
    DbPool, DieselConnectivityProbe, PoolConfig, run_pending_migrations,
};
use contactbook::settings::Settings;
use server::{ServerConfig, build_diesel_http_state, create_server};

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

    let settings = Settings::load().wrap_err("failed to load settings")?;
    let database_url = settings.database_url()?;

    run_pending_migrations(&database_url)
        .await
        .wrap_err("failed to apply migrations")?;
    let pool = DbPool::new(
        PoolConfig::new(database_url.as_str()).with_max_size(settings.pool_max_size()),
    )
    .await
    .wrap_err("failed to build database pool")?;

    let http_state = build_diesel_http_state(&settings, &pool, Arc::new(DefaultClock))?;
    let health_state = web::Data::new(HealthState::new(Arc::new(DieselConnectivityProbe::new(
        pool,
    ))));

    let config = ServerConfig::new(settings.bind_addr()?, http_state);
    info!(addr = %config.bind_addr(), "starting http server");
    create_server(health_state, config)?.await?;
    Ok(())
}
