//! Clinic user directory entry-point: loads settings, migrates the schema,
//! and serves the REST API.

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use clinic_users::inbound::http::health::HealthState;
use clinic_users::inbound::http::session_config::{BuildMode, session_settings_from_env};
use clinic_users::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(io::Error::other)?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;

    let database_url = settings.database.database_url().map_err(io::Error::other)?;
    let migration_url = database_url.clone();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
        .await
        .map_err(io::Error::other)?
        .map_err(io::Error::other)?;
    info!(applied, "database schema up to date");

    let pool_config =
        PoolConfig::new(database_url).with_max_size(settings.database.max_connections());
    info!(database = %pool_config.redacted_url(), "connecting to database");
    let pool = DbPool::new(pool_config).await.map_err(io::Error::other)?;

    let bind_addr = settings.http.bind_addr().map_err(io::Error::other)?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        ServerConfig::new(session, bind_addr, pool),
    )?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
