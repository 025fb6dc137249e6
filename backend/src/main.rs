//! Server entry-point: loads settings, prepares storage and billing adapters,
//! and runs the HTTP server.

mod server;

use std::ffi::OsString;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use subscriber_api::inbound::http::health::HealthState;
use subscriber_api::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations_async};
use subscriber_api::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let stripe = settings.stripe().map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(bind_addr)
        .with_request_timeout(settings.request_timeout())
        .with_stripe(stripe);

    if let Some(database_url) = settings.database_url() {
        if settings.skip_migrations {
            info!("skipping schema migrations");
        } else {
            run_pending_migrations_async(database_url.to_owned())
                .await
                .map_err(std::io::Error::other)?;
        }
        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.pool_max_size()),
        )
        .await
        .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    } else {
        warn!("SUBSCRIBER_DATABASE_URL is not set; running without persistence");
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(prometheus::Registry::new());
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "server listening");
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
