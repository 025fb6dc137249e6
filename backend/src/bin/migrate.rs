//! Apply the embedded schema migrations and exit.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;

use clap::Parser;
use subscriber_api::outbound::persistence::run_pending_migrations;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const DATABASE_URL_ENV: &str = "SUBSCRIBER_DATABASE_URL";

/// `migrate` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "migrate",
    about = "Apply pending subscriber-api schema migrations",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `SUBSCRIBER_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn resolve_database_url(args: CliArgs, fallback: Option<String>) -> io::Result<String> {
    args.database_url
        .or(fallback)
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("pass --database-url or set {DATABASE_URL_ENV}"),
            )
        })
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args, env::var(DATABASE_URL_ENV).ok())?;
    let applied = run_pending_migrations(&database_url).map_err(io::Error::other)?;
    info!(count = applied.len(), "migrations complete");
    for version in applied {
        println!("{version}");
    }
    Ok(())
}
