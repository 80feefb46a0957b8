//! Portfolio backend HTTP server.
//!
//! Serves the account, authentication and user administration API backed by
//! PostgreSQL, or by an in-memory store for local development.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use pf_server::{api, config::ServerConfig, logging};
use pico_args::Arguments;
use portfolio::{
    SystemClock,
    db::{CredentialStore, Database, MemoryCredentialStore, PgCredentialStore},
};
use tracing::{info, warn};

const HELP: &str = "\
Run the portfolio backend server

USAGE:
  pf_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --memory                 Keep accounts in memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SECRET_KEY               JWT signing secret (required)
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8000)
  DATABASE_URL             PostgreSQL connection string
  FRONTEND_URL             Allowed CORS origin
  ADMIN_EMAIL              Bootstrap administrator email
  ADMIN_PASSWORD           Bootstrap administrator password
  (See .env.example for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let bind: Option<SocketAddr> = pargs
        .opt_value_from_str("--bind")
        .context("Invalid --bind address")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;
    let memory = pargs.contains("--memory");

    logging::init();

    let config = ServerConfig::from_env(bind, database_url, memory)?;
    info!("Starting portfolio server at {}", config.bind);

    let store: Arc<dyn CredentialStore> = if config.memory {
        warn!("Using in-memory credential store, accounts are lost on shutdown");
        Arc::new(MemoryCredentialStore::new())
    } else {
        let db = Database::new(&config.database)
            .await
            .context("Failed to connect to database")?;
        info!("Database connected successfully");
        Arc::new(PgCredentialStore::new(db.pool().clone()))
    };

    let state = api::AppState::new(
        store,
        &config.auth,
        Arc::new(SystemClock),
        config.rate_limits,
    );

    if let Some(admin) = &config.admin {
        let provisioned = state
            .user_manager
            .ensure_admin(
                &admin.email,
                &admin.password,
                admin.name.as_deref(),
                state.auth_manager.hasher(),
            )
            .await
            .context("Failed to provision administrator")?;

        if provisioned.is_none() {
            info!("Administrator already present, skipping bootstrap");
        }
    }

    let app = api::create_router(state, &config.frontend_url);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
