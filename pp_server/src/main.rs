//! Planning poker server.
//!
//! Serves the room and player directories over HTTP and pushes live room views
//! over WebSocket, backed by either an in-memory or a PostgreSQL store.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Error};
use log::{info, warn};
use pico_args::Arguments;
use planning_poker::{
    MemoryStore, PgStore, Store,
    db::{Database, DatabaseConfig},
};
use pp_server::{
    api,
    config::{ConfigOverrides, ServerConfig, StoreBackend},
    logging, metrics,
};

const HELP: &str = "\
Run a planning poker server

USAGE:
  pp_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT    Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --store         BACKEND    memory or postgres           [default: env STORE_BACKEND, postgres when DATABASE_URL is set]
  --db-url        URL        Database connection string   [default: env DATABASE_URL]
  --metrics-bind  IP:PORT    Prometheus exporter address  [default: env METRICS_BIND, disabled when unset]

FLAGS:
  -h, --help                 Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  STORE_BACKEND            memory | postgres
  DATABASE_URL             PostgreSQL connection string
  DB_MAX_CONNECTIONS       Pool size (and DB_MIN_CONNECTIONS, DB_CONNECTION_TIMEOUT, ...)
  METRICS_BIND             Prometheus exporter bind address
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = ConfigOverrides {
        bind: pargs.opt_value_from_str::<_, SocketAddr>("--bind")?,
        store_backend: pargs.opt_value_from_str::<_, StoreBackend>("--store")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        metrics_bind: pargs.opt_value_from_str::<_, SocketAddr>("--metrics-bind")?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {:?}", remaining);
    }

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;

    logging::init();
    info!(
        "Starting planning poker server at {} ({} store)",
        config.bind, config.store_backend
    );

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        info!("Prometheus metrics exported at http://{}/metrics", addr);
    }

    let store = open_store(&config).await?;
    let app = api::create_router(api::AppState::new(store));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

/// Build the configured store.
async fn open_store(config: &ServerConfig) -> Result<Arc<dyn Store>, Error> {
    match config.store_backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory store; rooms are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let db_config: &DatabaseConfig = config
                .database
                .as_ref()
                .context("DATABASE_URL is required for the postgres store")?;

            let db = Database::new(db_config)
                .await
                .context("Failed to connect to database")?;
            info!("Database connected successfully");

            let store = PgStore::new(db.pool().clone())
                .await
                .context("Failed to prepare database schema")?;
            Ok(Arc::new(store))
        }
    }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
