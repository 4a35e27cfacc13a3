//! casapaz backend server.
//!
//! Startup order: configuration (fail-fast) → logging → database pool
//! and migrations → authorization engine → router → serve until ctrl-c.

mod config;
mod logging;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use casapaz_api::TokenSettings;
use casapaz_authz::{AuthorizationEngine, AuthzPolicy};
use casapaz_db::PgHierarchyStore;
use config::Config;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() {
    // Load .env if present, then the real environment.
    let _ = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        administration_has_global_rights = config.administration_has_global_rights,
        "Starting casapaz server"
    );

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = casapaz_db::run_migrations(&pool).await {
        tracing::error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let policy = AuthzPolicy {
        administration_has_global_rights: config.administration_has_global_rights,
    };
    let engine = Arc::new(AuthorizationEngine::new(
        PgHierarchyStore::new(pool.clone()),
        policy,
    ));
    let settings = Arc::new(TokenSettings {
        jwt_secret: config.jwt_secret.clone().into_bytes(),
        token_ttl_secs: config.token_ttl_secs,
    });

    let app = casapaz_api::router(pool, engine, settings)
        .route("/health", get(|| async { "OK" }));

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "Invalid bind address");
            std::process::exit(1);
        }
    };

    info!(%addr, "Listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install ctrl-c handler");
        return;
    }
    info!("Shutdown signal received");
}
